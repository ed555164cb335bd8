//! # constellation-core
//!
//! The constellation registry and vessel cache - THE LOGIC.
//!
//! This crate partitions a changing population of networked vessels into
//! named constellations keyed by a numeric frequency. It provides:
//! - An ordered, frequency-keyed `ConstellationRegistry` with documented
//!   lookup fallbacks and lossless save/load against a `ConfigNode` tree
//! - A dirty-flag `VesselCache` that is rebuilt lazily from the host's
//!   entity source
//! - A `Session` context object tying both to the host's lifecycle events
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is single-threaded: every entry point is called from the host loop
//! - Never blocks and never spawns threads
//! - Treats malformed save data as recoverable (defaults + logged error)
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod cache;
pub mod document;
pub mod events;
pub mod formats;
pub mod primitives;
pub mod registry;
pub mod session;
pub mod settings;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Color, Connection, Constellation, ConstellationError, Frequency, VesselId, VesselKind,
    VesselRef, is_frequency_valid,
};

// =============================================================================
// RE-EXPORTS: Registry, Cache, Session
// =============================================================================

pub use cache::{CacheInvalidator, CacheState, EntitySource, VesselCache};
pub use document::ConfigNode;
pub use events::{LifecycleNotifier, Subscription, VesselEvent};
pub use registry::ConstellationRegistry;
pub use session::Session;
pub use settings::Settings;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{
    constellation_from_node, constellation_to_node, document_from_text, document_to_text,
};
