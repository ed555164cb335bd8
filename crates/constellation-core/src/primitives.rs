//! # Innate Primitives
//!
//! Hardcoded constants for the constellation CORE.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! Everything that a host may legitimately want to change (default list,
//! public frequency, fallback colour) lives in [`crate::settings`] instead.

/// Lowest valid frequency.
pub const MIN_FREQUENCY: i64 = 0;

/// Highest valid frequency (the 16-bit signed maximum).
pub const MAX_FREQUENCY: i64 = i16::MAX as i64;

// =============================================================================
// DOCUMENT LAYOUT
// =============================================================================

/// Name of the section holding the persisted constellation list.
pub const CONSTELLATIONS_NODE: &str = "Constellations";

/// Name of each child entry under [`CONSTELLATIONS_NODE`].
pub const CONSTELLATION_NODE: &str = "Constellation";

/// Field key for a constellation's frequency.
pub const FREQUENCY_KEY: &str = "frequency";

/// Field key for a constellation's display name.
pub const NAME_KEY: &str = "name";

/// Field key for a constellation's colour (`r,g,b,a`).
pub const COLOR_KEY: &str = "color";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum size of a text document accepted by the parser (16 MB).
///
/// Save files larger than this are rejected before parsing.
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum nesting depth of a text document.
pub const MAX_DOCUMENT_DEPTH: usize = 64;
