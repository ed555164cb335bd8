//! # Formats Module
//!
//! Conversions between in-memory records and persistence documents.
//!
//! - `persistence`: constellation record <-> `ConfigNode` field mapping
//! - `text`: `ConfigNode` <-> brace-delimited save-file text

mod persistence;
mod text;

pub use persistence::{constellation_from_node, constellation_to_node};
pub use text::{document_from_text, document_to_text};
