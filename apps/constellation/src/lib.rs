//! # constellation
//!
//! Command-line front end for constellation-core: reads and edits the
//! `Constellations` section of a save file and reports vessel membership
//! from a JSON roster.

pub mod cli;
pub mod roster;

pub use roster::{MAX_ROSTER_SIZE, Roster};
