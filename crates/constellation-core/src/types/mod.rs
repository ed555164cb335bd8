//! # Core Type Definitions
//!
//! This module contains all core types for the constellation substrate:
//! - Constellation keys and display data (`Frequency`, `Color`, `Constellation`)
//! - Vessel handles (`VesselId`, `VesselKind`, `Connection`, `VesselRef`)
//! - Error types (`ConstellationError`)
//!
//! ## Validity Guarantees
//!
//! `Frequency` and `Color` can only be built through validating constructors
//! (including their serde representations), so every value in a registry
//! or a vessel connection is in range.

use crate::primitives::{MAX_FREQUENCY, MIN_FREQUENCY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// FREQUENCY
// =============================================================================

/// Check whether a raw integer is a usable frequency.
///
/// True iff `0 <= value <= 32767`. User-driven mutations must pass this
/// check before reaching the registry.
#[must_use]
pub const fn is_frequency_valid(value: i64) -> bool {
    value >= MIN_FREQUENCY && value <= MAX_FREQUENCY
}

/// Integer key identifying constellation membership.
///
/// Always within `[0, 32767]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Frequency(i16);

impl Frequency {
    /// The lowest frequency (also the conventional public frequency).
    pub const MIN: Self = Self(0);

    /// The highest frequency.
    pub const MAX: Self = Self(i16::MAX);

    /// Create a frequency, rejecting values outside `[0, 32767]`.
    pub fn new(value: i64) -> Result<Self, ConstellationError> {
        if is_frequency_valid(value) {
            Ok(Self(value as i16))
        } else {
            Err(ConstellationError::InvalidFrequency(value))
        }
    }

    /// Get the raw frequency value.
    #[must_use]
    pub const fn value(self) -> i16 {
        self.0
    }
}

impl TryFrom<i64> for Frequency {
    type Error = ConstellationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Frequency> for i64 {
    fn from(frequency: Frequency) -> Self {
        i64::from(frequency.0)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// COLOR
// =============================================================================

/// An RGBA display colour with every channel in `[0.0, 1.0]`.
///
/// Text form is `r,g,b,a`, the same layout the save file uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f32; 4]", into = "[f32; 4]")]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Fallback colour of the public constellation.
    pub const PUBLIC: Self = Self {
        r: 0.0,
        g: 0.8,
        b: 1.0,
        a: 1.0,
    };

    /// Create a colour, rejecting channels outside `[0.0, 1.0]` (and NaN).
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Result<Self, ConstellationError> {
        let channels = [r, g, b, a];
        if channels.iter().all(|c| (0.0..=1.0).contains(c)) {
            Ok(Self { r, g, b, a })
        } else {
            Err(ConstellationError::InvalidColor(format!(
                "channels {:?} must lie in [0, 1]",
                channels
            )))
        }
    }

    #[must_use]
    pub const fn r(&self) -> f32 {
        self.r
    }

    #[must_use]
    pub const fn g(&self) -> f32 {
        self.g
    }

    #[must_use]
    pub const fn b(&self) -> f32 {
        self.b
    }

    #[must_use]
    pub const fn a(&self) -> f32 {
        self.a
    }

    /// Channels in `[r, g, b, a]` order.
    #[must_use]
    pub const fn channels(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl TryFrom<[f32; 4]> for Color {
    type Error = ConstellationError;

    fn try_from([r, g, b, a]: [f32; 4]) -> Result<Self, Self::Error> {
        Self::new(r, g, b, a)
    }
}

impl From<Color> for [f32; 4] {
    fn from(color: Color) -> Self {
        color.channels()
    }
}

impl FromStr for Color {
    type Err = ConstellationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ConstellationError::InvalidColor(format!(
                "expected 4 comma-separated channels, got '{}'",
                s
            )));
        }

        let mut channels = [0.0f32; 4];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            *slot = part.parse::<f32>().map_err(|e| {
                ConstellationError::InvalidColor(format!("channel '{}': {}", part, e))
            })?;
        }

        Self::try_from(channels)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.r, self.g, self.b, self.a)
    }
}

// =============================================================================
// CONSTELLATION
// =============================================================================

/// A named group of vessels sharing a frequency.
///
/// The frequency is the registry key in practice, but duplicates are
/// tolerated on load: lookups resolve to the first match in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Constellation {
    /// Membership key.
    pub frequency: Frequency,
    /// Display name, not required to be unique.
    pub name: String,
    /// Display colour.
    pub color: Color,
}

impl Constellation {
    /// Create a new constellation record.
    #[must_use]
    pub fn new(frequency: Frequency, name: impl Into<String>, color: Color) -> Self {
        Self {
            frequency,
            name: name.into(),
            color,
        }
    }
}

// =============================================================================
// VESSELS
// =============================================================================

/// Unique identity of a vessel in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VesselId(pub u64);

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vessel classification as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VesselKind {
    Base,
    Lander,
    Plane,
    Probe,
    Relay,
    Rover,
    Ship,
    Station,
    Debris,
    Flag,
    #[serde(rename = "EVA")]
    Eva,
    SpaceObject,
    Unknown,
}

impl VesselKind {
    /// Kinds that take part in constellations.
    pub const PARTICIPATING: [Self; 8] = [
        Self::Base,
        Self::Lander,
        Self::Plane,
        Self::Probe,
        Self::Relay,
        Self::Rover,
        Self::Ship,
        Self::Station,
    ];

    /// Whether vessels of this kind can be cached and trigger cache refreshes.
    ///
    /// Debris is excluded even though fresh debris may still carry a connection.
    #[must_use]
    pub const fn is_participating(self) -> bool {
        matches!(
            self,
            Self::Base
                | Self::Lander
                | Self::Plane
                | Self::Probe
                | Self::Relay
                | Self::Rover
                | Self::Ship
                | Self::Station
        )
    }
}

/// The network connection of a vessel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Connection {
    /// Frequencies this vessel participates in.
    /// Uses BTreeSet for deterministic ordering.
    pub frequencies: BTreeSet<Frequency>,
}

impl Connection {
    /// Create a connection tuned to the given frequencies.
    #[must_use]
    pub fn new(frequencies: impl IntoIterator<Item = Frequency>) -> Self {
        Self {
            frequencies: frequencies.into_iter().collect(),
        }
    }
}

/// Handle on one network-capable vessel, as seen by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselRef {
    /// Unique identity.
    pub id: VesselId,
    /// Display name (logging and CLI output only).
    pub name: String,
    /// Host classification.
    pub kind: VesselKind,
    /// Network connection, absent for vessels without one.
    #[serde(default)]
    pub connection: Option<Connection>,
}

impl VesselRef {
    /// Create a vessel with no connection.
    #[must_use]
    pub fn new(id: VesselId, name: impl Into<String>, kind: VesselKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            connection: None,
        }
    }

    /// Attach a connection tuned to the given frequencies.
    #[must_use]
    pub fn with_connection(mut self, frequencies: impl IntoIterator<Item = Frequency>) -> Self {
        self.connection = Some(Connection::new(frequencies));
        self
    }

    /// Check if the vessel has an active connection.
    #[must_use]
    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    /// Cache eligibility: an active connection and a participating kind.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.has_connection() && self.kind.is_participating()
    }

    /// Check if the vessel's frequency set contains `frequency`.
    #[must_use]
    pub fn participates_in(&self, frequency: Frequency) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|c| c.frequencies.contains(&frequency))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the constellation system.
///
/// Malformed save data and lookup misses are NOT errors at the registry
/// boundary; they degrade to defaults or `None`. These variants cover
/// user-driven mutations, settings, and document encoding.
#[derive(Debug, Error)]
pub enum ConstellationError {
    /// A frequency outside `[0, 32767]` was supplied.
    #[error("Invalid frequency: {0} (expected 0..=32767)")]
    InvalidFrequency(i64),

    /// A constellation with this frequency already exists.
    #[error("Frequency {0} is already used by another constellation")]
    FrequencyTaken(Frequency),

    /// The public constellation cannot be removed.
    #[error("Frequency {0} is the public frequency and cannot be removed")]
    ProtectedFrequency(Frequency),

    /// Removing this constellation would leave the registry empty.
    #[error("Frequency {0} holds the last constellation and cannot be removed")]
    LastConstellation(Frequency),

    /// No constellation uses the given frequency.
    #[error("Constellation not found: frequency {0}")]
    ConstellationNotFound(Frequency),

    /// A colour could not be parsed or has out-of-range channels.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A persisted constellation entry is missing or has bad fields.
    #[error("Malformed constellation entry: {0}")]
    MalformedEntry(String),

    /// A text document could not be parsed.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A document could not be written.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Settings could not be parsed or failed validation.
    #[error("Settings error: {0}")]
    SettingsError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_validity_bounds() {
        assert!(is_frequency_valid(0));
        assert!(is_frequency_valid(32767));
        assert!(!is_frequency_valid(-1));
        assert!(!is_frequency_valid(32768));
        assert!(!is_frequency_valid(i64::MIN));
    }

    #[test]
    fn frequency_new_rejects_out_of_range() {
        assert_eq!(Frequency::new(42).expect("valid").value(), 42);
        assert!(matches!(
            Frequency::new(-1),
            Err(ConstellationError::InvalidFrequency(-1))
        ));
        assert!(matches!(
            Frequency::new(40000),
            Err(ConstellationError::InvalidFrequency(40000))
        ));
    }

    #[test]
    fn color_text_roundtrip() {
        let color = Color::new(0.1, 0.25, 1.0, 0.5).expect("valid");
        let text = color.to_string();
        assert_eq!(text, "0.1,0.25,1,0.5");
        assert_eq!(text.parse::<Color>().expect("parse"), color);
    }

    #[test]
    fn color_rejects_bad_channels() {
        assert!(Color::new(1.5, 0.0, 0.0, 1.0).is_err());
        assert!(Color::new(f32::NAN, 0.0, 0.0, 1.0).is_err());
        assert!("1,0,0".parse::<Color>().is_err());
        assert!("1,0,x,1".parse::<Color>().is_err());
    }

    #[test]
    fn color_parse_tolerates_spaces() {
        let color: Color = " 1, 0 ,0.5 , 1".parse().expect("parse");
        assert_eq!(color.channels(), [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn participating_kinds() {
        for kind in VesselKind::PARTICIPATING {
            assert!(kind.is_participating());
        }
        assert!(!VesselKind::Debris.is_participating());
        assert!(!VesselKind::Flag.is_participating());
        assert!(!VesselKind::Eva.is_participating());
        assert!(!VesselKind::SpaceObject.is_participating());
        assert!(!VesselKind::Unknown.is_participating());
    }

    #[test]
    fn vessel_eligibility() {
        let f = Frequency::new(5).expect("valid");
        let lander = VesselRef::new(VesselId(1), "Probe", VesselKind::Probe);
        assert!(!lander.is_eligible());

        let lander = lander.with_connection([f]);
        assert!(lander.is_eligible());
        assert!(lander.participates_in(f));
        assert!(!lander.participates_in(Frequency::MIN));

        let debris = VesselRef::new(VesselId(2), "Debris", VesselKind::Debris).with_connection([f]);
        assert!(!debris.is_eligible());
    }
}
