//! # Vessel Roster
//!
//! A JSON snapshot of the vessel population, standing in for a live host
//! when the tool runs outside the game.
//!
//! ```json
//! [
//!   { "id": 1, "name": "Relay A", "kind": "Relay",
//!     "connection": { "frequencies": [0, 42] } },
//!   { "id": 2, "name": "Debris", "kind": "Debris", "connection": null }
//! ]
//! ```

use constellation_core::{ConstellationError, EntitySource, VesselRef};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum roster file size (16 MB).
pub const MAX_ROSTER_SIZE: u64 = 16 * 1024 * 1024;

/// Every vessel the host knows about, eligible or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    vessels: Vec<VesselRef>,
}

impl Roster {
    /// Wrap an in-memory population.
    #[must_use]
    pub fn new(vessels: Vec<VesselRef>) -> Self {
        Self { vessels }
    }

    /// Parse a roster from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConstellationError> {
        serde_json::from_str(text)
            .map_err(|e| ConstellationError::SerializationError(format!("Invalid roster: {}", e)))
    }

    /// Read a roster file, checking its size before reading.
    pub fn load(path: &Path) -> Result<Self, ConstellationError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ConstellationError::IoError(format!("Cannot read file metadata: {}", e))
        })?;
        if metadata.len() > MAX_ROSTER_SIZE {
            return Err(ConstellationError::SerializationError(format!(
                "Roster size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_ROSTER_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| ConstellationError::IoError(format!("Read roster: {}", e)))?;
        let roster = Self::from_json_str(&text)?;
        tracing::debug!("Roster loaded from {:?}: {} vessel(s)", path, roster.len());
        Ok(roster)
    }

    /// All vessels in file order.
    #[must_use]
    pub fn vessels(&self) -> &[VesselRef] {
        &self.vessels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vessels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vessels.is_empty()
    }
}

impl EntitySource for Roster {
    fn for_each_vessel(&self, visitor: &mut dyn FnMut(&VesselRef)) {
        self.vessels.for_each_vessel(visitor);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use constellation_core::{Frequency, VesselId, VesselKind};
    use std::io::Write;

    const SAMPLE: &str = r#"[
        { "id": 1, "name": "Relay A", "kind": "Relay", "connection": { "frequencies": [0, 42] } },
        { "id": 2, "name": "Junk", "kind": "Debris", "connection": null },
        { "id": 3, "name": "Jeb", "kind": "EVA" }
    ]"#;

    #[test]
    fn parses_sample() {
        let roster = Roster::from_json_str(SAMPLE).expect("parse");
        assert_eq!(roster.len(), 3);

        let relay = &roster.vessels()[0];
        assert_eq!(relay.id, VesselId(1));
        assert_eq!(relay.kind, VesselKind::Relay);
        assert!(relay.participates_in(Frequency::new(42).expect("valid")));

        assert_eq!(roster.vessels()[2].kind, VesselKind::Eva);
        assert!(!roster.vessels()[2].has_connection());
    }

    #[test]
    fn rejects_out_of_range_frequency() {
        let text = r#"[{ "id": 1, "name": "X", "kind": "Ship", "connection": { "frequencies": [40000] } }]"#;
        assert!(Roster::from_json_str(text).is_err());
    }

    #[test]
    fn rejects_unknown_kind() {
        let text = r#"[{ "id": 1, "name": "X", "kind": "Submarine" }]"#;
        assert!(Roster::from_json_str(text).is_err());
    }

    #[test]
    fn entity_source_visits_all() {
        let roster = Roster::from_json_str(SAMPLE).expect("parse");
        let mut seen = 0;
        roster.for_each_vessel(&mut |_| seen += 1);
        assert_eq!(seen, 3);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write");

        let roster = Roster::load(file.path()).expect("load");
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            Roster::load(&dir.path().join("absent.json")),
            Err(ConstellationError::IoError(_))
        ));
    }
}
