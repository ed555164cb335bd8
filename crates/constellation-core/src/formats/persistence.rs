//! # Constellation Field Mapping
//!
//! Maps a `Constellation` record onto a `Constellation` document node:
//!
//! ```text
//! Constellation
//! {
//!     frequency = 7
//!     name = Relay Net
//!     color = 1,0.5,0,1
//! }
//! ```
//!
//! This is a pure transformation - no file I/O.

use crate::document::ConfigNode;
use crate::primitives::{COLOR_KEY, CONSTELLATION_NODE, FREQUENCY_KEY, NAME_KEY};
use crate::{Color, Constellation, ConstellationError, Frequency};

/// Serialize a constellation into a fresh `Constellation` node.
#[must_use]
pub fn constellation_to_node(constellation: &Constellation) -> ConfigNode {
    let mut node = ConfigNode::new(CONSTELLATION_NODE);
    node.set_value(FREQUENCY_KEY, constellation.frequency.to_string());
    node.set_value(NAME_KEY, constellation.name.as_str());
    node.set_value(COLOR_KEY, constellation.color.to_string());
    node
}

/// Deserialize a constellation from a document node.
///
/// All three fields are required. A frequency outside `[0, 32767]` or a
/// colour with out-of-range channels makes the entry malformed.
pub fn constellation_from_node(node: &ConfigNode) -> Result<Constellation, ConstellationError> {
    let raw_frequency = required(node, FREQUENCY_KEY)?;
    let frequency = raw_frequency
        .trim()
        .parse::<i64>()
        .map_err(|e| {
            ConstellationError::MalformedEntry(format!(
                "frequency '{}' is not an integer: {}",
                raw_frequency, e
            ))
        })
        .and_then(|value| {
            Frequency::new(value)
                .map_err(|e| ConstellationError::MalformedEntry(e.to_string()))
        })?;

    let name = required(node, NAME_KEY)?;

    let color = required(node, COLOR_KEY)?
        .parse::<Color>()
        .map_err(|e| ConstellationError::MalformedEntry(e.to_string()))?;

    Ok(Constellation::new(frequency, name, color))
}

fn required<'a>(node: &'a ConfigNode, key: &str) -> Result<&'a str, ConstellationError> {
    node.get_value(key).ok_or_else(|| {
        ConstellationError::MalformedEntry(format!(
            "'{}' node has no '{}' field",
            node.name(),
            key
        ))
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn relay_net() -> Constellation {
        Constellation::new(
            Frequency::new(7).expect("valid"),
            "Relay Net",
            Color::new(1.0, 0.5, 0.0, 1.0).expect("valid"),
        )
    }

    #[test]
    fn node_layout() {
        let node = constellation_to_node(&relay_net());

        assert_eq!(node.name(), "Constellation");
        assert_eq!(node.get_value("frequency"), Some("7"));
        assert_eq!(node.get_value("name"), Some("Relay Net"));
        assert_eq!(node.get_value("color"), Some("1,0.5,0,1"));
    }

    #[test]
    fn node_roundtrip() {
        let original = relay_net();
        let restored = constellation_from_node(&constellation_to_node(&original)).expect("load");
        assert_eq!(restored, original);
    }

    #[test]
    fn missing_field_is_malformed() {
        let mut node = ConfigNode::new("Constellation");
        node.set_value("frequency", "7");
        node.set_value("color", "1,1,1,1");

        let result = constellation_from_node(&node);
        assert!(matches!(result, Err(ConstellationError::MalformedEntry(_))));
    }

    #[test]
    fn out_of_range_frequency_is_malformed() {
        let mut node = constellation_to_node(&relay_net());
        node.set_value("frequency", "-1");
        assert!(constellation_from_node(&node).is_err());

        node.set_value("frequency", "32768");
        assert!(constellation_from_node(&node).is_err());

        node.set_value("frequency", "seven");
        assert!(constellation_from_node(&node).is_err());
    }

    #[test]
    fn bad_color_is_malformed() {
        let mut node = constellation_to_node(&relay_net());
        node.set_value("color", "2,0,0,1");
        assert!(matches!(
            constellation_from_node(&node),
            Err(ConstellationError::MalformedEntry(_))
        ));
    }
}
