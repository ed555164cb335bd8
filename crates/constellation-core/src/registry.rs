//! # Constellation Registry
//!
//! The ordered list of constellations known to a session.
//!
//! ## Ordering
//!
//! After `load` the list is sorted by ascending frequency (stable, so
//! duplicate frequencies keep document order and lookups still resolve to
//! the first persisted entry). User-driven inserts keep that order.
//!
//! ## Failure Semantics
//!
//! Malformed persisted data never aborts a session: it degrades to the
//! default list with a logged error. Saving an empty registry is a logged
//! no-op that leaves the document untouched.

use crate::cache::{EntitySource, VesselCache};
use crate::document::ConfigNode;
use crate::formats::{constellation_from_node, constellation_to_node};
use crate::primitives::CONSTELLATIONS_NODE;
use crate::settings::Settings;
use crate::{Color, Constellation, ConstellationError, Frequency};

/// Ordered sequence of constellations, never empty once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationRegistry {
    constellations: Vec<Constellation>,
}

impl ConstellationRegistry {
    /// Create a registry holding the settings' default list.
    #[must_use]
    pub fn from_defaults(settings: &Settings) -> Self {
        let mut constellations = settings.constellations.clone();
        constellations.sort_by_key(|c| c.frequency);
        Self { constellations }
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Build a registry from a persistence document.
    ///
    /// - No `Constellations` section: default list (logged at debug level).
    /// - Section present but without entries: default list (logged as error).
    /// - Otherwise every entry is deserialized in document order and the
    ///   result sorted by ascending frequency. Malformed entries are skipped
    ///   with an error; if none survive, the default list is used.
    #[must_use]
    pub fn load(document: &ConfigNode, settings: &Settings) -> Self {
        tracing::debug!("Scenario content to be read: {:?}", document);

        let Some(root) = document.get_node(CONSTELLATIONS_NODE) else {
            tracing::debug!(
                "The '{}' node is not found. The default constellation list is loaded.",
                CONSTELLATIONS_NODE
            );
            return Self::from_defaults(settings);
        };

        if root.nodes().is_empty() {
            tracing::error!(
                "The '{}' node is malformed! Reverted to the default constellation list.",
                CONSTELLATIONS_NODE
            );
            return Self::from_defaults(settings);
        }

        let mut constellations = Vec::with_capacity(root.nodes().len());
        for (index, node) in root.nodes().iter().enumerate() {
            match constellation_from_node(node) {
                Ok(constellation) => constellations.push(constellation),
                Err(e) => tracing::error!("Skipping constellation entry #{}: {}", index, e),
            }
        }

        if constellations.is_empty() {
            tracing::error!(
                "No readable entry in the '{}' node. Reverted to the default constellation list.",
                CONSTELLATIONS_NODE
            );
            return Self::from_defaults(settings);
        }

        constellations.sort_by_key(|c| c.frequency);
        Self { constellations }
    }

    /// Write the registry into a persistence document.
    ///
    /// Replaces any existing `Constellations` section wholesale, keeping its
    /// position and values. An empty registry writes nothing.
    pub fn save(&self, document: &mut ConfigNode) {
        if self.constellations.is_empty() {
            tracing::error!("The constellation list to save is empty!");
            return;
        }

        if !document.has_node(CONSTELLATIONS_NODE) {
            document.add_node(ConfigNode::new(CONSTELLATIONS_NODE));
        }
        if let Some(root) = document.get_node_mut(CONSTELLATIONS_NODE) {
            root.clear_nodes();
            for constellation in &self.constellations {
                root.add_node(constellation_to_node(constellation));
            }
        }

        tracing::debug!("Scenario content to be saved: {:?}", document);
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// All constellations in list order.
    #[must_use]
    pub fn constellations(&self) -> &[Constellation] {
        &self.constellations
    }

    /// Number of constellations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constellations.len()
    }

    /// Check if the registry is empty (only after `clear`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constellations.is_empty()
    }

    /// First constellation with the given frequency.
    #[must_use]
    pub fn find_by_frequency(&self, frequency: Frequency) -> Option<&Constellation> {
        self.constellations.iter().find(|c| c.frequency == frequency)
    }

    /// Colour of a frequency, falling back to the default public colour.
    #[must_use]
    pub fn color_of(&self, frequency: Frequency, settings: &Settings) -> Color {
        self.find_by_frequency(frequency)
            .map_or(settings.default_public_color, |c| c.color)
    }

    /// Name of a frequency, falling back to the public constellation's name.
    ///
    /// If the public frequency is itself unknown, the configured default
    /// public name is returned.
    #[must_use]
    pub fn name_of<'a>(&'a self, frequency: Frequency, settings: &'a Settings) -> &'a str {
        self.find_by_frequency(frequency)
            .or_else(|| self.find_by_frequency(settings.public_frequency))
            .map_or(settings.default_public_name.as_str(), |c| c.name.as_str())
    }

    // =========================================================================
    // MEMBERSHIP
    // =========================================================================

    /// Count eligible vessels whose frequency set contains this constellation's frequency.
    pub fn count_members(
        constellation: &Constellation,
        cache: &mut VesselCache,
        source: &dyn EntitySource,
    ) -> usize {
        cache.count_members(source, constellation.frequency)
    }

    /// Member counts for every constellation, in list order.
    pub fn member_counts(
        &self,
        cache: &mut VesselCache,
        source: &dyn EntitySource,
    ) -> Vec<(Frequency, usize)> {
        self.constellations
            .iter()
            .map(|c| (c.frequency, Self::count_members(c, cache, source)))
            .collect()
    }

    // =========================================================================
    // MUTATION (user-driven)
    // =========================================================================

    /// Insert a new constellation, keeping ascending-frequency order.
    pub fn insert(&mut self, constellation: Constellation) -> Result<(), ConstellationError> {
        if self.find_by_frequency(constellation.frequency).is_some() {
            return Err(ConstellationError::FrequencyTaken(constellation.frequency));
        }

        let at = self
            .constellations
            .partition_point(|c| c.frequency < constellation.frequency);
        tracing::debug!(
            "Constellation '{}' added on frequency {}",
            constellation.name,
            constellation.frequency
        );
        self.constellations.insert(at, constellation);
        Ok(())
    }

    /// Remove the constellation with the given frequency.
    ///
    /// The public frequency is protected, and so is the last remaining
    /// entry: a loaded document need not contain the public frequency, and
    /// the registry must never become empty.
    pub fn remove(
        &mut self,
        frequency: Frequency,
        public_frequency: Frequency,
    ) -> Result<Constellation, ConstellationError> {
        if frequency == public_frequency {
            return Err(ConstellationError::ProtectedFrequency(frequency));
        }

        let index = self
            .constellations
            .iter()
            .position(|c| c.frequency == frequency)
            .ok_or(ConstellationError::ConstellationNotFound(frequency))?;
        if self.constellations.len() == 1 {
            return Err(ConstellationError::LastConstellation(frequency));
        }
        let removed = self.constellations.remove(index);
        tracing::debug!(
            "Constellation '{}' removed from frequency {}",
            removed.name,
            frequency
        );
        Ok(removed)
    }

    /// Change the name and/or colour of an existing constellation.
    pub fn update(
        &mut self,
        frequency: Frequency,
        name: Option<String>,
        color: Option<Color>,
    ) -> Result<&Constellation, ConstellationError> {
        let constellation = self
            .constellations
            .iter_mut()
            .find(|c| c.frequency == frequency)
            .ok_or(ConstellationError::ConstellationNotFound(frequency))?;

        if let Some(name) = name {
            constellation.name = name;
        }
        if let Some(color) = color {
            constellation.color = color;
        }
        Ok(constellation)
    }

    /// Replace the whole list. An empty list is refused and logged.
    ///
    /// Returns `true` if the list was replaced.
    pub fn replace_all(&mut self, mut constellations: Vec<Constellation>) -> bool {
        if constellations.is_empty() {
            tracing::error!("Refusing to replace the constellation list with an empty one");
            return false;
        }
        constellations.sort_by_key(|c| c.frequency);
        self.constellations = constellations;
        true
    }

    /// Drop every constellation (session teardown).
    pub fn clear(&mut self) {
        self.constellations.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
