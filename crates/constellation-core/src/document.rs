//! # Config Document
//!
//! The generic hierarchical document used for persistence.
//!
//! A `ConfigNode` is a named node holding ordered `key = value` pairs and
//! ordered child nodes. Keys and child names may repeat; lookups return the
//! first match. The registry load/save contract operates purely on this tree;
//! concrete file formats live in [`crate::formats`].

use serde::{Deserialize, Serialize};

/// A named section of a persistence document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigNode {
    name: String,
    values: Vec<(String, String)>,
    nodes: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Create an empty node.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Get the node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the node has no values and no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.nodes.is_empty()
    }

    // =========================================================================
    // VALUES
    // =========================================================================

    /// All `(key, value)` pairs in insertion order.
    #[must_use]
    pub fn values(&self) -> &[(String, String)] {
        &self.values
    }

    /// Check if a value with the given key exists.
    #[must_use]
    pub fn has_value(&self, key: &str) -> bool {
        self.values.iter().any(|(k, _)| k == key)
    }

    /// Get the first value with the given key.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first value with the given key, or append a new one.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((key, value)),
        }
    }

    /// Append a value, keeping any existing values with the same key.
    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push((key.into(), value.into()));
    }

    // =========================================================================
    // CHILD NODES
    // =========================================================================

    /// All child nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[ConfigNode] {
        &self.nodes
    }

    /// Child nodes with the given name, in insertion order.
    pub fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    /// Check if a child node with the given name exists.
    #[must_use]
    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    /// Get the first child node with the given name.
    #[must_use]
    pub fn get_node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Get the first child node with the given name, mutably.
    pub fn get_node_mut(&mut self, name: &str) -> Option<&mut ConfigNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// Append a child node and return a mutable reference to it.
    pub fn add_node(&mut self, node: ConfigNode) -> &mut ConfigNode {
        self.nodes.push(node);
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    /// Remove every child node, keeping values.
    pub fn clear_nodes(&mut self) {
        self.nodes.clear();
    }

    /// Remove every child node with the given name. Returns how many were removed.
    pub fn remove_nodes(&mut self, name: &str) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.name != name);
        before - self.nodes.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
