//! # Session Module
//!
//! Session context combining settings, the constellation registry, and the
//! vessel cache.
//!
//! A `Session` is constructed explicitly when the host enters a scene and
//! passed to whoever needs it; there is no global instance. Entering a new
//! scene builds a new `Session` rather than mutating the old one.
//!
//! ## Lifecycle
//!
//! - `start`: default registry, `Stale` cache, lifecycle subscription
//! - `load` / `save`: registry <-> persistence document
//! - `end`: registry and cache cleared, subscription released
//!
//! Dropping a session without `end` also releases the subscription.

use crate::cache::{CacheState, EntitySource, VesselCache};
use crate::document::ConfigNode;
use crate::events::{LifecycleNotifier, Subscription};
use crate::registry::ConstellationRegistry;
use crate::settings::Settings;
use crate::{Color, Constellation, Frequency, VesselId, VesselRef};

/// Per-scene context object.
pub struct Session {
    settings: Settings,
    registry: ConstellationRegistry,
    cache: VesselCache,
    source: Box<dyn EntitySource>,
    /// Keeps the cache subscribed to population changes.
    subscription: Option<Subscription>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}

impl Session {
    /// Start a session: default registry, stale cache, and a subscription
    /// that marks the cache stale on participating vessel events.
    pub fn start(
        settings: Settings,
        source: impl EntitySource + 'static,
        notifier: &LifecycleNotifier,
    ) -> Self {
        tracing::debug!("Constellation session booting");

        let registry = ConstellationRegistry::from_defaults(&settings);
        let cache = VesselCache::new();

        let invalidator = cache.invalidator();
        let subscription = notifier.subscribe(move |event| {
            invalidator.on_vessel_changed(event.kind());
        });

        Self {
            settings,
            registry,
            cache,
            source: Box::new(source),
            subscription: Some(subscription),
        }
    }

    /// Tear the session down: clear registry and cache, unsubscribe.
    pub fn end(mut self) {
        self.registry.clear();
        self.cache.clear();
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        tracing::debug!("Constellation session ended");
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The constellation registry.
    #[must_use]
    pub fn registry(&self) -> &ConstellationRegistry {
        &self.registry
    }

    /// The constellation registry, for user-driven edits.
    pub fn registry_mut(&mut self) -> &mut ConstellationRegistry {
        &mut self.registry
    }

    /// Freshness of the vessel cache.
    #[must_use]
    pub fn cache_state(&self) -> CacheState {
        self.cache.state()
    }

    /// Number of cache rebuilds so far.
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.cache.rebuild_count()
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Replace the registry with the one persisted in `document`.
    pub fn load(&mut self, document: &ConfigNode) {
        self.registry = ConstellationRegistry::load(document, &self.settings);
    }

    /// Write the registry into `document`.
    pub fn save(&self, document: &mut ConfigNode) {
        self.registry.save(document);
    }

    // =========================================================================
    // VESSELS
    // =========================================================================

    /// Mark the vessel cache stale.
    pub fn mark_dirty(&self) {
        self.cache.mark_dirty();
    }

    /// Eligible vessels, optionally restricted to one frequency.
    pub fn vessels(&mut self, frequency: Option<Frequency>) -> Vec<VesselRef> {
        self.cache.query(self.source.as_ref(), frequency)
    }

    /// The eligible vessel with the given identity, if any.
    pub fn find_vessel(&mut self, id: VesselId) -> Option<VesselRef> {
        self.cache.find_by_identity(self.source.as_ref(), id)
    }

    /// Number of eligible vessels in a constellation.
    pub fn count_members(&mut self, constellation: &Constellation) -> usize {
        ConstellationRegistry::count_members(constellation, &mut self.cache, self.source.as_ref())
    }

    /// Member counts for every constellation, in registry order.
    pub fn member_counts(&mut self) -> Vec<(Frequency, usize)> {
        self.registry
            .member_counts(&mut self.cache, self.source.as_ref())
    }

    // =========================================================================
    // LOOKUP WITH FALLBACKS
    // =========================================================================

    /// Constellation name for a frequency, with the public fallback.
    #[must_use]
    pub fn name_of(&self, frequency: Frequency) -> &str {
        self.registry.name_of(frequency, &self.settings)
    }

    /// Constellation colour for a frequency, with the default colour fallback.
    #[must_use]
    pub fn color_of(&self, frequency: Frequency) -> Color {
        self.registry.color_of(frequency, &self.settings)
    }
}

// =============================================================================
// TESTS
// =============================================================================
