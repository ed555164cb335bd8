//! # Vessel Cache
//!
//! Lazily rebuilt view of the vessels eligible for constellations.
//!
//! ## State Machine
//!
//! - `Stale` (initial): the next read rebuilds from the entity source.
//! - `Fresh`: reads are served from the cached list.
//!
//! Stale -> Fresh only through a rebuild, which happens inside a read, never
//! eagerly. Fresh -> Stale on any qualifying change notification. A rebuild
//! always rescans the whole entity source; change notifications are never
//! applied as deltas because kind and connection state can change in ways
//! the notification does not describe.

use crate::{Frequency, VesselId, VesselKind, VesselRef};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// =============================================================================
// ENTITY SOURCE
// =============================================================================

/// The authoritative population of vessels, owned by the host.
pub trait EntitySource {
    /// Visit every vessel currently known to the host, eligible or not.
    fn for_each_vessel(&self, visitor: &mut dyn FnMut(&VesselRef));
}

impl EntitySource for [VesselRef] {
    fn for_each_vessel(&self, visitor: &mut dyn FnMut(&VesselRef)) {
        self.iter().for_each(visitor);
    }
}

impl EntitySource for Vec<VesselRef> {
    fn for_each_vessel(&self, visitor: &mut dyn FnMut(&VesselRef)) {
        self.as_slice().for_each_vessel(visitor);
    }
}

/// Shared population for single-threaded hosts that mutate it while a
/// session holds a handle.
impl<S: EntitySource + ?Sized> EntitySource for Rc<RefCell<S>> {
    fn for_each_vessel(&self, visitor: &mut dyn FnMut(&VesselRef)) {
        self.borrow().for_each_vessel(visitor);
    }
}

// =============================================================================
// INVALIDATION
// =============================================================================

/// Freshness of a [`VesselCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// The cached list matches the population at the last rebuild.
    Fresh,
    /// The next read will rebuild.
    Stale,
}

/// Cloneable handle that can mark a cache stale from an event handler.
#[derive(Debug, Clone)]
pub struct CacheInvalidator {
    dirty: Rc<Cell<bool>>,
}

impl CacheInvalidator {
    /// Mark the cache stale. Idempotent.
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    /// Population change notification for a vessel of the given kind.
    ///
    /// Only participating kinds mark the cache stale; flags, debris and the
    /// like never force a rebuild. Returns whether the cache was marked.
    pub fn on_vessel_changed(&self, kind: VesselKind) -> bool {
        if kind.is_participating() {
            tracing::debug!("Change in the vessel list detected. Cache refresh required.");
            self.mark_dirty();
            true
        } else {
            false
        }
    }
}

// =============================================================================
// CACHE
// =============================================================================

/// Dirty-flag cache of eligible vessels.
#[derive(Debug)]
pub struct VesselCache {
    /// Eligible vessels in source order, rebuilt wholesale.
    vessels: Vec<VesselRef>,
    dirty: Rc<Cell<bool>>,
    rebuilds: u64,
}

impl Default for VesselCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VesselCache {
    /// Create an empty cache in the `Stale` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vessels: Vec::new(),
            dirty: Rc::new(Cell::new(true)),
            rebuilds: 0,
        }
    }

    /// Handle for marking this cache stale from elsewhere.
    #[must_use]
    pub fn invalidator(&self) -> CacheInvalidator {
        CacheInvalidator {
            dirty: Rc::clone(&self.dirty),
        }
    }

    /// Mark the cache stale. Idempotent.
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    /// See [`CacheInvalidator::on_vessel_changed`].
    pub fn on_vessel_changed(&self, kind: VesselKind) -> bool {
        self.invalidator().on_vessel_changed(kind)
    }

    /// Current freshness.
    #[must_use]
    pub fn state(&self) -> CacheState {
        if self.dirty.get() {
            CacheState::Stale
        } else {
            CacheState::Fresh
        }
    }

    /// Number of rebuilds performed since creation.
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Eligible vessels tuned to `frequency`, or all of them for `None`.
    ///
    /// Rebuilds first if stale. The result is a snapshot; changing it does
    /// not affect the cache.
    pub fn query(
        &mut self,
        source: &dyn EntitySource,
        frequency: Option<Frequency>,
    ) -> Vec<VesselRef> {
        self.refresh(source);
        match frequency {
            None => self.vessels.clone(),
            Some(f) => self
                .vessels
                .iter()
                .filter(|v| v.participates_in(f))
                .cloned()
                .collect(),
        }
    }

    /// The eligible vessel with the given identity.
    ///
    /// `None` is a normal outcome: the vessel may be unknown, ineligible, or
    /// gone since the last rebuild.
    pub fn find_by_identity(
        &mut self,
        source: &dyn EntitySource,
        id: VesselId,
    ) -> Option<VesselRef> {
        self.refresh(source);
        self.vessels.iter().find(|v| v.id == id).cloned()
    }

    /// Number of eligible vessels tuned to `frequency`.
    pub fn count_members(&mut self, source: &dyn EntitySource, frequency: Frequency) -> usize {
        self.refresh(source);
        self.vessels
            .iter()
            .filter(|v| v.participates_in(frequency))
            .count()
    }

    // =========================================================================
    // REBUILD
    // =========================================================================

    fn refresh(&mut self, source: &dyn EntitySource) {
        if self.dirty.get() {
            self.rebuild(source);
        }
    }

    /// Rescan the entity source unconditionally and mark the cache fresh.
    pub fn rebuild(&mut self, source: &dyn EntitySource) {
        tracing::debug!(
            "Vessel cache cleared - {} entries gone",
            self.vessels.len()
        );
        self.vessels.clear();

        let vessels = &mut self.vessels;
        source.for_each_vessel(&mut |vessel| {
            if vessel.is_eligible() {
                tracing::trace!("Caching vessel '{}' ({})", vessel.name, vessel.id);
                vessels.push(vessel.clone());
            }
        });

        self.rebuilds = self.rebuilds.saturating_add(1);
        self.dirty.set(false);
    }

    /// Drop all entries and return to `Stale` (session teardown).
    pub fn clear(&mut self) {
        self.vessels.clear();
        self.dirty.set(true);
    }
}

// =============================================================================
// TESTS
// =============================================================================
