//! # Lifecycle Events
//!
//! Single-threaded publisher for vessel creation/destruction events.
//!
//! Handlers are registered with [`LifecycleNotifier::subscribe`], which
//! returns a [`Subscription`] guard. Dropping the guard (or calling
//! [`Subscription::unsubscribe`]) removes the handler, so teardown cannot
//! leave a dangling callback behind.

use crate::{VesselId, VesselKind};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};

/// A change in the vessel population reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VesselEvent {
    /// A vessel appeared (launch, staging, new asteroid, ...).
    Created { id: VesselId, kind: VesselKind },
    /// A vessel was destroyed or recovered.
    Destroyed { id: VesselId, kind: VesselKind },
}

impl VesselEvent {
    /// The affected vessel.
    #[must_use]
    pub const fn id(&self) -> VesselId {
        match self {
            Self::Created { id, .. } | Self::Destroyed { id, .. } => *id,
        }
    }

    /// Kind of the affected vessel, as resolved when the event fired.
    #[must_use]
    pub const fn kind(&self) -> VesselKind {
        match self {
            Self::Created { kind, .. } | Self::Destroyed { kind, .. } => *kind,
        }
    }
}

type Handler = Box<dyn FnMut(&VesselEvent)>;

/// Registrations and releases requested while `publish` holds the handler map.
#[derive(Default)]
struct Deferred {
    added: Vec<(u64, Handler)>,
    released: BTreeSet<u64>,
}

impl Deferred {
    fn is_empty(&self) -> bool {
        self.added.is_empty() && self.released.is_empty()
    }
}

#[derive(Default)]
struct Shared {
    next_id: Cell<u64>,
    handlers: RefCell<BTreeMap<u64, Handler>>,
    deferred: RefCell<Deferred>,
}

impl Shared {
    fn is_released(&self, id: u64) -> bool {
        self.deferred
            .try_borrow()
            .is_ok_and(|d| d.released.contains(&id))
    }

    /// Apply deferred changes once no publish is running.
    fn apply_deferred(&self) {
        loop {
            let Ok(mut handlers) = self.handlers.try_borrow_mut() else {
                return;
            };
            let Ok(mut deferred) = self.deferred.try_borrow_mut() else {
                return;
            };
            if deferred.is_empty() {
                return;
            }
            let Deferred { added, released } = std::mem::take(&mut *deferred);
            drop(deferred);

            handlers.extend(added);
            let dropped: Vec<Handler> = released
                .iter()
                .filter_map(|id| handlers.remove(id))
                .collect();
            drop(handlers);

            // A dropped handler may own further guards; their releases are
            // deferred again and picked up by the next iteration.
            drop(dropped);
            tracing::debug!("Deferred lifecycle subscriber changes applied");
        }
    }
}

/// Publisher of [`VesselEvent`]s.
#[derive(Default)]
pub struct LifecycleNotifier {
    shared: Rc<Shared>,
}

impl std::fmt::Debug for LifecycleNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl LifecycleNotifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It stays registered while the guard lives.
    ///
    /// Called from inside a handler, the registration takes effect when the
    /// running publish returns; the new handler does not see that event.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, handler: impl FnMut(&VesselEvent) + 'static) -> Subscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id.saturating_add(1));
        let handler: Handler = Box::new(handler);

        match self.shared.handlers.try_borrow_mut() {
            Ok(mut handlers) => {
                handlers.insert(id, handler);
                tracing::debug!("Lifecycle subscriber {} registered", id);
            }
            Err(_) => match self.shared.deferred.try_borrow_mut() {
                Ok(mut deferred) => {
                    deferred.added.push((id, handler));
                    tracing::debug!("Lifecycle subscriber {} registered after publish", id);
                }
                Err(_) => {
                    tracing::warn!("Lifecycle subscriber {} could not be registered", id);
                }
            },
        }

        Subscription {
            id,
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Deliver an event to every subscriber in registration order.
    ///
    /// Returns the number of handlers invoked. Handlers released earlier in
    /// the same publish are skipped. Publishing from inside a handler is
    /// ignored with a warning.
    pub fn publish(&self, event: &VesselEvent) -> usize {
        let delivered = {
            let Ok(mut handlers) = self.shared.handlers.try_borrow_mut() else {
                tracing::warn!("Re-entrant publish of {:?} ignored", event);
                return 0;
            };

            let mut delivered = 0;
            for (id, handler) in handlers.iter_mut() {
                if self.shared.is_released(*id) {
                    continue;
                }
                handler(event);
                delivered += 1;
            }
            delivered
        };

        self.shared.apply_deferred();
        delivered
    }

    /// Number of live subscriptions. Reads 0 while a publish is running.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.handlers.try_borrow().map_or(0, |h| h.len())
    }
}

/// Guard for a registered handler; unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Remove the handler now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(shared) = self.shared.upgrade() else {
            // Notifier already gone
            return;
        };

        // Removed outside the borrow: the handler may own other guards.
        let removed = match shared.handlers.try_borrow_mut() {
            Ok(mut handlers) => handlers.remove(&self.id),
            Err(_) => {
                if let Ok(mut deferred) = shared.deferred.try_borrow_mut() {
                    deferred.released.insert(self.id);
                }
                tracing::debug!(
                    "Lifecycle subscriber {} released after the current publish",
                    self.id
                );
                return;
            }
        };
        drop(removed);
        tracing::debug!("Lifecycle subscriber {} released", self.id);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn created(id: u64, kind: VesselKind) -> VesselEvent {
        VesselEvent::Created {
            id: VesselId(id),
            kind,
        }
    }

    #[test]
    fn delivers_to_subscribers() {
        let notifier = LifecycleNotifier::new();
        let seen = Rc::new(Cell::new(0));

        let counter = Rc::clone(&seen);
        let _subscription = notifier.subscribe(move |_| counter.set(counter.get() + 1));

        assert_eq!(notifier.publish(&created(1, VesselKind::Ship)), 1);
        assert_eq!(notifier.publish(&created(2, VesselKind::Flag)), 1);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let notifier = LifecycleNotifier::new();
        let seen = Rc::new(Cell::new(0));

        let counter = Rc::clone(&seen);
        let subscription = notifier.subscribe(move |_| counter.set(counter.get() + 1));
        assert_eq!(notifier.subscriber_count(), 1);

        subscription.unsubscribe();
        assert_eq!(notifier.subscriber_count(), 0);
        assert_eq!(notifier.publish(&created(1, VesselKind::Ship)), 0);
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn guard_outliving_notifier_is_harmless() {
        let notifier = LifecycleNotifier::new();
        let subscription = notifier.subscribe(|_| {});
        drop(notifier);
        drop(subscription);
    }

    #[test]
    fn guard_dropped_during_publish_is_released() {
        let notifier = LifecycleNotifier::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let victim_slot = Rc::clone(&slot);
        let _owner = notifier.subscribe(move |_| {
            victim_slot.borrow_mut().take();
        });

        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        *slot.borrow_mut() = Some(notifier.subscribe(move |_| counter.set(counter.get() + 1)));
        assert_eq!(notifier.subscriber_count(), 2);

        // The released handler is skipped for the rest of this publish
        assert_eq!(notifier.publish(&created(1, VesselKind::Ship)), 1);
        assert_eq!(seen.get(), 0);
        assert_eq!(notifier.subscriber_count(), 1);
        assert_eq!(notifier.publish(&created(2, VesselKind::Ship)), 1);
    }

    #[test]
    fn subscribe_from_handler_takes_effect_after_publish() {
        let notifier = Rc::new(LifecycleNotifier::new());
        let late: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let weak = Rc::downgrade(&notifier);
        let late_slot = Rc::clone(&late);
        let _first = notifier.subscribe(move |_| {
            let Some(notifier) = weak.upgrade() else {
                return;
            };
            if late_slot.borrow().is_none() {
                let guard = notifier.subscribe(|_| {});
                *late_slot.borrow_mut() = Some(guard);
            }
        });

        assert_eq!(notifier.publish(&created(1, VesselKind::Probe)), 1);
        assert!(late.borrow().is_some());
        assert_eq!(notifier.subscriber_count(), 2);
        assert_eq!(notifier.publish(&created(2, VesselKind::Probe)), 2);

        late.borrow_mut().take();
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[test]
    fn reentrant_publish_is_ignored() {
        let notifier = Rc::new(LifecycleNotifier::new());
        let inner = Rc::new(Cell::new(usize::MAX));

        let weak = Rc::downgrade(&notifier);
        let result = Rc::clone(&inner);
        let _guard = notifier.subscribe(move |event| {
            if let Some(notifier) = weak.upgrade() {
                result.set(notifier.publish(event));
            }
        });

        assert_eq!(notifier.publish(&created(1, VesselKind::Rover)), 1);
        assert_eq!(inner.get(), 0);
    }

    #[test]
    fn event_accessors() {
        let event = VesselEvent::Destroyed {
            id: VesselId(9),
            kind: VesselKind::Relay,
        };
        assert_eq!(event.id(), VesselId(9));
        assert_eq!(event.kind(), VesselKind::Relay);
    }
}
