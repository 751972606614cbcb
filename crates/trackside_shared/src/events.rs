//! Domain events and multi-subscriber channels.
//!
//! The timing backend emits [`DomainEvent`]s, possibly from a background
//! thread. Widgets subscribe and get back a [`Subscription`]; dropping it (or
//! calling [`Subscription::release`]) unsubscribes exactly once.
//!
//! Callbacks run on the emitting thread. A callback must never touch the
//! node tree directly: set a [`DirtyFlag`] or use a queued subscription and
//! do the rebuild during the next Update.

use crate::ids::{PilotId, RaceId};
use crossbeam_channel::{unbounded, Receiver};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Event type discriminator.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The current race changed.
    RaceChanged = 0,
    /// A pilot was added to the registry.
    PilotAdded = 1,
    /// A pilot was removed from the registry.
    PilotRemoved = 2,
    /// A lap was recorded.
    LapRecorded = 3,
    /// The race clock started.
    RaceStarted = 4,
    /// The race clock stopped.
    RaceEnded = 5,
}

/// Events emitted by domain collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The current race changed. `None` means no race is selected.
    RaceChanged {
        /// The newly selected race.
        race: Option<RaceId>,
    },
    /// A pilot was registered.
    PilotAdded {
        /// The new pilot.
        pilot: PilotId,
        /// Display name.
        name: String,
    },
    /// A pilot was removed.
    PilotRemoved {
        /// The removed pilot.
        pilot: PilotId,
    },
    /// A lap was detected.
    LapRecorded {
        /// Race the lap belongs to.
        race: RaceId,
        /// Pilot who completed it.
        pilot: PilotId,
        /// Lap number within the race, starting at 1.
        lap: u32,
        /// Lap time in milliseconds.
        lap_ms: u64,
    },
    /// The race clock started.
    RaceStarted {
        /// The race.
        race: RaceId,
    },
    /// The race clock stopped.
    RaceEnded {
        /// The race.
        race: RaceId,
    },
}

impl DomainEvent {
    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::RaceChanged { .. } => EventKind::RaceChanged,
            Self::PilotAdded { .. } => EventKind::PilotAdded,
            Self::PilotRemoved { .. } => EventKind::PilotRemoved,
            Self::LapRecorded { .. } => EventKind::LapRecorded,
            Self::RaceStarted { .. } => EventKind::RaceStarted,
            Self::RaceEnded { .. } => EventKind::RaceEnded,
        }
    }

    /// Returns the race this event refers to, if any.
    #[must_use]
    pub const fn race(&self) -> Option<RaceId> {
        match self {
            Self::RaceChanged { race } => *race,
            Self::LapRecorded { race, .. }
            | Self::RaceStarted { race }
            | Self::RaceEnded { race } => Some(*race),
            Self::PilotAdded { .. } | Self::PilotRemoved { .. } => None,
        }
    }
}

/// A "something changed" marker shared between a callback and a widget.
///
/// The callback side calls [`DirtyFlag::set`] from any thread; the widget
/// calls [`DirtyFlag::take`] during Update.
#[derive(Clone, Debug, Default)]
pub struct DirtyFlag(Arc<AtomicBool>);

impl DirtyFlag {
    /// Creates a cleared flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the flag.
    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether the flag is marked, clearing it.
    #[inline]
    #[must_use]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Returns whether the flag is marked without clearing it.
    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Subscriber<E> {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Callback<E>,
}

struct Subscribers<E> {
    next_id: u64,
    entries: Vec<Subscriber<E>>,
}

/// A named, multi-subscriber event channel.
///
/// Cloning the channel yields another handle to the same subscriber table.
pub struct EventChannel<E> {
    name: &'static str,
    inner: Arc<Mutex<Subscribers<E>>>,
}

impl<E> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<E> EventChannel<E> {
    /// Returns the channel name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

impl<E: 'static> EventChannel<E> {
    /// Creates a channel with no subscribers.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Arc::new(Mutex::new(Subscribers {
                next_id: 1,
                entries: Vec::new(),
            })),
        }
    }

    /// Subscribes a callback.
    ///
    /// The callback stays registered until the returned handle is released
    /// or dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let id = {
            let mut subs = self.inner.lock();
            let id = subs.next_id;
            subs.next_id += 1;
            subs.entries.push(Subscriber {
                id,
                active: Arc::clone(&active),
                callback: Arc::new(callback),
            });
            id
        };
        tracing::trace!(channel = self.name, id, "subscribed");

        let weak: Weak<Mutex<Subscribers<E>>> = Arc::downgrade(&self.inner);
        let name = self.name;
        Subscription {
            release: Some(Box::new(move || {
                active.store(false, Ordering::Release);
                if let Some(inner) = weak.upgrade() {
                    inner.lock().entries.retain(|s| s.id != id);
                }
                tracing::trace!(channel = name, id, "unsubscribed");
            })),
        }
    }

    /// Subscribes a queue. Every emitted event is cloned into the receiver,
    /// which the owner drains on its own schedule.
    pub fn subscribe_queue(&self) -> (Subscription, Receiver<E>)
    where
        E: Clone + Send,
    {
        let (tx, rx) = unbounded();
        let sub = self.subscribe(move |event: &E| {
            // A dropped receiver just means nobody is listening anymore.
            let _ = tx.send(event.clone());
        });
        (sub, rx)
    }

    /// Subscribes a [`DirtyFlag`] that is set whenever `filter` accepts an event.
    pub fn subscribe_flag<F>(&self, filter: F) -> (Subscription, DirtyFlag)
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        let flag = DirtyFlag::new();
        let setter = flag.clone();
        let sub = self.subscribe(move |event: &E| {
            if filter(event) {
                setter.set();
            }
        });
        (sub, flag)
    }

    /// Delivers an event to every live subscriber.
    ///
    /// Returns the number of callbacks invoked. Callbacks may subscribe or
    /// unsubscribe re-entrantly; the subscriber list is snapshotted first.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<(Arc<AtomicBool>, Callback<E>)> = self
            .inner
            .lock()
            .entries
            .iter()
            .map(|s| (Arc::clone(&s.active), Arc::clone(&s.callback)))
            .collect();

        let mut delivered = 0;
        for (active, callback) in snapshot {
            if active.load(Ordering::Acquire) {
                callback(event);
                delivered += 1;
            }
        }
        delivered
    }
}

/// Scoped subscription handle.
///
/// Unsubscribes when released or dropped, whichever comes first.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Unsubscribes now. Further calls are no-ops.
    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Returns true while the subscription is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn race_changed(raw: u64) -> DomainEvent {
        DomainEvent::RaceChanged {
            race: Some(RaceId::new(raw)),
        }
    }

    #[test]
    fn test_event_kind() {
        let event = DomainEvent::LapRecorded {
            race: RaceId::new(1),
            pilot: PilotId::new(2),
            lap: 3,
            lap_ms: 41_200,
        };
        assert_eq!(event.kind(), EventKind::LapRecorded);
        assert_eq!(event.race(), Some(RaceId::new(1)));
    }

    #[test]
    fn test_debug_shows_name_and_subscribers() {
        let channel: EventChannel<DomainEvent> = EventChannel::new("race");
        let _sub = channel.subscribe(|_| {});
        let text = format!("{channel:?}");
        assert!(text.contains("race"));
        assert!(text.contains("subscribers: 1"));
    }

    #[test]
    fn test_subscribe_and_emit() {
        let channel = EventChannel::new("race");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = channel.subscribe(move |_: &DomainEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(channel.emit(&race_changed(1)), 1);
        assert_eq!(channel.emit(&race_changed(2)), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_release_is_idempotent() {
        let channel = EventChannel::new("race");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut sub = channel.subscribe(move |_: &DomainEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(channel.subscriber_count(), 1);

        sub.release();
        sub.release();
        assert!(!sub.is_active());
        assert_eq!(channel.subscriber_count(), 0);

        channel.emit(&race_changed(1));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let channel: EventChannel<DomainEvent> = EventChannel::new("race");
        {
            let _sub = channel.subscribe(|_| {});
            assert_eq!(channel.subscriber_count(), 1);
        }
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_channel() {
        let channel: EventChannel<DomainEvent> = EventChannel::new("race");
        let mut sub = channel.subscribe(|_| {});
        drop(channel);
        sub.release();
        assert!(!sub.is_active());
    }

    #[test]
    fn test_queue_subscription() {
        let channel = EventChannel::new("race");
        let (_sub, rx) = channel.subscribe_queue();
        channel.emit(&race_changed(7));
        channel.emit(&race_changed(8));

        let drained: Vec<DomainEvent> = rx.try_iter().collect();
        assert_eq!(drained, vec![race_changed(7), race_changed(8)]);
    }

    #[test]
    fn test_flag_subscription_filters() {
        let channel = EventChannel::new("race");
        let (_sub, flag) =
            channel.subscribe_flag(|e: &DomainEvent| e.kind() == EventKind::RaceChanged);

        channel.emit(&DomainEvent::PilotRemoved {
            pilot: PilotId::new(1),
        });
        assert!(!flag.is_set());

        channel.emit(&race_changed(1));
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn test_emit_from_background_thread() {
        let channel = EventChannel::new("race");
        let (_sub, flag) = channel.subscribe_flag(|_: &DomainEvent| true);
        let remote = channel.clone();
        std::thread::spawn(move || {
            remote.emit(&race_changed(1));
        })
        .join()
        .expect("emitter thread panicked");
        assert!(flag.take());
    }

    #[test]
    fn test_unsubscribe_inside_callback() {
        let channel: EventChannel<DomainEvent> = EventChannel::new("race");
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&slot);
        let sub = channel.subscribe(move |_| {
            // Releasing from inside a callback must not deadlock.
            if let Some(mut sub) = inner.lock().take() {
                sub.release();
            }
        });
        *slot.lock() = Some(sub);

        assert_eq!(channel.emit(&race_changed(1)), 1);
        assert_eq!(channel.subscriber_count(), 0);
        assert_eq!(channel.emit(&race_changed(2)), 0);
    }
}
