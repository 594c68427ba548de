//! Typed publish/subscribe bus
//!
//! Every stateful model (state holder, playlist views, hardware channel,
//! engine) publishes through an `EventBus`. Subscribers are shared trait
//! objects compared by pointer identity.
//!
//! # Threading
//!
//! `notify` runs every subscriber on the *caller's* thread, which may be a
//! hardware listener or an engine decode thread. Subscribers that touch UI
//! state must hand the event over to the UI thread themselves (a flag, a
//! queue, or a `ChannelSubscriber`). The subscriber lock is held for the
//! whole `notify` call, so `update` must not attach or detach on the same bus.

use crossbeam_channel::Sender;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives events from an `EventBus`
///
/// `update` may be called from any thread.
pub trait Subscriber<E>: Send + Sync {
    /// Called once per `notify` on the publishing bus
    fn update(&self, event: &E);
}

impl<E, F> Subscriber<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn update(&self, event: &E) {
        self(event);
    }
}

/// Many-to-many publisher
pub struct EventBus<E> {
    subscribers: Mutex<Vec<Arc<dyn Subscriber<E>>>>,
}

impl<E> EventBus<E> {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn Subscriber<E>>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a subscriber
    ///
    /// Attaching the same subscriber twice is a no-op. Returns whether the
    /// subscriber was newly added.
    pub fn attach(&self, subscriber: Arc<dyn Subscriber<E>>) -> bool {
        let mut subscribers = self.lock();
        if subscribers.iter().any(|s| same_subscriber(s, &subscriber)) {
            return false;
        }
        subscribers.push(subscriber);
        true
    }

    /// Remove a subscriber
    ///
    /// Detaching a subscriber that was never attached is a no-op. Returns
    /// whether anything was removed.
    pub fn detach(&self, subscriber: &Arc<dyn Subscriber<E>>) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|s| !same_subscriber(s, subscriber));
        subscribers.len() != before
    }

    /// Deliver `event` to every attached subscriber
    pub fn notify(&self, event: &E) {
        let subscribers = self.lock();
        for subscriber in subscribers.iter() {
            subscriber.update(event);
        }
    }

    /// Number of attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn same_subscriber<E>(a: &Arc<dyn Subscriber<E>>, b: &Arc<dyn Subscriber<E>>) -> bool {
    // Compare data pointers only; vtable pointers are not unique
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Subscriber that forwards events into a channel
///
/// This is how foreign-thread publishers feed a single-owner mailbox instead
/// of calling into its owner directly. With a bounded channel, `update`
/// blocks the publishing thread while the mailbox is full.
pub struct ChannelSubscriber<E, M> {
    tx: Sender<M>,
    map: Box<dyn Fn(&E) -> M + Send + Sync>,
}

impl<E, M> ChannelSubscriber<E, M> {
    /// Forward events converted by `map`
    pub fn mapped(tx: Sender<M>, map: impl Fn(&E) -> M + Send + Sync + 'static) -> Self {
        Self {
            tx,
            map: Box::new(map),
        }
    }
}

impl<E: Clone + 'static> ChannelSubscriber<E, E> {
    /// Forward clones of the events unchanged
    pub fn forwarding(tx: Sender<E>) -> Self {
        Self::mapped(tx, E::clone)
    }
}

impl<E, M: Send> Subscriber<E> for ChannelSubscriber<E, M> {
    fn update(&self, event: &E) {
        if self.tx.send((self.map)(event)).is_err() {
            tracing::debug!("Dropping event: receiving side of the channel is closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct Counter {
        hits: AtomicUsize,
    }

    impl Counter {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                hits: AtomicUsize::new(0),
            })
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    impl Subscriber<u32> for Counter {
        fn update(&self, _event: &u32) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn attach_is_idempotent() {
        let bus = EventBus::<u32>::new();
        let counter = Counter::new();
        let subscriber: Arc<dyn Subscriber<u32>> = counter.clone();

        assert!(bus.attach(subscriber.clone()));
        assert!(!bus.attach(subscriber));
        assert_eq!(bus.subscriber_count(), 1);

        bus.notify(&7);
        assert_eq!(counter.hits(), 1);
    }

    #[test]
    fn detach_unknown_is_noop() {
        let bus = EventBus::<u32>::new();
        let attached: Arc<dyn Subscriber<u32>> = Counter::new();
        let stranger: Arc<dyn Subscriber<u32>> = Counter::new();

        bus.attach(attached.clone());
        assert!(!bus.detach(&stranger));
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.detach(&attached));
        assert!(!bus.detach(&attached));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn notify_reaches_every_subscriber() {
        let bus = EventBus::<u32>::new();
        let first = Counter::new();
        let second = Counter::new();
        bus.attach(first.clone());
        bus.attach(second.clone());

        bus.notify(&1);
        bus.notify(&2);

        assert_eq!(first.hits(), 2);
        assert_eq!(second.hits(), 2);
    }

    #[test]
    fn detached_subscriber_stops_receiving() {
        let bus = EventBus::<u32>::new();
        let counter = Counter::new();
        let subscriber: Arc<dyn Subscriber<u32>> = counter.clone();

        bus.attach(subscriber.clone());
        bus.notify(&1);
        bus.detach(&subscriber);
        bus.notify(&2);

        assert_eq!(counter.hits(), 1);
    }

    #[test]
    fn closures_are_subscribers() {
        let bus = EventBus::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.attach(Arc::new(move |event: &u32| sink.lock().unwrap().push(*event)));

        bus.notify(&3);
        bus.notify(&4);

        assert_eq!(*seen.lock().unwrap(), vec![3, 4]);
    }

    #[test]
    fn channel_subscriber_forwards_across_threads() {
        let bus = Arc::new(EventBus::<u32>::new());
        let (tx, rx) = unbounded();
        bus.attach(Arc::new(ChannelSubscriber::mapped(tx, |event: &u32| {
            format!("event {}", event)
        })));

        let publisher = {
            let bus = bus.clone();
            thread::spawn(move || {
                for i in 0..3 {
                    bus.notify(&i);
                }
            })
        };
        publisher.join().unwrap();

        let received: Vec<String> = rx.try_iter().collect();
        assert_eq!(received, vec!["event 0", "event 1", "event 2"]);
    }

    #[test]
    fn channel_subscriber_survives_closed_receiver() {
        let bus = EventBus::<u32>::new();
        let (tx, rx) = unbounded::<u32>();
        bus.attach(Arc::new(ChannelSubscriber::forwarding(tx)));
        drop(rx);

        // Must not panic
        bus.notify(&1);
    }
}
