//! Field change broadcasting.
//!
//! [`ChangeNotifier`] is a single-threaded observer list. Delivery runs over a
//! snapshot of the subscriber list, so handlers may subscribe or unsubscribe
//! while an event is in flight:
//!
//! 1. Subscribers are notified in registration order.
//! 2. A subscription only sees events emitted after it was created.
//! 3. A subscription deactivated during delivery receives nothing further,
//!    including the rest of the current delivery.
//! 4. Inactive entries are pruned lazily on the next emit or subscribe.

use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use futures::{FutureExt, Stream, StreamExt};
use futures::channel::mpsc::{self, UnboundedReceiver};

use super::value::{FieldKey, FieldValue};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeEvent {
    pub key: FieldKey,
    pub value: FieldValue,
}

type Predicate = Box<dyn Fn(&ChangeEvent) -> bool>;
type Handler = Box<dyn Fn(&ChangeEvent)>;

struct Subscriber {
    active: Cell<bool>,
    predicate: Predicate,
    handler: Handler,
}

#[derive(Default)]
struct NotifierInner {
    subscribers: Vec<Rc<Subscriber>>,
}

impl NotifierInner {
    fn prune(&mut self) {
        self.subscribers.retain(|subscriber| subscriber.active.get());
    }
}

#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Rc<RefCell<NotifierInner>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: &ChangeEvent) {
        let snapshot = {
            let mut inner = self.inner.borrow_mut();
            inner.prune();
            inner.subscribers.clone()
        };
        tracing::trace!(key = %event.key, subscribers = snapshot.len(), "emitting field change");
        for subscriber in snapshot {
            if subscriber.active.get() && (subscriber.predicate)(event) {
                (subscriber.handler)(event);
            }
        }
    }

    pub fn subscribe<P, H>(&self, predicate: P, handler: H) -> Subscription
    where
        P: Fn(&ChangeEvent) -> bool + 'static,
        H: Fn(&ChangeEvent) + 'static,
    {
        let subscriber = Rc::new(Subscriber {
            active: Cell::new(true),
            predicate: Box::new(predicate),
            handler: Box::new(handler),
        });
        {
            let mut inner = self.inner.borrow_mut();
            inner.prune();
            inner.subscribers.push(subscriber.clone());
        }
        Subscription {
            subscriber: Rc::downgrade(&subscriber),
            notifier: Rc::downgrade(&self.inner),
        }
    }

    pub fn subscribe_key<H>(&self, key: impl Into<FieldKey>, handler: H) -> Subscription
    where
        H: Fn(&ChangeEvent) + 'static,
    {
        let key = key.into();
        self.subscribe(move |event| event.key == key, handler)
    }

    /// Buffers matching events into a [`ChangeStream`].
    pub fn stream<P>(&self, predicate: P) -> ChangeStream
    where
        P: Fn(&ChangeEvent) -> bool + 'static,
    {
        let (sender, receiver) = mpsc::unbounded();
        let subscription = self.subscribe(predicate, move |event| {
            // The receiver lives inside the stream, so a closed channel means
            // the stream is already being dropped.
            let _ = sender.unbounded_send(event.clone());
        });
        ChangeStream {
            receiver,
            _subscription: subscription,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|subscriber| subscriber.active.get())
            .count()
    }
}

impl Debug for ChangeNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle to an active subscription. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    subscriber: Weak<Subscriber>,
    notifier: Weak<RefCell<NotifierInner>>,
}

impl Subscription {
    /// Stops delivery. Calling it again, or from inside a handler, is fine.
    pub fn unsubscribe(&self) {
        let Some(subscriber) = self.subscriber.upgrade() else {
            return;
        };
        if !subscriber.active.replace(false) {
            return;
        }
        // Inside a prune the list is already borrowed; the entry goes on the next one.
        if let Some(inner) = self.notifier.upgrade() {
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner.prune();
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscriber
            .upgrade()
            .is_some_and(|subscriber| subscriber.active.get())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Change events as a [`Stream`]. Dropping the stream unsubscribes.
#[must_use = "streams do nothing unless polled"]
pub struct ChangeStream {
    receiver: UnboundedReceiver<ChangeEvent>,
    _subscription: Subscription,
}

impl ChangeStream {
    /// Takes a buffered event without waiting.
    pub fn try_next_event(&mut self) -> Option<ChangeEvent> {
        self.receiver.next().now_or_never().flatten()
    }
}

impl Stream for ChangeStream {
    type Item = ChangeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl Debug for ChangeStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeStream")
            .field("subscription", &self._subscription)
            .finish()
    }
}
