//! Owned, single-threaded publish/subscribe channel.
//!
//! Every subscriber gets its own queue. Publishing clones the event into each live queue;
//! subscribers drain at a point of their choosing. Dropping a [`Subscription`] unregisters it.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

struct Registry<E> {
    next_id: u64,
    queues: BTreeMap<u64, VecDeque<E>>,
}

/// Shared handle to a channel. Clones refer to the same set of subscribers.
pub struct EventChannel<E> {
    inner: Rc<RefCell<Registry<E>>>,
}

impl<E> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                next_id: 0,
                queues: BTreeMap::new(),
            })),
        }
    }

    pub fn subscribe(&self) -> Subscription<E> {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.queues.insert(id, VecDeque::new());
        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().queues.len()
    }
}

impl<E: Clone> EventChannel<E> {
    /// Delivers `event` to every live subscriber in subscription order.
    pub fn publish(&self, event: E) {
        let mut registry = self.inner.borrow_mut();
        let mut queues = registry.queues.values_mut().peekable();
        while let Some(queue) = queues.next() {
            if queues.peek().is_some() {
                queue.push_back(event.clone());
            } else {
                queue.push_back(event);
                break;
            }
        }
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Registration handle returned by [`EventChannel::subscribe`].
pub struct Subscription<E> {
    id: u64,
    registry: Weak<RefCell<Registry<E>>>,
}

impl<E> Subscription<E> {
    /// Takes every queued event, oldest first.
    pub fn drain(&self) -> Vec<E> {
        let Some(registry) = self.registry.upgrade() else {
            return Vec::new();
        };
        let mut registry = registry.borrow_mut();
        let drained = match registry.queues.get_mut(&self.id) {
            Some(queue) => queue.drain(..).collect(),
            None => Vec::new(),
        };
        drained
    }

    pub fn pending(&self) -> usize {
        let Some(registry) = self.registry.upgrade() else {
            return 0;
        };
        let len = registry.borrow().queues.get(&self.id).map_or(0, VecDeque::len);
        len
    }

    /// `false` once the channel itself has been dropped.
    pub fn is_connected(&self) -> bool {
        self.registry.strong_count() > 0
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut registry) = registry.try_borrow_mut() {
                registry.queues.remove(&self.id);
            }
        }
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
