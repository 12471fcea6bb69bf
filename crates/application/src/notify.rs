use std::fmt::{Debug, Formatter};

use crate::DecodeFailure;

/// Published once per upload batch, after every file in it has resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCompleted {
    pub batch_id: u64,
    pub files: usize,
    pub uploaded_images: usize,
    pub failures: Vec<DecodeFailure>,
}

type BatchHandler = Box<dyn FnMut(&BatchCompleted)>;

/// Single-slot "batch complete" channel.
///
/// Registering a handler replaces the previous one. Nothing is buffered: an
/// event published while no handler is registered is dropped, and a handler
/// registered afterwards never sees it.
#[derive(Default)]
pub struct NotificationBus {
    handler: Option<BatchHandler>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when an earlier handler was replaced.
    pub fn on_batch_complete<F>(&mut self, handler: F) -> bool
    where
        F: FnMut(&BatchCompleted) + 'static,
    {
        self.handler.replace(Box::new(handler)).is_some()
    }

    pub fn clear(&mut self) {
        self.handler = None;
    }

    pub fn has_subscriber(&self) -> bool {
        self.handler.is_some()
    }

    /// Returns whether a handler received the event.
    pub fn publish(&mut self, event: &BatchCompleted) -> bool {
        match self.handler.as_mut() {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

impl Debug for NotificationBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("has_subscriber", &self.has_subscriber())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn event(batch_id: u64) -> BatchCompleted {
        BatchCompleted {
            batch_id,
            files: 1,
            uploaded_images: 1,
            failures: Vec::new(),
        }
    }

    #[test]
    fn publish_without_subscriber_is_dropped() {
        let mut bus = NotificationBus::new();
        assert!(!bus.publish(&event(1)));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.on_batch_complete(move |event| sink.borrow_mut().push(event.batch_id));
        assert!(seen.borrow().is_empty());

        assert!(bus.publish(&event(2)));
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn resubscribing_replaces_previous_handler() {
        let mut bus = NotificationBus::new();
        let first = Rc::new(RefCell::new(0));
        let second = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&first);
        assert!(!bus.on_batch_complete(move |_| *counter.borrow_mut() += 1));
        let counter = Rc::clone(&second);
        assert!(bus.on_batch_complete(move |_| *counter.borrow_mut() += 1));

        bus.publish(&event(1));
        assert_eq!(*first.borrow(), 0);
        assert_eq!(*second.borrow(), 1);
    }

    #[test]
    fn clear_removes_the_subscriber() {
        let mut bus = NotificationBus::new();
        bus.on_batch_complete(|_| {});
        bus.clear();
        assert!(!bus.has_subscriber());
        assert!(!bus.publish(&event(1)));
    }
}
