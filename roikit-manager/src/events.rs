//! Synchronous notification channels.
//!
//! Handlers run inside the emitting call, in subscription order. A channel
//! can be paused with [`EventEmitter::blocker`]; delivery resumes when the
//! last [`EmitterBlocker`] is dropped.

use roikit_core::ShapeKind;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

type Handler<E> = Box<dyn FnMut(&E)>;

/// A typed notification channel.
pub struct EventEmitter<E> {
    handlers: RefCell<Vec<Handler<E>>>,
    blocked: Rc<Cell<usize>>,
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field(
                "handlers",
                &format!("<{} handlers>", self.handlers.borrow().len()),
            )
            .field("blocked", &self.blocked.get())
            .finish()
    }
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventEmitter<E> {
    /// Creates a channel without handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            blocked: Rc::new(Cell::new(0)),
        }
    }

    /// Subscribe a handler to receive events.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: FnMut(&E) + 'static,
    {
        self.handlers.borrow_mut().push(Box::new(handler));
    }

    /// Emit an event to all registered handlers, unless paused.
    ///
    /// Handlers must not emit on the same channel.
    pub fn emit(&self, event: &E) {
        if self.is_blocked() {
            return;
        }
        for handler in &mut *self.handlers.borrow_mut() {
            handler(event);
        }
    }

    /// Pauses delivery until the returned guard is dropped.
    #[must_use = "delivery resumes as soon as the blocker is dropped"]
    pub fn blocker(&self) -> EmitterBlocker {
        self.blocked.set(self.blocked.get() + 1);
        EmitterBlocker {
            depth: Rc::clone(&self.blocked),
        }
    }

    /// Returns true while at least one blocker is alive.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blocked.get() > 0
    }

    /// Number of subscribed handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

/// Scope guard returned by [`EventEmitter::blocker`].
///
/// Holds its own handle to the pause counter, so it does not borrow the
/// channel's owner.
#[derive(Debug)]
pub struct EmitterBlocker {
    depth: Rc<Cell<usize>>,
}

impl Drop for EmitterBlocker {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Stage of a canvas data change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Adding,
    Added,
    Removing,
    Removed,
}

/// Canvas data change: what happened and to which live indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEvent {
    pub action: ActionType,
    pub indices: BTreeSet<usize>,
}

impl DataEvent {
    /// A shape is about to be appended.
    #[must_use]
    pub fn adding() -> Self {
        Self {
            action: ActionType::Adding,
            indices: BTreeSet::new(),
        }
    }

    /// A shape was appended at `index`.
    #[must_use]
    pub fn added(index: usize) -> Self {
        Self {
            action: ActionType::Added,
            indices: BTreeSet::from([index]),
        }
    }

    /// `indices` are about to be removed.
    #[must_use]
    pub fn removing(indices: BTreeSet<usize>) -> Self {
        Self {
            action: ActionType::Removing,
            indices,
        }
    }

    /// `indices` were removed.
    #[must_use]
    pub fn removed(indices: BTreeSet<usize>) -> Self {
        Self {
            action: ActionType::Removed,
            indices,
        }
    }
}

/// A ROI was registered at list row `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiAdded {
    pub index: usize,
    pub kind: ShapeKind,
    pub name: Option<String>,
}

/// Registered ROIs at the given list rows were removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiRemoved {
    pub indices: BTreeSet<usize>,
}

/// Notification channels exposed by [`crate::RoiLayer`].
#[derive(Debug, Default)]
pub struct LayerEvents {
    pub roi_added: EventEmitter<RoiAdded>,
    pub roi_removed: EventEmitter<RoiRemoved>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_in_subscription_order() {
        let emitter = EventEmitter::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            emitter.subscribe(move |v: &u32| log.borrow_mut().push(format!("{tag}{v}")));
        }
        emitter.emit(&1);
        emitter.emit(&2);
        assert_eq!(*log.borrow(), vec!["a1", "b1", "a2", "b2"]);
        assert_eq!(emitter.handler_count(), 2);
    }

    #[test]
    fn test_blocker_restores_delivery() {
        let emitter = EventEmitter::<u32>::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        emitter.subscribe(move |_| c.set(c.get() + 1));

        {
            let _outer = emitter.blocker();
            {
                let _inner = emitter.blocker();
                emitter.emit(&0);
            }
            assert!(emitter.is_blocked());
            emitter.emit(&0);
        }
        assert!(!emitter.is_blocked());
        emitter.emit(&0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_blocker_released_on_early_return() {
        fn fails(emitter: &EventEmitter<u32>) -> Result<(), ()> {
            let _guard = emitter.blocker();
            Err(())
        }
        let emitter = EventEmitter::<u32>::new();
        assert!(fails(&emitter).is_err());
        assert!(!emitter.is_blocked());
    }
}
