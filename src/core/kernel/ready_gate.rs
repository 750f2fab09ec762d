//=========================================================================
// Ready Gate
//=========================================================================
//
// One-time Pending → Ready transition with deferred continuations.
//
// State machine:
//   Pending(queue) ──open(value)──> Ready(value)
//        │                              │
//   when_ready(f): queued          when_ready(f): runs now
//
// The queue is drained exactly once, in registration order. No borrow is
// held while continuations run, so they may register further
// continuations (which then run immediately). A continuation that panics
// is logged and the drain moves on to the next one.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};

use log::error;

//=== Internal Dependencies ===============================================

use crate::core::event::panic_message;

//=== Public API ==========================================================

type Continuation<T> = Box<dyn FnOnce(&T)>;

enum GateState<T> {
    Pending(Vec<Continuation<T>>),
    Ready(T),
}

/// One-shot readiness gate carrying the value that made it ready.
pub struct ReadyGate<T: Clone> {
    state: RefCell<GateState<T>>,
}

impl<T: Clone> ReadyGate<T> {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(GateState::Pending(Vec::new())),
        }
    }

    /// Runs `continuation` once the gate is open; immediately if it already is.
    pub fn when_ready<F>(&self, continuation: F)
    where
        F: FnOnce(&T) + 'static,
    {
        let ready_value = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                GateState::Pending(queue) => {
                    queue.push(Box::new(continuation));
                    return;
                }
                GateState::Ready(value) => value.clone(),
            }
        };

        continuation(&ready_value);
    }

    /// Opens the gate and drains queued continuations.
    ///
    /// Returns false, doing nothing, if the gate was already open.
    pub fn open(&self, value: T) -> bool {
        let previous = {
            let mut state = self.state.borrow_mut();
            if let GateState::Ready(_) = *state {
                return false;
            }
            mem::replace(&mut *state, GateState::Ready(value.clone()))
        };

        let queue = match previous {
            GateState::Pending(queue) => queue,
            GateState::Ready(_) => Vec::new(),
        };

        let total = queue.len();
        for (position, continuation) in queue.into_iter().enumerate() {
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| continuation(&value))) {
                error!(
                    target: "kernel",
                    "Ready callback {}/{} panicked: {}",
                    position + 1,
                    total,
                    panic_message(panic.as_ref())
                );
            }
        }

        true
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), GateState::Ready(_))
    }

    /// Number of continuations still waiting.
    pub fn pending(&self) -> usize {
        match &*self.state.borrow() {
            GateState::Pending(queue) => queue.len(),
            GateState::Ready(_) => 0,
        }
    }
}

impl<T: Clone> Default for ReadyGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> fmt::Debug for ReadyGate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyGate")
            .field("ready", &self.is_ready())
            .field("pending", &self.pending())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn continuations_wait_for_open() {
        let gate = ReadyGate::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        gate.when_ready(move |v| s.borrow_mut().push(("first", *v)));
        let s = seen.clone();
        gate.when_ready(move |v| s.borrow_mut().push(("second", *v)));

        assert!(seen.borrow().is_empty());
        assert_eq!(gate.pending(), 2);

        assert!(gate.open(7));
        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn late_continuation_runs_immediately() {
        let gate = ReadyGate::<u32>::new();
        gate.open(1);

        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        gate.when_ready(move |v| *s.borrow_mut() = Some(*v));

        assert_eq!(*seen.borrow(), Some(1));
    }

    #[test]
    fn gate_opens_only_once() {
        let gate = ReadyGate::<u32>::new();
        let count = Rc::new(RefCell::new(0));

        let c = count.clone();
        gate.when_ready(move |_| *c.borrow_mut() += 1);

        assert!(gate.open(1));
        assert!(!gate.open(2));
        assert_eq!(*count.borrow(), 1);

        // The first value is kept
        let seen = Rc::new(RefCell::new(0));
        let s = seen.clone();
        gate.when_ready(move |v| *s.borrow_mut() = *v);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn panicking_continuation_does_not_drop_the_rest() {
        let gate = ReadyGate::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        gate.when_ready(|_| panic!("first callback failed"));
        let s = seen.clone();
        gate.when_ready(move |v| s.borrow_mut().push(*v));

        assert!(gate.open(3));
        assert!(gate.is_ready());
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn continuation_may_register_another() {
        let gate = Rc::new(ReadyGate::<u32>::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let g = gate.clone();
        let s = seen.clone();
        gate.when_ready(move |_| {
            s.borrow_mut().push("outer");
            let s = s.clone();
            g.when_ready(move |_| s.borrow_mut().push("inner"));
        });

        gate.open(0);
        assert_eq!(*seen.borrow(), vec!["outer", "inner"]);
    }
}
