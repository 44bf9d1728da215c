//! Deferred-execution schedulers.
//!
//! Every settlement of a [Future](crate::future::Future) is delivered through a
//! [Scheduler]: a single-method capability that accepts a callback and runs it
//! later. Each thread has one installed scheduler, which futures capture when
//! they are constructed. By default this is the thread's
//! [EventLoop](crate::task::EventLoop), but tests may swap in [Immediate] or
//! any other implementation with [install].
//!
//! # Example
//!
//! ```
//! use eventual::future::{Future, State};
//! use eventual::scheduler::{self, Immediate};
//! use std::rc::Rc;
//!
//! let previous = scheduler::install(Rc::new(Immediate));
//! let f = Future::<_, ()>::resolve(7);
//! assert_eq!(f.state(), State::Fulfilled(7));
//! scheduler::install(previous);
//! ```
use std::{cell::RefCell, rc::Rc};

use crate::task::EventLoop;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Something that can run a [Task] later.
///
/// Implementations must run tasks in the order they were scheduled.
pub trait Scheduler {
    fn schedule(&self, task: Task);
}

/// Queues tasks on this thread's [EventLoop].
#[derive(Debug, Default, Clone, Copy)]
pub struct EventLoopScheduler;

impl Scheduler for EventLoopScheduler {
    fn schedule(&self, task: Task) {
        EventLoop::spawn(task);
    }
}

/// Runs each task synchronously, in place.
///
/// Notification is no longer deferred with this scheduler, so a future whose
/// setup settles it is already settled once construction returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Scheduler for Immediate {
    fn schedule(&self, task: Task) {
        task()
    }
}

thread_local! {
    static SCHEDULER: RefCell<Rc<dyn Scheduler>> = RefCell::new(Rc::new(EventLoopScheduler));
}

/// Install `scheduler` for this thread, returning the one it replaces.
///
/// Only futures constructed afterwards pick it up.
pub fn install(scheduler: Rc<dyn Scheduler>) -> Rc<dyn Scheduler> {
    SCHEDULER.with(|s| s.replace(scheduler))
}

/// The scheduler currently installed on this thread.
pub fn current() -> Rc<dyn Scheduler> {
    SCHEDULER.with(|s| s.borrow().clone())
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::{current, install, Immediate, Scheduler, Task};
    use crate::task::EventLoop;

    #[test]
    fn default_defers_to_event_loop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = log.clone();
            current().schedule(Box::new(move || log.borrow_mut().push(1)));
        }
        assert!(log.borrow().is_empty());
        assert_eq!(EventLoop::pending(), 1);

        EventLoop::run();
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn immediate_runs_in_place() {
        let hit = Rc::new(RefCell::new(false));
        {
            let hit = hit.clone();
            Immediate.schedule(Box::new(move || *hit.borrow_mut() = true));
        }
        assert!(*hit.borrow());
        assert_eq!(EventLoop::pending(), 0);
    }

    struct Recording(RefCell<Vec<Task>>);

    impl Scheduler for Recording {
        fn schedule(&self, task: Task) {
            self.0.borrow_mut().push(task);
        }
    }

    #[test]
    fn install_swaps_and_restores() {
        let recording = Rc::new(Recording(RefCell::new(Vec::new())));
        let previous = install(recording.clone());

        current().schedule(Box::new(|| {}));
        assert_eq!(recording.0.borrow().len(), 1);
        assert_eq!(EventLoop::pending(), 0);

        install(previous);
        current().schedule(Box::new(|| {}));
        assert_eq!(recording.0.borrow().len(), 1);
        assert_eq!(EventLoop::pending(), 1);
        EventLoop::run();
    }
}
