//! Task and event loop management
//!
//! This module provides the per-thread event loop that runs deferred work.
//! Eventual uses a per-thread model, which means that each OS thread has its
//! own queue of tasks and its own virtual clock. This means that:
//!
//! 1. The thread upon which a task is queued is the same thread that will run
//!    it.
//! 2. Each thread needs to call one of [EventLoop::block_on], [EventLoop::run]
//!    or [EventLoop::turn] to do any work. Use the first if you want the
//!    outcome of a single future, or the others to drive everything queued.
//!
//! # Example
//!
//! Settlement is always deferred, so nothing is observed until the loop runs:
//!
//! ```
//! use eventual::future::{Future, State};
//! use eventual::task::EventLoop;
//! let f = Future::<_, ()>::resolve(2 + 8);
//! assert_eq!(f.state(), State::Pending);
//! EventLoop::run();
//! assert_eq!(f.state(), State::Fulfilled(10));
//! ```
//!
//! [EventLoop::block_on] is a shortcut for running until one future settles:
//!
//! ```
//! use eventual::future::Future;
//! use eventual::task::EventLoop;
//! let f = Future::<i32, String>::resolve(2).map(|x| x * 4);
//! assert_eq!(EventLoop::block_on(&f), Ok(Ok(8)));
//! ```
//!
//! # Time
//!
//! Besides the FIFO of ready tasks the loop keeps a queue of timers, ordered
//! by deadline. Time is virtual: when no ready task remains, the clock jumps
//! straight to the earliest deadline and that timer's task runs. A program
//! that waits "ten seconds" therefore finishes immediately, and always in the
//! same order.
//!
//! ```
//! use eventual::task::EventLoop;
//! use std::time::Duration;
//! EventLoop::schedule_after(Duration::from_secs(10), Box::new(|| {}));
//! EventLoop::run();
//! assert_eq!(EventLoop::now(), Duration::from_secs(10));
//! ```
use std::{
    cell::RefCell,
    cmp::Reverse,
    collections::{BinaryHeap, VecDeque},
    time::Duration,
};

use log::debug;
use slab::Slab;

use crate::{error::Error, future::Future, scheduler::Task};

/// A timer waiting in the loop: its task lives in the `timers` slab under
/// `key`, and `seq` keeps equal deadlines in scheduling order.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct Deadline {
    at: Duration,
    seq: u64,
    key: usize,
}

/// The event loop.
///
/// A type that is responsible for running deferred tasks in FIFO order. Work
/// is queued with [EventLoop::spawn] or [EventLoop::schedule_after], usually
/// indirectly by settling a [Future].
pub struct EventLoop {
    run_q: VecDeque<Task>,
    timers: Slab<Task>,
    deadlines: BinaryHeap<Reverse<Deadline>>,
    now: Duration,
    seq: u64,
}

thread_local! {
    static LOOP: RefCell<EventLoop> = RefCell::new(EventLoop {
        run_q: VecDeque::new(),
        timers: Slab::new(),
        deadlines: BinaryHeap::new(),
        now: Duration::ZERO,
        seq: 0,
    });
}

impl EventLoop {
    /// Queue `task` to run on this thread once every previously queued ready
    /// task has run. If called from a synchronous context, the task will *not*
    /// run until the loop is driven.
    pub fn spawn(task: Task) {
        LOOP.with(|l| l.borrow_mut().run_q.push_back(task));
    }

    /// Queue `task` to run once the virtual clock has advanced by `delay`.
    ///
    /// A zero `delay` is the same as [EventLoop::spawn].
    pub fn schedule_after(delay: Duration, task: Task) {
        if delay.is_zero() {
            return Self::spawn(task);
        }

        LOOP.with(|l| {
            let mut l = l.borrow_mut();
            let at = l.now + delay;
            let seq = l.seq;
            let key = l.timers.insert(task);

            l.seq += 1;
            l.deadlines.push(Reverse(Deadline { at, seq, key }));
        });
    }

    /// Virtual time elapsed on this thread's loop.
    pub fn now() -> Duration {
        LOOP.with(|l| l.borrow().now)
    }

    /// Number of tasks, ready or timed, that have yet to run.
    pub fn pending() -> usize {
        LOOP.with(|l| {
            let l = l.borrow();
            l.run_q.len() + l.timers.len()
        })
    }

    /// Run a single task.
    ///
    /// Ready tasks run first. When there are none, the clock advances to the
    /// earliest timer and its task runs instead. Returns `false` when there
    /// was nothing left to run.
    pub fn turn() -> bool {
        let task = LOOP.with(|l| l.borrow_mut().next_task());

        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run the event loop for this thread.
    ///
    /// Blocks until every task queued on *this* thread, including those queued
    /// by tasks while running, has run.
    pub fn run() {
        while Self::turn() {}
    }

    /// Drive the loop until `future` settles and return its outcome.
    ///
    /// If the loop drains while the future is still pending, it can never
    /// settle on this thread and [Error::Stalled] is returned.
    pub fn block_on<T, E>(future: &Future<T, E>) -> Result<Result<T, E>, Error>
    where
        T: Clone + 'static,
        E: Clone + 'static,
    {
        while future.is_pending() && Self::turn() {}

        future.outcome().ok_or_else(|| {
            debug!("event loop drained before the awaited future settled");
            Error::Stalled
        })
    }

    fn next_task(&mut self) -> Option<Task> {
        if let Some(task) = self.run_q.pop_front() {
            return Some(task);
        }

        let Reverse(deadline) = self.deadlines.pop()?;

        debug!("timer {} fired at {:?}", deadline.key, deadline.at);
        self.now = deadline.at;

        Some(self.timers.remove(deadline.key))
    }
}
