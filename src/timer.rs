//! Timer related futures.
//!
//! This module uses the virtual clock of the thread's
//! [EventLoop](crate::task::EventLoop) to settle futures after a delay. The
//! main use-case is to model work that completes at some point later, and to
//! order such completions deterministically.
//!
//! # Example
//! Let's wait for 2 seconds.
//! ```
//! use eventual::task::EventLoop;
//! use eventual::timer::Timer;
//! use std::time::Duration;
//!
//! let before = EventLoop::now();
//! let f = Timer::sleep::<()>(Duration::from_secs(2));
//! EventLoop::block_on(&f).unwrap().unwrap();
//! assert_eq!(EventLoop::now() - before, Duration::from_secs(2));
//! ```
//!
//! Timer futures are always driven by the event loop, even if another
//! [Scheduler](crate::scheduler::Scheduler) is installed.
use std::time::Duration;

use crate::{future::Future, task::EventLoop};

/// Constructors for futures that settle after a delay.
pub struct Timer;

impl Timer {
    /// A future fulfilled with `()` once `d` has elapsed on the loop's clock.
    #[must_use]
    pub fn sleep<E: Clone + 'static>(d: Duration) -> Future<(), E> {
        Self::delay(d, ())
    }

    /// A future fulfilled with `value` once `d` has elapsed.
    #[must_use]
    pub fn delay<T, E>(d: Duration, value: T) -> Future<T, E>
    where
        T: Clone + 'static,
        E: Clone + 'static,
    {
        Future::new(|resolve, _| {
            EventLoop::schedule_after(d, Box::new(move || resolve.resolve(value)));
            Ok(())
        })
    }

    /// A future rejected with `reason` once `d` has elapsed.
    #[must_use]
    pub fn reject_after<T, E>(d: Duration, reason: E) -> Future<T, E>
    where
        T: Clone + 'static,
        E: Clone + 'static,
    {
        Future::new(|_, reject| {
            EventLoop::schedule_after(d, Box::new(move || reject.reject(reason)));
            Ok(())
        })
    }
}
