//! # `eventual`: deferred values on a single thread
//!
//! This project implements a minimalistic deferred-value primitive, a
//! [Future](future::Future) that holds a result which is not known yet. A
//! future settles exactly once, can be observed by chaining continuations onto
//! it, and can be combined with others through [race](future::Future::race)
//! and [all](future::Future::all).
//!
//! Everything runs on one thread. Settlement is never observed synchronously:
//! it is queued on a [Scheduler](scheduler::Scheduler), by default the
//! thread's [EventLoop](task::EventLoop), and waiters run when the loop gets to
//! it.
//!
//! For information about driving the loop, refer to the [task] module. To see
//! how futures are built and chained, see the [future] module.
//!
//! ## Example
//!
//! This is a simple example of printing out `Hello, world!` based on timers:
//!
//! ```
//! use eventual::future::Future;
//! use eventual::task::EventLoop;
//! use eventual::timer::Timer;
//! use std::time::Duration;
//!
//! let hello = Timer::delay(Duration::from_secs(1), "Hello, ");
//! let world = Timer::delay(Duration::from_secs(2), "world!");
//! let greeting = Future::<_, ()>::all([world, hello]).map(|parts| parts[1].to_owned() + parts[0]);
//!
//! assert_eq!(EventLoop::block_on(&greeting), Ok(Ok("Hello, world!".to_string())));
//! ```
pub mod error;
pub mod future;
pub mod scheduler;
pub mod task;
pub mod timer;

pub use error::Error;
