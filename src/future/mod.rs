//! Deferred values.
//!
//! A [Future] is a container for a result that is not known yet. It starts out
//! [State::Pending] and settles exactly once, either to [State::Fulfilled] with
//! a value or to [State::Rejected] with a reason. Later settlement attempts
//! are ignored.
//!
//! Futures are built from a setup routine that receives the two settlement
//! capabilities, a [Resolver] and a [Rejecter]:
//!
//! ```
//! use eventual::future::{Future, State};
//! use eventual::task::EventLoop;
//!
//! let f: Future<u32, String> = Future::new(|resolve, _reject| {
//!     resolve.resolve(1);
//!     resolve.resolve(2);
//!     Ok(())
//! });
//! EventLoop::run();
//! assert_eq!(f.state(), State::Fulfilled(1));
//! ```
//!
//! Settling never notifies anyone synchronously. The update is handed to the
//! future's [Scheduler] and the waiters run when that task does, in the order
//! they were registered. See the [task](crate::task) module for the default
//! per-thread event loop.
//!
//! Resolving with another future, through [Resolver::follow] or
//! [Resolution::Future], makes the outer future mirror the inner one's outcome
//! instead of settling right away:
//!
//! ```
//! use eventual::future::Future;
//! use eventual::task::EventLoop;
//!
//! let f = Future::<_, ()>::mirror(Future::mirror(Future::resolve(5)));
//! assert_eq!(EventLoop::block_on(&f), Ok(Ok(5)));
//! ```
//!
//! The [chaining](Future::then) and [combining](Future::all) operations live in
//! sub-modules but are all methods on [Future].
use std::{cell::RefCell, fmt, mem, rc::Rc};

use log::trace;

use crate::scheduler::{self, Scheduler};

mod chain;
mod combinators;

/// Where a [Future] is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> State<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, State::Pending)
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, State::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, State::Rejected(_))
    }
}

impl<T: Clone, E: Clone> State<T, E> {
    /// The settled payload, or `None` while pending.
    fn outcome(&self) -> Option<Result<T, E>> {
        match self {
            State::Pending => None,
            State::Fulfilled(value) => Some(Ok(value.clone())),
            State::Rejected(reason) => Some(Err(reason.clone())),
        }
    }
}

impl<T, E> From<Result<T, E>> for State<T, E> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(value) => State::Fulfilled(value),
            Err(reason) => State::Rejected(reason),
        }
    }
}

/// What a future is fulfilled with: either a plain value, or another future
/// whose outcome should be adopted.
pub enum Resolution<T, E> {
    Value(T),
    Future(Future<T, E>),
}

impl<T, E> From<Future<T, E>> for Resolution<T, E> {
    fn from(value: Future<T, E>) -> Self {
        Resolution::Future(value)
    }
}

type Waiter<A> = Box<dyn FnOnce(A)>;

struct Inner<T, E> {
    state: State<T, E>,
    fulfill_waiters: Vec<Waiter<T>>,
    reject_waiters: Vec<Waiter<E>>,
}

/// A value that will be known later.
///
/// This is a handle: clones refer to the same underlying state. See the
/// [module-level documentation](self) for more information.
pub struct Future<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
    scheduler: Rc<dyn Scheduler>,
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("state", &self.inner.borrow().state)
            .finish()
    }
}

/// The capability to fulfill a [Future].
pub struct Resolver<T, E> {
    future: Future<T, E>,
}

/// The capability to reject a [Future].
pub struct Rejecter<T, E> {
    future: Future<T, E>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<T, E> Clone for Rejecter<T, E> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Resolver<T, E> {
    /// Fulfill with `value`, unless the future settles first.
    pub fn resolve(&self, value: T) {
        self.settle(Resolution::Value(value))
    }

    /// Adopt the eventual outcome of `other`.
    pub fn follow(&self, other: Future<T, E>) {
        self.settle(Resolution::Future(other))
    }

    pub fn settle(&self, resolution: Resolution<T, E>) {
        match resolution {
            Resolution::Value(value) => self.future.settle(Ok(value)),
            Resolution::Future(other) => {
                let resolver = self.clone();
                let rejecter = Rejecter {
                    future: self.future.clone(),
                };

                other.subscribe(
                    move |value| resolver.resolve(value),
                    move |reason| rejecter.reject(reason),
                );
            }
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Rejecter<T, E> {
    /// Reject with `reason`, unless the future settles first. The reason is
    /// stored as-is, even if it is itself a future.
    pub fn reject(&self, reason: E) {
        self.future.settle(Err(reason))
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Future<T, E> {
    /// Create a future driven by `setup`, using this thread's installed
    /// scheduler.
    ///
    /// `setup` runs synchronously, before `new` returns, and receives the only
    /// two capabilities that can settle the future. Returning `Err` rejects the
    /// future with that reason.
    pub fn new<F>(setup: F) -> Self
    where
        F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>,
    {
        Self::with_scheduler(scheduler::current(), setup)
    }

    /// Like [Future::new], but deliver settlement through `scheduler`.
    pub fn with_scheduler<F>(scheduler: Rc<dyn Scheduler>, setup: F) -> Self
    where
        F: FnOnce(Resolver<T, E>, Rejecter<T, E>) -> Result<(), E>,
    {
        let future = Self {
            inner: Rc::new(RefCell::new(Inner {
                state: State::Pending,
                fulfill_waiters: Vec::new(),
                reject_waiters: Vec::new(),
            })),
            scheduler,
        };

        let resolver = Resolver {
            future: future.clone(),
        };
        let rejecter = Rejecter {
            future: future.clone(),
        };

        if let Err(reason) = setup(resolver, rejecter) {
            trace!("future setup failed, rejecting");
            future.settle(Err(reason));
        }

        future
    }

    /// A future fulfilled with `value`.
    pub fn resolve(value: T) -> Self {
        Self::new(|resolve, _| {
            resolve.resolve(value);
            Ok(())
        })
    }

    /// A future that mirrors `other`: fulfilled when it is fulfilled, rejected
    /// when it is rejected.
    pub fn mirror(other: Future<T, E>) -> Self {
        Self::new(|resolve, _| {
            resolve.follow(other);
            Ok(())
        })
    }

    /// A future rejected with `reason`.
    pub fn reject(reason: E) -> Self {
        Self::new(|_, reject| {
            reject.reject(reason);
            Ok(())
        })
    }

    pub fn state(&self) -> State<T, E> {
        self.inner.borrow().state.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.borrow().state.is_pending()
    }

    pub fn is_fulfilled(&self) -> bool {
        self.inner.borrow().state.is_fulfilled()
    }

    pub fn is_rejected(&self) -> bool {
        self.inner.borrow().state.is_rejected()
    }

    /// The settled outcome as a `Result`, or `None` while pending.
    pub fn outcome(&self) -> Option<Result<T, E>> {
        self.inner.borrow().state.outcome()
    }

    pub(crate) fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.scheduler.clone()
    }

    /// Register a waiter pair.
    ///
    /// Exactly one of the two callbacks runs, once, from a scheduled task. If
    /// the future has already settled, delivery is scheduled right away.
    pub(crate) fn subscribe<F, G>(&self, on_fulfilled: F, on_rejected: G)
    where
        F: FnOnce(T) + 'static,
        G: FnOnce(E) + 'static,
    {
        let mut inner = self.inner.borrow_mut();

        let Some(outcome) = inner.state.outcome() else {
            inner.fulfill_waiters.push(Box::new(on_fulfilled));
            inner.reject_waiters.push(Box::new(on_rejected));
            return;
        };

        drop(inner);

        self.scheduler.schedule(Box::new(move || match outcome {
            Ok(value) => on_fulfilled(value),
            Err(reason) => on_rejected(reason),
        }));
    }

    fn settle(&self, outcome: Result<T, E>) {
        let inner = self.inner.clone();

        self.scheduler.schedule(Box::new(move || complete(&inner, outcome)));
    }
}

fn complete<T: Clone, E: Clone>(inner: &RefCell<Inner<T, E>>, outcome: Result<T, E>) {
    let (fulfill_waiters, reject_waiters) = {
        let mut inner = inner.borrow_mut();

        if !inner.state.is_pending() {
            trace!("future already settled, dropping late settlement");
            return;
        }

        inner.state = outcome.clone().into();

        (
            mem::take(&mut inner.fulfill_waiters),
            mem::take(&mut inner.reject_waiters),
        )
    };

    match outcome {
        Ok(value) => {
            trace!("future fulfilled, waking {} waiters", fulfill_waiters.len());
            for waiter in fulfill_waiters {
                waiter(value.clone());
            }
        }
        Err(reason) => {
            trace!("future rejected, waking {} waiters", reject_waiters.len());
            for waiter in reject_waiters {
                waiter(reason.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::{Future, Resolution, State};
    use crate::{
        scheduler::{self, Immediate},
        task::EventLoop,
    };

    #[test]
    fn settles_once() {
        let f: Future<i32, &str> = Future::new(|resolve, reject| {
            resolve.resolve(1);
            resolve.resolve(2);
            reject.reject("nope");
            Ok(())
        });

        EventLoop::run();
        assert_eq!(f.state(), State::Fulfilled(1));
    }

    #[test]
    fn reject_then_resolve_keeps_rejection() {
        let f: Future<i32, &str> = Future::new(|resolve, reject| {
            reject.reject("first");
            resolve.resolve(1);
            Ok(())
        });

        EventLoop::run();
        assert_eq!(f.state(), State::Rejected("first"));
    }

    #[test]
    fn setup_error_rejects() {
        let f: Future<i32, String> = Future::new(|_, _| Err("setup blew up".to_string()));

        assert!(f.is_pending());
        EventLoop::run();
        assert_eq!(f.outcome(), Some(Err("setup blew up".to_string())));
    }

    #[test]
    fn setup_error_after_resolve_is_ignored() {
        let f: Future<i32, &str> = Future::new(|resolve, _| {
            resolve.resolve(3);
            Err("too late")
        });

        EventLoop::run();
        assert_eq!(f.state(), State::Fulfilled(3));
    }

    #[test]
    fn settlement_is_deferred() {
        let f = Future::<_, ()>::resolve(1);

        assert!(f.is_pending());
        assert_eq!(EventLoop::pending(), 1);

        EventLoop::run();
        assert!(f.is_fulfilled());
    }

    #[test]
    fn waiters_fire_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (resolver, f) = {
            let mut slot = None;
            let f: Future<i32, ()> = Future::new(|resolve, _| {
                slot = Some(resolve);
                Ok(())
            });
            (slot, f)
        };

        for tag in ["a", "b", "c"] {
            let log = log.clone();
            f.subscribe(move |v| log.borrow_mut().push((tag, v)), |_| {});
        }

        EventLoop::run();
        assert!(log.borrow().is_empty());

        if let Some(resolver) = resolver {
            resolver.resolve(9);
        }
        EventLoop::run();
        assert_eq!(*log.borrow(), vec![("a", 9), ("b", 9), ("c", 9)]);
    }

    #[test]
    fn capabilities_can_settle_later() {
        let mut captured = None;
        let f: Future<&str, &str> = Future::new(|_, reject| {
            captured = Some(reject);
            Ok(())
        });

        EventLoop::run();
        assert!(f.is_pending());

        if let Some(reject) = captured {
            reject.reject("eventually");
        }
        EventLoop::run();
        assert_eq!(f.state(), State::Rejected("eventually"));
    }

    #[test]
    fn follow_adopts_fulfillment() {
        let f = Future::<_, ()>::mirror(Future::mirror(Future::resolve(5)));

        EventLoop::run();
        assert_eq!(f.state(), State::Fulfilled(5));
    }

    #[test]
    fn follow_adopts_rejection() {
        let inner = Future::<i32, _>::reject("inner failed");
        let f: Future<i32, &str> = Future::new(|resolve, _| {
            resolve.settle(Resolution::from(inner));
            Ok(())
        });

        EventLoop::run();
        assert_eq!(f.state(), State::Rejected("inner failed"));
    }

    #[test]
    fn follow_waits_for_pending_inner() {
        let mut inner_resolver = None;
        let inner: Future<i32, ()> = Future::new(|resolve, _| {
            inner_resolver = Some(resolve);
            Ok(())
        });
        let outer = Future::mirror(inner);

        EventLoop::run();
        assert!(outer.is_pending());

        if let Some(resolve) = inner_resolver {
            resolve.resolve(42);
        }
        EventLoop::run();
        assert_eq!(outer.state(), State::Fulfilled(42));
    }

    #[test]
    fn plain_value_wins_over_slower_follow() {
        let mut inner_resolver = None;
        let inner: Future<i32, ()> = Future::new(|resolve, _| {
            inner_resolver = Some(resolve);
            Ok(())
        });
        let f: Future<i32, ()> = Future::new(|resolve, _| {
            resolve.follow(inner);
            resolve.resolve(1);
            Ok(())
        });

        EventLoop::run();
        assert_eq!(f.state(), State::Fulfilled(1));

        if let Some(resolve) = inner_resolver {
            resolve.resolve(2);
        }
        EventLoop::run();
        assert_eq!(f.state(), State::Fulfilled(1));
    }

    #[test]
    fn late_subscriber_is_still_deferred() {
        let f = Future::<_, ()>::resolve("v");
        EventLoop::run();

        let seen = Rc::new(RefCell::new(None));
        {
            let seen = seen.clone();
            f.subscribe(move |v| *seen.borrow_mut() = Some(v), |_| {});
        }
        assert_eq!(*seen.borrow(), None);

        EventLoop::run();
        assert_eq!(*seen.borrow(), Some("v"));
    }

    #[test]
    fn immediate_scheduler_settles_synchronously() {
        let previous = scheduler::install(Rc::new(Immediate));

        let f: Future<i32, ()> = Future::new(|resolve, _| {
            resolve.resolve(1);
            resolve.resolve(2);
            Ok(())
        });
        assert_eq!(f.state(), State::Fulfilled(1));
        assert_eq!(EventLoop::pending(), 0);

        scheduler::install(previous);
    }

    #[test]
    fn debug_shows_state() {
        let f = Future::<u8, ()>::reject(());
        assert_eq!(format!("{f:?}"), "Future { state: Pending }");
        EventLoop::run();
        assert_eq!(format!("{f:?}"), "Future { state: Rejected(()) }");
    }
}
