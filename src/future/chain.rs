//! Continuations: `then`, `catch`, `finally` and their shorthands.
//!
//! Every operation here returns a new child [Future] and registers a single
//! waiter pair on the parent. The child settles from whatever the continuation
//! produces:
//!
//! - `Ok(Resolution::Value(v))` fulfills the child with `v`,
//! - `Ok(Resolution::Future(f))` makes the child mirror `f`,
//! - `Err(e)` rejects the child with `e`.
//!
//! That last case is how a continuation "throws": the failure never escapes
//! the chain, it becomes the child's rejection.
//!
//! ```
//! use eventual::future::{Future, Resolution};
//! use eventual::task::EventLoop;
//!
//! let f = Future::<i32, &str>::resolve(1)
//!     .try_map(|_| Err::<i32, _>("boom"))
//!     .catch(|e| Ok(Resolution::Value(e.len() as i32)));
//! assert_eq!(EventLoop::block_on(&f), Ok(Ok(4)));
//! ```
use std::{cell::Cell, rc::Rc};

use log::trace;

use super::{Future, Rejecter, Resolution, Resolver};

fn forward<U, E>(
    step: Result<Resolution<U, E>, E>,
    resolve: &Resolver<U, E>,
    reject: &Rejecter<U, E>,
) where
    U: Clone + 'static,
    E: Clone + 'static,
{
    match step {
        Ok(resolution) => resolve.settle(resolution),
        Err(reason) => {
            trace!("continuation failed, rejecting derived future");
            reject.reject(reason)
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Future<T, E> {
    /// Chain a pair of continuations onto this future.
    ///
    /// Exactly one of them runs: `on_fulfilled` with the value if this future
    /// is fulfilled, `on_rejected` with the reason if it is rejected. Either
    /// way the returned future settles from the continuation's result, so a
    /// rejection handler that returns `Ok` recovers the chain.
    ///
    /// If this future has already settled the continuation still runs from a
    /// scheduled task, never during the call to `then`.
    pub fn then<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<Resolution<U, E>, E> + 'static,
        G: FnOnce(E) -> Result<Resolution<U, E>, E> + 'static,
    {
        Future::with_scheduler(self.scheduler(), |resolve, reject| {
            let on_value = {
                let resolve = resolve.clone();
                let reject = reject.clone();
                move |value: T| forward(on_fulfilled(value), &resolve, &reject)
            };
            let on_reason = move |reason: E| forward(on_rejected(reason), &resolve, &reject);

            self.subscribe(on_value, on_reason);
            Ok(())
        })
    }

    /// Transform the value. Rejections pass through untouched.
    pub fn map<U, F>(&self, f: F) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.then(move |value| Ok(Resolution::Value(f(value))), Err)
    }

    /// Transform the value with a fallible function; an `Err` rejects the
    /// returned future.
    pub fn try_map<U, F>(&self, f: F) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<U, E> + 'static,
    {
        self.then(move |value| f(value).map(Resolution::Value), Err)
    }

    /// Continue with another future built from the value.
    pub fn and_then<U, F>(&self, f: F) -> Future<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Future<U, E> + 'static,
    {
        self.then(move |value| Ok(Resolution::Future(f(value))), Err)
    }

    /// Handle a rejection. Equivalent to [then](Future::then) with a
    /// pass-through fulfillment handler.
    pub fn catch<G>(&self, on_rejected: G) -> Future<T, E>
    where
        G: FnOnce(E) -> Result<Resolution<T, E>, E> + 'static,
    {
        self.then(|value| Ok(Resolution::Value(value)), on_rejected)
    }

    /// Turn a rejection into a value.
    pub fn recover<G>(&self, f: G) -> Future<T, E>
    where
        G: FnOnce(E) -> T + 'static,
    {
        self.catch(move |reason| Ok(Resolution::Value(f(reason))))
    }

    /// Run `f` once this future settles, whatever the outcome, then settle the
    /// returned future the same way this one did.
    pub fn finally<F>(&self, f: F) -> Future<T, E>
    where
        F: FnOnce() + 'static,
    {
        let on_value = Rc::new(Cell::new(Some(f)));
        let on_reason = on_value.clone();

        self.then(
            move |value| {
                if let Some(f) = on_value.take() {
                    f();
                }
                Ok(Resolution::Value(value))
            },
            move |reason| {
                if let Some(f) = on_reason.take() {
                    f();
                }
                Err(reason)
            },
        )
    }

    /// Like [finally](Future::finally), but `f` returns a future which must
    /// settle before the original outcome is passed on. If that future is
    /// rejected, its reason rejects the returned future instead.
    pub fn finally_with<S, F>(&self, f: F) -> Future<T, E>
    where
        S: Clone + 'static,
        F: FnOnce() -> Future<S, E> + 'static,
    {
        let on_value = Rc::new(Cell::new(Some(f)));
        let on_reason = on_value.clone();

        self.then(
            move |value| match on_value.take() {
                Some(f) => Ok(Resolution::Future(f().map(move |_| value))),
                None => Ok(Resolution::Value(value)),
            },
            move |reason| match on_reason.take() {
                Some(f) => Ok(Resolution::Future(f().then(move |_| Err(reason), Err))),
                None => Err(reason),
            },
        )
    }
}
