//! Combining many futures into one.
//!
//! Neither combinator settles when given no futures at all; the result stays
//! pending forever.
use std::{cell::RefCell, mem, rc::Rc};

use log::debug;

use super::Future;

/// Results gathered so far by [Future::all].
struct Tally<T> {
    results: Vec<Option<T>>,
    remaining: usize,
}

impl<T: Clone + 'static, E: Clone + 'static> Future<T, E> {
    /// Settle the same way as whichever input settles first, fulfilled or
    /// rejected. Later settlements are ignored.
    ///
    /// ```
    /// use eventual::future::Future;
    /// use eventual::task::EventLoop;
    /// use eventual::timer::Timer;
    /// use std::time::Duration;
    ///
    /// let f = Future::race([
    ///     Timer::delay(Duration::from_millis(10), "slow"),
    ///     Timer::reject_after(Duration::from_millis(1), "fast-err"),
    /// ]);
    /// assert_eq!(EventLoop::block_on(&f), Ok(Err("fast-err")));
    /// ```
    pub fn race<I>(futures: I) -> Future<T, E>
    where
        I: IntoIterator<Item = Future<T, E>>,
    {
        Future::new(|resolve, reject| {
            let mut count = 0;

            for future in futures {
                let resolve = resolve.clone();
                let reject = reject.clone();

                future.subscribe(
                    move |value| resolve.resolve(value),
                    move |reason| reject.reject(reason),
                );
                count += 1;
            }

            if count == 0 {
                debug!("race over no futures will never settle");
            }

            Ok(())
        })
    }

    /// Fulfill with every input's value, in input order, once all of them are
    /// fulfilled. The first rejection rejects the result and the remaining
    /// inputs are then ignored.
    ///
    /// ```
    /// use eventual::future::Future;
    /// use eventual::task::EventLoop;
    /// use eventual::timer::Timer;
    /// use std::time::Duration;
    ///
    /// let f = Future::<_, ()>::all([
    ///     Timer::delay(Duration::from_millis(3), "c"),
    ///     Timer::delay(Duration::from_millis(1), "a"),
    ///     Timer::delay(Duration::from_millis(2), "b"),
    /// ]);
    /// assert_eq!(EventLoop::block_on(&f), Ok(Ok(vec!["c", "a", "b"])));
    /// ```
    pub fn all<I>(futures: I) -> Future<Vec<T>, E>
    where
        I: IntoIterator<Item = Future<T, E>>,
    {
        let futures: Vec<_> = futures.into_iter().collect();

        Future::new(|resolve, reject| {
            if futures.is_empty() {
                debug!("all over no futures will never settle");
                return Ok(());
            }

            let tally = Rc::new(RefCell::new(Tally {
                results: futures.iter().map(|_| None).collect(),
                remaining: futures.len(),
            }));

            for (index, future) in futures.iter().enumerate() {
                let tally = tally.clone();
                let resolve = resolve.clone();
                let reject = reject.clone();

                future.subscribe(
                    move |value| {
                        let finished = {
                            let mut tally = tally.borrow_mut();
                            tally.results[index] = Some(value);
                            tally.remaining -= 1;

                            if tally.remaining == 0 {
                                Some(mem::take(&mut tally.results))
                            } else {
                                None
                            }
                        };

                        if let Some(results) = finished {
                            resolve.resolve(results.into_iter().flatten().collect());
                        }
                    },
                    move |reason| reject.reject(reason),
                );
            }

            Ok(())
        })
    }
}
