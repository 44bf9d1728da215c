//! Errors raised by the crate itself.
//!
//! Rejections of a [Future](crate::future::Future) carry whatever payload the
//! producer chose and never show up here. This type only covers failures of
//! the machinery driving futures.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The event loop ran out of work while the awaited future was still
    /// pending, so it can never settle on this thread.
    #[error("event loop drained with the future still pending")]
    Stalled,
}
