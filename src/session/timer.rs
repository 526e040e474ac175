//! Timers and the first-to-finish combinator used by callback handling.
//!
//! Cancellation is by drop: [`race`] returns as soon as one side completes and
//! the other future is dropped with it, so no interval or timeout handle can
//! outlive the race.

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::future::{Either, LocalBoxFuture};

pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// `setTimeout`-backed timer. Resolves immediately outside a browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        #[cfg(feature = "csr")]
        {
            Box::pin(gloo_timers::future::sleep(duration))
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = duration;
            Box::pin(futures::future::ready(()))
        }
    }
}

/// Which side of a [`race`] finished first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Race<A, B> {
    First(A),
    Second(B),
}

/// Run both futures until one completes; the other is dropped. Ties go to `first`.
pub async fn race<A, B>(first: impl Future<Output = A>, second: impl Future<Output = B>) -> Race<A, B> {
    let first = pin!(first);
    let second = pin!(second);
    match futures::future::select(first, second).await {
        Either::Left((a, _)) => Race::First(a),
        Either::Right((b, _)) => Race::Second(b),
    }
}

/// `Some(output)` if `work` finishes before `limit` elapses on `timer`.
pub async fn with_timeout<T>(timer: &dyn Timer, limit: Duration, work: impl Future<Output = T>) -> Option<T> {
    match race(work, timer.sleep(limit)).await {
        Race::First(output) => Some(output),
        Race::Second(()) => None,
    }
}
