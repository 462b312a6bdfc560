// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-settlement promise built on a Tokio oneshot channel.
//
// `deferred()` hands out a `Resolver`/`Rejecter` pair that share one settlement
// slot. Whichever is invoked first settles the promise; later invocations are
// ignored. If both are dropped unused the promise settles with `Abandoned`.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::warn;

use imagetools_core::Response;
use imagetools_core::error::{ImageToolsError, Result};

use crate::native::dispatch;

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T>>>>>;

/// Create a pending promise together with the functions that settle it.
pub fn deferred<T>() -> (Resolver<T>, Rejecter<T>, Promise<T>) {
    let (tx, rx) = oneshot::channel();
    let slot: Slot<T> = Arc::new(Mutex::new(Some(tx)));
    (
        Resolver { slot: slot.clone() },
        Rejecter { slot },
        Promise {
            state: State::Pending(rx),
        },
    )
}

fn settle<T>(slot: &Slot<T>, outcome: Result<T>) {
    let sender = match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    match sender {
        // The receiver may already be gone (promise dropped); nothing to do.
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => warn!("promise already settled; ignoring second settlement"),
    }
}

/// Fulfils the paired promise.
pub struct Resolver<T = Response> {
    slot: Slot<T>,
}

impl<T> Resolver<T> {
    pub fn resolve(self, value: T) {
        settle(&self.slot, Ok(value));
    }
}

/// Rejects the paired promise.
pub struct Rejecter<T = Response> {
    slot: Slot<T>,
}

impl<T> Rejecter<T> {
    pub fn reject(self, error: ImageToolsError) {
        settle(&self.slot, Err(error));
    }
}

/// Outcome of one bridge call. Await it, or `blocking_wait` outside async code.
///
/// Dropping a promise does not cancel the native work behind it.
#[must_use = "a promise does nothing unless awaited"]
pub struct Promise<T = Response> {
    state: State<T>,
}

enum State<T> {
    Pending(oneshot::Receiver<Result<T>>),
    Ready(Option<Result<T>>),
}

// Nothing inside `State` is ever pinned structurally.
impl<T> Unpin for Promise<T> {}

impl<T> Promise<T> {
    /// An already-fulfilled promise.
    pub fn resolved(value: T) -> Self {
        Self {
            state: State::Ready(Some(Ok(value))),
        }
    }

    /// An already-rejected promise.
    pub fn rejected(error: ImageToolsError) -> Self {
        Self {
            state: State::Ready(Some(Err(error))),
        }
    }

    /// Whether the promise settled before being polled (precondition failures).
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Block the current thread until the promise settles.
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_wait(self) -> Result<T> {
        match self.state {
            State::Pending(rx) => rx.blocking_recv().unwrap_or(Err(ImageToolsError::Abandoned)),
            State::Ready(outcome) => outcome.unwrap_or(Err(ImageToolsError::Abandoned)),
        }
    }
}

impl<T: Send + 'static> Promise<T> {
    /// Hand the outcome to `f` once the promise settles.
    ///
    /// An already-settled promise calls `f` on the current thread before
    /// returning; a pending one calls it from a worker.
    pub fn on_settled<F>(self, f: F)
    where
        F: FnOnce(Result<T>) + Send + 'static,
    {
        if self.is_ready() {
            f(self.blocking_wait());
        } else {
            dispatch(move || f(self.blocking_wait()));
        }
    }
}

impl<T> Future for Promise<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Pending(rx) => Pin::new(rx)
                .poll(cx)
                .map(|received| received.unwrap_or(Err(ImageToolsError::Abandoned))),
            State::Ready(outcome) => {
                Poll::Ready(outcome.take().unwrap_or(Err(ImageToolsError::Abandoned)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_once() {
        let (resolve, _reject, promise) = deferred::<u32>();
        resolve.resolve(7);
        assert_eq!(promise.await.expect("resolved"), 7);
    }

    #[tokio::test]
    async fn reject_passes_error_through() {
        let (_resolve, reject, promise) = deferred::<u32>();
        reject.reject(ImageToolsError::Native("decoder exploded".into()));
        match promise.await {
            Err(ImageToolsError::Native(message)) => assert_eq!(message, "decoder exploded"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_settlement_wins() {
        let (resolve, reject, promise) = deferred::<u32>();
        reject.reject(ImageToolsError::Native("first".into()));
        resolve.resolve(1);
        assert!(matches!(promise.await, Err(ImageToolsError::Native(m)) if m == "first"));
    }

    #[tokio::test]
    async fn dropped_callbacks_abandon_the_promise() {
        let (resolve, reject, promise) = deferred::<u32>();
        drop(resolve);
        drop(reject);
        assert!(matches!(promise.await, Err(ImageToolsError::Abandoned)));
    }

    #[tokio::test]
    async fn settles_from_another_thread() {
        let (resolve, _reject, promise) = deferred::<String>();
        std::thread::spawn(move || resolve.resolve("done".to_string()));
        assert_eq!(promise.await.expect("resolved"), "done");
    }

    #[test]
    fn ready_promises_do_not_need_a_runtime() {
        let promise = Promise::<u32>::rejected(ImageToolsError::UnsupportedFormat("WEBP".into()));
        assert!(promise.is_ready());
        assert!(matches!(
            promise.blocking_wait(),
            Err(ImageToolsError::UnsupportedFormat(_))
        ));
        assert_eq!(Promise::resolved(3u8).blocking_wait().expect("resolved"), 3);
    }

    #[test]
    fn on_settled_runs_inline_for_ready_promises() {
        let (tx, rx) = std::sync::mpsc::channel();
        Promise::resolved(5u32).on_settled(move |outcome| tx.send(outcome).expect("send"));
        assert_eq!(rx.try_recv().expect("called before returning").expect("resolved"), 5);
    }

    #[test]
    fn on_settled_waits_for_pending_promises() {
        let (resolve, _reject, promise) = deferred::<u32>();
        let (tx, rx) = std::sync::mpsc::channel();
        promise.on_settled(move |outcome| tx.send(outcome).expect("send"));
        assert!(rx.try_recv().is_err());

        resolve.resolve(9);
        let outcome = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("called after settlement");
        assert_eq!(outcome.expect("resolved"), 9);
    }

    #[test]
    fn on_settled_reports_abandonment() {
        let (resolve, reject, promise) = deferred::<u32>();
        let (tx, rx) = std::sync::mpsc::channel();
        promise.on_settled(move |outcome| tx.send(outcome).expect("send"));
        drop((resolve, reject));
        let outcome = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("called after abandonment");
        assert!(matches!(outcome, Err(ImageToolsError::Abandoned)));
    }

    #[test]
    fn blocking_wait_on_pending_promise() {
        let (resolve, _reject, promise) = deferred::<u32>();
        assert!(!promise.is_ready());
        std::thread::spawn(move || resolve.resolve(11));
        assert_eq!(promise.blocking_wait().expect("resolved"), 11);
    }
}
