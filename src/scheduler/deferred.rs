//! Two-stage lazily transformed results.
//!
//! A worker fulfills a [`Promise`] with a raw value. The consumer holds a
//! [`Deferred`] that captured the matching [`Pending`] plus a transform. The
//! transform runs once, on whichever thread calls [`Deferred::get`], never on
//! the worker.

use thiserror::Error;
use tokio::sync::oneshot;

/// Errors observed when demanding a deferred value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeferredError {
    /// The producer was dropped without fulfilling its promise.
    #[error("Deferred value abandoned by its producer")]
    Abandoned,
}

/// Create a connected producer/consumer pair.
pub fn channel<R>() -> (Promise<R>, Pending<R>) {
    let (tx, rx) = oneshot::channel();
    (Promise { tx }, Pending { inner: PendingInner::Waiting(rx) })
}

/// Producer half. Fulfilled exactly once, by value.
#[derive(Debug)]
pub struct Promise<R> {
    tx: oneshot::Sender<R>,
}

impl<R> Promise<R> {
    /// Deliver the value. A consumer that already went away is ignored.
    pub fn fulfill(self, value: R) {
        if self.tx.send(value).is_err() {
            tracing::trace!("deferred consumer dropped before fulfillment");
        }
    }
}

#[derive(Debug)]
enum PendingInner<R> {
    Ready(R),
    Waiting(oneshot::Receiver<R>),
}

/// The inner, untransformed value that may not exist yet.
#[derive(Debug)]
pub struct Pending<R> {
    inner: PendingInner<R>,
}

impl<R> Pending<R> {
    /// A pending value that is already known.
    pub fn ready(value: R) -> Self {
        Self { inner: PendingInner::Ready(value) }
    }

    /// Block the calling thread until the value exists.
    ///
    /// Must not be called from inside an async runtime; use [`Pending::recv`].
    pub fn wait(self) -> Result<R, DeferredError> {
        match self.inner {
            PendingInner::Ready(value) => Ok(value),
            PendingInner::Waiting(rx) => rx.blocking_recv().map_err(|_| DeferredError::Abandoned),
        }
    }

    /// Suspend until the value exists.
    pub async fn recv(self) -> Result<R, DeferredError> {
        match self.inner {
            PendingInner::Ready(value) => Ok(value),
            PendingInner::Waiting(rx) => rx.await.map_err(|_| DeferredError::Abandoned),
        }
    }
}

/// A lazily transformed, one-shot result.
///
/// Building one does no work. [`Deferred::get`] blocks for the inner value and
/// then applies the transform on the calling thread.
pub struct Deferred<T> {
    thunk: Box<dyn FnOnce() -> Result<T, DeferredError> + Send>,
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

impl<T: 'static> Deferred<T> {
    /// Wrap `pending` with a transform to apply on demand.
    pub fn new<R, F>(pending: Pending<R>, transform: F) -> Self
    where
        R: Send + 'static,
        F: FnOnce(R) -> T + Send + 'static,
    {
        Self {
            thunk: Box::new(move || pending.wait().map(transform)),
        }
    }

    /// A deferred value that is already known.
    pub fn ready(value: T) -> Self
    where
        T: Send,
    {
        Self::new(Pending::ready(value), |v| v)
    }

    /// Compose a further transform, still lazily.
    pub fn map<U, F>(self, f: F) -> Deferred<U>
    where
        U: 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let thunk = self.thunk;
        Deferred {
            thunk: Box::new(move || thunk().map(f)),
        }
    }

    /// Block until the value exists and return it transformed.
    pub fn get(self) -> Result<T, DeferredError> {
        (self.thunk)()
    }
}
