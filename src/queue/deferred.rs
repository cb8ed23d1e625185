//! One-shot deferred results.
//!
//! The producer of an event keeps the [`DeferredSender`] and settles it when
//! the data the consumer needs is ready; the queue holds the [`Deferred`].

use crate::error::Abandoned;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::future::Future;
use tokio::sync::oneshot;

/// A pending result handed to an [`EventQueue`](super::EventQueue).
pub type Deferred<T, E> = BoxFuture<'static, Result<T, E>>;

/// The settling half of a [`deferred`] pair.
#[derive(Debug)]
pub struct DeferredSender<T, E> {
    tx: oneshot::Sender<Result<T, E>>,
}

impl<T, E> DeferredSender<T, E> {
    /// Settle the deferred result. Returns the result back if the queue
    /// side was already dropped.
    pub fn send(self, result: Result<T, E>) -> Result<(), Result<T, E>> {
        self.tx.send(result)
    }

    pub fn resolve(self, value: T) -> Result<(), Result<T, E>> {
        self.send(Ok(value))
    }

    pub fn reject(self, error: E) -> Result<(), Result<T, E>> {
        self.send(Err(error))
    }
}

/// Create a deferred result and the sender that settles it.
///
/// Dropping the sender without settling yields `Err(Abandoned.into())`.
pub fn deferred<T, E>() -> (DeferredSender<T, E>, Deferred<T, E>)
where
    T: Send + 'static,
    E: From<Abandoned> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let fut = async move {
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(E::from(Abandoned)),
        }
    };
    (DeferredSender { tx }, fut.boxed())
}

/// Box any future into a [`Deferred`].
pub fn from_future<T, E, F>(fut: F) -> Deferred<T, E>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    fut.boxed()
}
