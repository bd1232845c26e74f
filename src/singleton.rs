//! A single-flight cell that runs an asynchronous initializer at most once and shares its outcome
//! with every caller.
//!
//! [`LazySingleton`] starts in [`InitState::Uninitialized`]. The first [`LazySingleton::ensure`]
//! call moves it to [`InitState::InFlight`] and launches the initializer on a detached tokio task.
//! Callers arriving while the initializer runs subscribe to the same pending outcome instead of
//! starting their own. Once the initializer finishes, the cell becomes either
//! [`InitState::Ready`] or [`InitState::Failed`] and stays there for the rest of its life: there is
//! no retry after a failure.
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::watch;

use crate::{Error, Result, LOG_TARGET};

type InitFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;
type Initializer<T> = Box<dyn FnOnce() -> InitFuture<T> + Send>;

/// Outcome published to waiters. `None` until the initializer completes.
type Pending<T> = watch::Receiver<Option<Result<Arc<T>>>>;

/// Observable lifecycle state of a [`LazySingleton`].
///
/// Transitions are monotonic: `Uninitialized → InFlight → Ready | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitState {
    /// Nobody requested the value yet.
    Uninitialized,
    /// The initializer is running.
    InFlight,
    /// The initializer succeeded and the value is cached.
    Ready,
    /// The initializer failed. The failure is cached and returned to every caller.
    Failed,
}

enum Slot<T> {
    Uninitialized(Initializer<T>),
    InFlight(Pending<T>),
    Ready(Arc<T>),
    Failed(Error),
}

impl<T> Slot<T> {
    fn state(&self) -> InitState {
        match self {
            Slot::Uninitialized(_) => InitState::Uninitialized,
            Slot::InFlight(_) => InitState::InFlight,
            Slot::Ready(_) => InitState::Ready,
            Slot::Failed(_) => InitState::Failed,
        }
    }
}

/// A lazily initialized value whose asynchronous initializer executes at most once.
///
/// Cloning a `LazySingleton` returns a handle to the same cell, so it can be handed to every
/// consumer by the component that constructs it.
///
/// # Examples
///
/// ```
/// # async fn test() {
/// use feature_bootstrap::LazySingleton;
///
/// let answer = LazySingleton::new(|| async { Ok(42) });
///
/// assert_eq!(*answer.ensure().await.unwrap(), 42);
/// # }
/// ```
pub struct LazySingleton<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for LazySingleton<T> {
    fn clone(&self) -> Self {
        LazySingleton {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Send + Sync + 'static> LazySingleton<T> {
    /// Create a new uninitialized cell. `initializer` is not called until the first
    /// [`LazySingleton::ensure`].
    pub fn new<F, Fut>(initializer: F) -> LazySingleton<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let initializer: Initializer<T> =
            Box::new(move || -> InitFuture<T> { Box::pin(initializer()) });
        LazySingleton {
            slot: Arc::new(Mutex::new(Slot::Uninitialized(initializer))),
        }
    }

    /// Return the initialized value, running the initializer if nobody has done so yet.
    ///
    /// All callers overlapping the initialization observe the same outcome: the same `Arc` on
    /// success or a clone of the same error on failure. Once resolved, the outcome is returned
    /// without any further work.
    ///
    /// Dropping the returned future does not cancel initialization; the initializer always runs to
    /// completion on its own task.
    ///
    /// # Errors
    ///
    /// Returns the error produced by the initializer, [`Error::InitializerPanicked`] if it
    /// panicked, or [`Error::InitializationAborted`] if the runtime shut down before it finished.
    ///
    /// # Panics
    ///
    /// The first call must happen within a tokio runtime, as it spawns the initializer task.
    pub async fn ensure(&self) -> Result<Arc<T>> {
        let mut pending = {
            let mut slot = self.lock();
            let in_flight = match &*slot {
                Slot::Ready(value) => return Ok(Arc::clone(value)),
                Slot::Failed(err) => return Err(err.clone()),
                Slot::InFlight(pending) => Some(pending.clone()),
                Slot::Uninitialized(_) => None,
            };
            match in_flight {
                Some(pending) => pending,
                None => {
                    let (sender, pending) = watch::channel(None);
                    let previous =
                        std::mem::replace(&mut *slot, Slot::InFlight(pending.clone()));
                    if let Slot::Uninitialized(initializer) = previous {
                        self.spawn_initializer(initializer, sender);
                    }
                    pending
                }
            }
        };

        let published = match pending.wait_for(Option::is_some).await {
            Ok(published) => (*published).clone(),
            // Sender dropped without publishing: the initializer task was torn down.
            Err(_) => None,
        };

        published.unwrap_or(Err(Error::InitializationAborted))
    }

    /// Same as [`LazySingleton::ensure`], but collapses any failure into `None`.
    ///
    /// The failure itself has already been logged by the time this returns.
    pub async fn ensure_or_absent(&self) -> Option<Arc<T>> {
        self.ensure().await.ok()
    }

    /// Return the value if it's already initialized. Never waits and never starts initialization.
    pub fn get(&self) -> Option<Arc<T>> {
        match *self.lock() {
            Slot::Ready(ref value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Return the current lifecycle state.
    pub fn state(&self) -> InitState {
        self.lock().state()
    }

    fn spawn_initializer(
        &self,
        initializer: Initializer<T>,
        sender: watch::Sender<Option<Result<Arc<T>>>>,
    ) {
        let publisher = Publisher {
            slot: Arc::clone(&self.slot),
            sender,
            published: false,
        };
        tokio::spawn(async move {
            log::debug!(target: LOG_TARGET, "initialization started");

            // The initializer is called inside the inner task, so a panic (even before the first
            // poll) surfaces here as a JoinError.
            let outcome = match tokio::spawn(async move { initializer().await }).await {
                Ok(Ok(value)) => Ok(Arc::new(value)),
                Ok(Err(err)) => Err(err),
                Err(join_error) if join_error.is_panic() => Err(Error::InitializerPanicked),
                Err(_) => Err(Error::InitializationAborted),
            };

            publisher.publish(outcome);
        });
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot
            .lock()
            .expect("thread holding singleton lock should not panic")
    }
}

/// Moves the cell out of `InFlight` exactly once. If it's dropped unpublished (the runtime tore
/// down the initializer task), the cell fails with [`Error::InitializationAborted`].
struct Publisher<T> {
    slot: Arc<Mutex<Slot<T>>>,
    sender: watch::Sender<Option<Result<Arc<T>>>>,
    published: bool,
}

impl<T> Publisher<T> {
    fn publish(mut self, outcome: Result<Arc<T>>) {
        self.complete(outcome);
    }

    fn complete(&mut self, outcome: Result<Arc<T>>) {
        if self.published {
            return;
        }
        self.published = true;

        match &outcome {
            Ok(_) => log::debug!(target: LOG_TARGET, "initialization finished"),
            Err(err) => log::warn!(target: LOG_TARGET,
                "initialization failed, serving absent value: {:?}", err),
        }

        if let Ok(mut slot) = self.slot.lock() {
            *slot = match &outcome {
                Ok(value) => Slot::Ready(Arc::clone(value)),
                Err(err) => Slot::Failed(err.clone()),
            };
        }

        // `send_replace` succeeds even if every waiter has gone away.
        self.sender.send_replace(Some(outcome));
    }
}

impl<T> Drop for Publisher<T> {
    fn drop(&mut self) {
        self.complete(Err(Error::InitializationAborted));
    }
}

impl<T> fmt::Debug for LazySingleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.slot.try_lock() {
            Ok(slot) => Some(slot.state()),
            Err(_) => None,
        };
        f.debug_struct("LazySingleton")
            .field("state", &state)
            .finish()
    }
}
