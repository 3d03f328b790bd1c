//! Request-scoped batched loading.
//!
//! A [`DataLoader`] collects every [`DataLoader::load`] issued within a short
//! batching window, hands the distinct keys to its [`BatchLoad`] in a single
//! call, and memoises the outcome for as long as the loader lives. Loaders are
//! built once per request and dropped with it, so the cache never outlives the
//! operation that filled it and nothing has to be invalidated.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

/// Default time the first load of a window waits for siblings to queue up.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1);

/// Default upper bound on keys handed to one batch call.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// A batch function: resolves many keys with a single round-trip.
#[async_trait]
pub trait BatchLoad: Send + Sync + 'static {
    type Key: Eq + Hash + Clone + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Label used when logging dispatched batches.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Resolve `keys`, returning exactly one slot per key in the same order.
    ///
    /// A key with no matching row gets `None`. An `Err` fails every key of
    /// the batch.
    async fn load_batch(
        &self,
        keys: &[Self::Key],
    ) -> Result<Vec<Option<Self::Value>>, Self::Error>;
}

/// Why a load did not produce a value.
#[derive(Debug, thiserror::Error)]
pub enum LoadError<E: std::error::Error + 'static> {
    /// The batch function failed; every key of that batch sees the same error.
    #[error(transparent)]
    Batch(Arc<E>),

    /// The batch function broke its contract.
    #[error("batch function returned {got} results for {expected} keys")]
    LengthMismatch { expected: usize, got: usize },

    /// The dispatch task went away before answering.
    #[error("batch was dropped before it resolved")]
    Cancelled,
}

impl<E: std::error::Error + 'static> Clone for LoadError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Batch(err) => Self::Batch(Arc::clone(err)),
            Self::LengthMismatch { expected, got } => Self::LengthMismatch {
                expected: *expected,
                got: *got,
            },
            Self::Cancelled => Self::Cancelled,
        }
    }
}

/// Outcome of a single key lookup.
pub type LoadResult<L> =
    Result<Option<<L as BatchLoad>::Value>, LoadError<<L as BatchLoad>::Error>>;

type SharedLoad<L> = Shared<BoxFuture<'static, LoadResult<L>>>;

type Waiter<L> = (<L as BatchLoad>::Key, oneshot::Sender<LoadResult<L>>);

/// Tuning knobs for a [`DataLoader`].
#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    /// How long a window stays open after its first key arrives.
    pub delay: Duration,
    /// Batches larger than this are split into several calls.
    pub max_batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_BATCH_DELAY,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

struct State<L: BatchLoad> {
    cache: HashMap<L::Key, SharedLoad<L>>,
    pending: Vec<Waiter<L>>,
}

struct Inner<L: BatchLoad> {
    batch: L,
    config: LoaderConfig,
    state: Mutex<State<L>>,
}

/// Deduplicating, caching front for a [`BatchLoad`].
///
/// Cloning is cheap and every clone shares one cache.
pub struct DataLoader<L: BatchLoad> {
    inner: Arc<Inner<L>>,
}

impl<L: BatchLoad> Clone for DataLoader<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: BatchLoad> DataLoader<L> {
    pub fn new(batch: L) -> Self {
        Self::with_config(batch, LoaderConfig::default())
    }

    pub fn with_config(batch: L, config: LoaderConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                batch,
                config: LoaderConfig {
                    max_batch_size: config.max_batch_size.max(1),
                    ..config
                },
                state: Mutex::new(State {
                    cache: HashMap::new(),
                    pending: Vec::new(),
                }),
            }),
        }
    }

    /// The wrapped batch function.
    pub fn batch(&self) -> &L {
        &self.inner.batch
    }

    /// Load one key.
    ///
    /// Concurrent loads of the same key share one pending result, and a key
    /// that has already resolved is answered from the cache. `Ok(None)` means
    /// no row matched.
    pub async fn load(&self, key: L::Key) -> LoadResult<L> {
        let pending = {
            let mut state = self.inner.lock();
            match state.cache.get(&key) {
                Some(existing) => existing.clone(),
                None => {
                    let (tx, rx) = oneshot::channel();
                    let shared = rx
                        .map(|received| received.unwrap_or(Err(LoadError::Cancelled)))
                        .boxed()
                        .shared();
                    state.cache.insert(key.clone(), shared.clone());
                    state.pending.push((key, tx));
                    if state.pending.len() == 1 {
                        Inner::schedule(&self.inner);
                    }
                    shared
                }
            }
        };
        pending.await
    }

    /// Load several keys, preserving their order.
    pub async fn load_many(
        &self,
        keys: impl IntoIterator<Item = L::Key>,
    ) -> Result<Vec<Option<L::Value>>, LoadError<L::Error>> {
        future::try_join_all(keys.into_iter().map(|key| self.load(key))).await
    }

    /// Seed the cache with a value obtained some other way.
    ///
    /// Never replaces an entry that is already cached or in flight.
    pub fn prime(&self, key: L::Key, value: L::Value) {
        let mut state = self.inner.lock();
        state
            .cache
            .entry(key)
            .or_insert_with(|| future::ready(Ok(Some(value))).boxed().shared());
    }

    /// Forget a cached key so the next load fetches it again.
    pub fn clear(&self, key: &L::Key) {
        self.inner.lock().cache.remove(key);
    }
}

impl<L: BatchLoad> Inner<L> {
    fn lock(&self) -> MutexGuard<'_, State<L>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a batching window that closes after the configured delay.
    fn schedule(this: &Arc<Self>) {
        let inner = Arc::clone(this);
        tokio::spawn(async move {
            tokio::time::sleep(inner.config.delay).await;
            inner.dispatch().await;
        });
    }

    async fn dispatch(&self) {
        let mut waiting = std::mem::take(&mut self.lock().pending);
        let mut batches = Vec::new();
        while !waiting.is_empty() {
            let rest = waiting.split_off(waiting.len().min(self.config.max_batch_size));
            batches.push(std::mem::replace(&mut waiting, rest));
        }
        future::join_all(batches.into_iter().map(|batch| self.run(batch))).await;
    }

    async fn run(&self, waiters: Vec<Waiter<L>>) {
        let keys: Vec<L::Key> = waiters.iter().map(|(key, _)| key.clone()).collect();
        tracing::debug!(
            loader = self.batch.name(),
            batch_size = keys.len(),
            "Dispatching load batch"
        );

        match self.batch.load_batch(&keys).await {
            Ok(values) if values.len() == keys.len() => {
                for ((_, tx), value) in waiters.into_iter().zip(values) {
                    let _ = tx.send(Ok(value));
                }
            }
            Ok(values) => {
                tracing::error!(
                    loader = self.batch.name(),
                    expected = keys.len(),
                    got = values.len(),
                    "Batch function returned the wrong number of results"
                );
                self.fail(
                    waiters,
                    LoadError::LengthMismatch {
                        expected: keys.len(),
                        got: values.len(),
                    },
                );
            }
            Err(err) => self.fail(waiters, LoadError::Batch(Arc::new(err))),
        }
    }

    /// Reject every waiter of a batch and evict its keys so a later load retries.
    fn fail(&self, waiters: Vec<Waiter<L>>, err: LoadError<L::Error>) {
        {
            let mut state = self.lock();
            for (key, _) in &waiters {
                state.cache.remove(key);
            }
        }
        for (_, tx) in waiters {
            let _ = tx.send(Err(err.clone()));
        }
    }
}
