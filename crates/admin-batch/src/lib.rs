//! Micro-batching loader that coalesces same-window loads into one call.
//!
//! Every [`BatchLoader::load`] issued before the pending window flushes joins
//! the same batch. The flush is deferred by one scheduler turn, so all loads
//! created synchronously (or by futures polled in the same turn) share a
//! single upstream call. Each caller then projects its own slice out of the
//! shared result with the loader's extractor.
//!
//! # Example
//!
//! ```ignore
//! let loader = BatchLoader::new(|ids: Vec<u32>| async move { fetch(ids).await })
//!     .with_extractor(|rows: &Vec<Row>, id: &u32| rows.iter().filter(|r| r.id == *id).cloned().collect());
//!
//! let (a, b) = tokio::join!(loader.load(1), loader.load(2)); // one fetch([1, 2])
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tracing::debug;

/// Error delivered to every caller of a failed batch.
#[derive(Debug, Clone, Error)]
pub enum BatchError {
    /// The batch function returned an error.
    #[error("batch load failed: {0}")]
    Failed(Arc<anyhow::Error>),
}

pub type Result<T> = std::result::Result<T, BatchError>;

type BatchFn<K, R> = Arc<dyn Fn(Vec<K>) -> BoxFuture<'static, anyhow::Result<R>> + Send + Sync>;
type Extractor<K, R> = Arc<dyn Fn(&R, &K) -> R + Send + Sync>;
type Runner<R> = Shared<BoxFuture<'static, Result<Arc<R>>>>;

/// Keys waiting for the next flush and the runner that will flush them.
struct Window<K, R> {
    queue: Vec<K>,
    runner: Option<Runner<R>>,
}

impl<K, R> Default for Window<K, R> {
    fn default() -> Self {
        Self {
            queue: Vec::new(),
            runner: None,
        }
    }
}

/// Coalesces `load` calls issued in the same window into one batch call.
pub struct BatchLoader<K, R> {
    batch_fn: BatchFn<K, R>,
    extractor: Option<Extractor<K, R>>,
    window: Arc<Mutex<Window<K, R>>>,
}

impl<K, R> Clone for BatchLoader<K, R> {
    fn clone(&self) -> Self {
        Self {
            batch_fn: Arc::clone(&self.batch_fn),
            extractor: self.extractor.clone(),
            window: Arc::clone(&self.window),
        }
    }
}

impl<K, R> fmt::Debug for BatchLoader<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let window = lock(&self.window);
        f.debug_struct("BatchLoader")
            .field("pending", &window.queue.len())
            .field("in_flight", &window.runner.is_some())
            .field("has_extractor", &self.extractor.is_some())
            .finish()
    }
}

impl<K, R> BatchLoader<K, R>
where
    K: Clone + Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Creates a loader around a batch function.
    ///
    /// The batch function receives every key queued in one window, in call
    /// order and including duplicates.
    pub fn new<F, Fut>(batch_fn: F) -> Self
    where
        F: Fn(Vec<K>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        Self {
            batch_fn: Arc::new(move |keys| batch_fn(keys).boxed()),
            extractor: None,
            window: Arc::new(Mutex::new(Window::default())),
        }
    }

    /// Sets the projection applied to the shared result for each caller.
    ///
    /// Without an extractor every caller receives a clone of the whole result.
    #[must_use]
    pub fn with_extractor<E>(mut self, extractor: E) -> Self
    where
        E: Fn(&R, &K) -> R + Send + Sync + 'static,
    {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Queues `key` in the current window and returns its answer.
    ///
    /// The key is queued when this method is called, not when the returned
    /// future is first polled.
    pub fn load(&self, key: K) -> impl Future<Output = Result<R>> + Send + 'static {
        let runner = {
            let mut window = lock(&self.window);
            window.queue.push(key.clone());
            match &window.runner {
                Some(runner) => runner.clone(),
                None => {
                    let runner = self.runner();
                    window.runner = Some(runner.clone());
                    runner
                }
            }
        };
        let extractor = self.extractor.clone();

        async move {
            let result = runner.await?;
            Ok(match extractor {
                Some(extract) => extract(&result, &key),
                None => R::clone(&result),
            })
        }
    }

    /// Number of keys queued for the next flush.
    pub fn pending(&self) -> usize {
        lock(&self.window).queue.len()
    }

    fn runner(&self) -> Runner<R> {
        let window = Arc::clone(&self.window);
        let batch_fn = Arc::clone(&self.batch_fn);

        async move {
            tokio::task::yield_now().await;
            let keys = {
                let mut window = lock(&window);
                window.runner = None;
                std::mem::take(&mut window.queue)
            };
            debug!(keys = keys.len(), "flushing batch");
            batch_fn(keys)
                .await
                .map(Arc::new)
                .map_err(|err| BatchError::Failed(Arc::new(err)))
        }
        .boxed()
        .shared()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
