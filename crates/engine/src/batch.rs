//! Ordered, bounded fan-out for batch operations.

use cpamm_quote_domain::{QuoteError, QuoteResult};
use futures::{StreamExt, TryStreamExt, stream};
use std::future::Future;
use std::pin::pin;
use tracing::warn;

/// How a batch treats a failing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// The first failure fails the whole batch.
    Strict,
    /// Recoverable item failures are logged and dropped.
    Lenient,
}

/// Runs per-item futures with at most `concurrency` in flight, keeping
/// results in input order.
///
/// Item futures must own their inputs so the batch future stays `Send`.
#[derive(Debug, Clone, Copy)]
pub struct BatchOrchestrator {
    concurrency: usize,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new(8)
    }
}

impl BatchOrchestrator {
    /// Creates an orchestrator. A concurrency of zero is treated as one.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs every item; the first error is returned and the items still in
    /// flight are dropped.
    pub async fn run_strict<I, T, F, Fut>(&self, items: I, f: F) -> QuoteResult<Vec<T>>
    where
        I: IntoIterator,
        I::IntoIter: Send,
        F: FnMut(I::Item) -> Fut + Send,
        Fut: Future<Output = QuoteResult<T>> + Send,
        T: Send,
    {
        stream::iter(items)
            .map(f)
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    /// Runs every item, dropping failures for which `recoverable` holds.
    /// Any other failure aborts the batch.
    pub async fn run_lenient<I, T, F, Fut, P>(
        &self,
        items: I,
        f: F,
        recoverable: P,
    ) -> QuoteResult<Vec<T>>
    where
        I: IntoIterator,
        I::IntoIter: Send,
        F: FnMut(I::Item) -> Fut + Send,
        Fut: Future<Output = QuoteResult<T>> + Send,
        T: Send,
        P: Fn(&QuoteError) -> bool + Send,
    {
        let mut results = pin!(
            stream::iter(items)
                .map(f)
                .buffered(self.concurrency)
                .enumerate()
        );
        let mut kept = Vec::new();
        let mut dropped = 0usize;

        while let Some((index, result)) = results.next().await {
            match result {
                Ok(value) => kept.push(value),
                Err(e) if recoverable(&e) => {
                    dropped += 1;
                    warn!(index, kind = %e.kind(), error = %e, "Dropping failed batch item");
                }
                Err(e) => return Err(e),
            }
        }

        if dropped > 0 {
            warn!(dropped, kept = kept.len(), "Batch completed with dropped items");
        }
        Ok(kept)
    }

    /// Dispatches on `policy`, using [`QuoteError::is_item_recoverable`] for
    /// lenient batches.
    pub async fn run<I, T, F, Fut>(
        &self,
        policy: BatchPolicy,
        items: I,
        f: F,
    ) -> QuoteResult<Vec<T>>
    where
        I: IntoIterator,
        I::IntoIter: Send,
        F: FnMut(I::Item) -> Fut + Send,
        Fut: Future<Output = QuoteResult<T>> + Send,
        T: Send,
    {
        match policy {
            BatchPolicy::Strict => self.run_strict(items, f).await,
            BatchPolicy::Lenient => {
                self.run_lenient(items, f, QuoteError::is_item_recoverable)
                    .await
            }
        }
    }
}
