/*!
 * Rate-limited batch dispatch.
 *
 * Every batch is spawned as its own task right away; a shared semaphore lets
 * at most `max_concurrent` of them run their send at the same time. Results
 * are collected in batch creation order, whatever order they finish in.
 */

use futures::future::join_all;
use log::debug;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::errors::TranslationError;

use super::batch::Batch;
use super::retry::BatchResult;

/// Dispatcher that bounds the number of in-flight batch sends
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    /// Maximum number of concurrent sends
    max_concurrent: usize,
}

impl BatchDispatcher {
    /// Create a new dispatcher
    pub fn new(max_concurrent: usize) -> Self {
        Self { max_concurrent }
    }

    /// Maximum number of concurrent sends
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run `send` over every batch and return the results in batch order
    ///
    /// `progress` is called with `(completed, total)` after each batch
    /// resolves. A task that ends without a result, or a result whose length
    /// differs from its batch, fails the whole run.
    pub async fn run_all<F, Fut, P>(
        &self,
        batches: Vec<Batch>,
        send: F,
        progress: P,
    ) -> Result<Vec<BatchResult>, TranslationError>
    where
        F: Fn(Batch) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BatchResult> + Send + 'static,
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        if self.max_concurrent == 0 {
            return Err(TranslationError::InvalidOptions(
                "max_concurrent must be positive".to_string(),
            ));
        }

        let total = batches.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent.min(Semaphore::MAX_PERMITS)));
        let send = Arc::new(send);
        let progress = Arc::new(progress);
        let completed = Arc::new(AtomicUsize::new(0));
        let expected_lens: Vec<usize> = batches.iter().map(Batch::len).collect();

        debug!(
            "Dispatching {} batches with at most {} in flight",
            total, self.max_concurrent
        );

        let handles: Vec<_> = batches
            .into_iter()
            .map(|batch| {
                let semaphore = Arc::clone(&semaphore);
                let send = Arc::clone(&send);
                let progress = Arc::clone(&progress);
                let completed = Arc::clone(&completed);

                tokio::spawn(async move {
                    let batch_index = batch.index();
                    let permit = semaphore.acquire_owned().await.map_err(|e| {
                        TranslationError::Dispatch(format!(
                            "Permit pool closed before batch {} started: {}",
                            batch_index + 1,
                            e
                        ))
                    })?;

                    let start_time = Instant::now();
                    let result = send(batch).await;
                    drop(permit);

                    debug!(
                        "Batch {} resolved in {:?} ({:?})",
                        batch_index + 1,
                        start_time.elapsed(),
                        result.status
                    );

                    let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress(current, total);

                    Ok::<_, TranslationError>(result)
                })
            })
            .collect();

        // Awaiting the handles in spawn order restores creation order
        let joined = join_all(handles).await;

        let mut results = Vec::with_capacity(total);
        for (position, (outcome, expected_len)) in joined.into_iter().zip(expected_lens).enumerate() {
            let result = outcome.map_err(|e| {
                TranslationError::Dispatch(format!(
                    "Batch {} task ended without a result: {}",
                    position + 1,
                    e
                ))
            })??;

            if result.len() != expected_len {
                return Err(TranslationError::Dispatch(format!(
                    "Batch {} produced {} texts for {} inputs",
                    position + 1,
                    result.len(),
                    expected_len
                )));
            }

            results.push(result);
        }

        Ok(results)
    }
}
