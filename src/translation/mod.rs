/*!
 * Batch translation engine.
 *
 * This module contains the pipeline that turns a column of texts into a
 * column of translations. It is split into several submodules:
 *
 * - `batch`: Partitioning texts into character-bounded batches
 * - `dispatcher`: Concurrency-bounded dispatch of batches
 * - `retry`: Retrying transport client with backoff and passthrough fallback
 * - `reassemble`: Flattening batch results back into input order
 * - `core`: The `TranslationService` tying the stages together
 */

// Re-export main types for easier usage
pub use self::batch::{Batch, partition};
pub use self::core::{TranslationOptions, TranslationReport, TranslationService};
pub use self::dispatcher::BatchDispatcher;
pub use self::reassemble::flatten;
pub use self::retry::{BatchResult, BatchStatus, RetryPolicy, RetryingClient};

// Submodules
pub mod batch;
pub mod core;
pub mod dispatcher;
pub mod reassemble;
pub mod retry;
