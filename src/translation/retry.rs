/*!
 * Retrying transport client.
 *
 * Sends one batch through a `TranslationTransport`, retrying failed attempts
 * with exponential backoff plus uniform jitter. A batch always resolves: when
 * every attempt fails, its original texts are handed back unchanged.
 */

use log::{debug, error, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::providers::TranslationTransport;

use super::batch::Batch;

/// Retry limits and backoff shape
///
/// The wait after failed attempt `n` (0-based) is
/// `backoff_base * 2^n + jitter * U(0, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per batch
    pub max_retries: u32,
    /// Wait after the first failure, doubled after each further failure
    pub backoff_base: Duration,
    /// Upper bound of the random jitter added to each wait
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            jitter: Duration::from_secs(1),
        }
    }
}

impl From<&TranslationConfig> for RetryPolicy {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(config.retry_backoff_ms),
            jitter: Duration::from_millis(config.retry_jitter_ms),
        }
    }
}

impl RetryPolicy {
    /// Policy with no waiting between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_base: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Number of attempts actually made; at least one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Deterministic part of the wait after failed attempt `attempt`
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    /// Full wait after failed attempt `attempt`, jitter included
    pub fn backoff(&self, attempt: u32) -> Duration {
        let unit: f64 = rand::rng().random();
        self.base_delay(attempt)
            .saturating_add(self.jitter.mul_f64(unit))
    }
}

/// How a batch resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// The endpoint translated the batch
    Translated,
    /// Every attempt failed; the original texts were kept
    PassedThrough,
}

impl BatchStatus {
    /// Label written into status columns
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Translated => "translated",
            Self::PassedThrough => "passed_through",
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of one batch, positionally aligned with its source batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// Creation index of the source batch
    pub batch_index: usize,
    /// `texts[i]` is the result for `batch.texts()[i]`
    pub texts: Vec<String>,
    /// How the batch resolved
    pub status: BatchStatus,
    /// Attempts made
    pub attempts: u32,
}

impl BatchResult {
    /// Number of texts in the result
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether the result holds no texts
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Result of a single attempt
#[derive(Debug)]
enum AttemptOutcome {
    Success(Vec<String>),
    Retryable(ProviderError),
}

/// Attempt bookkeeping for one batch, dropped once the batch resolves
#[derive(Debug, Default)]
pub struct RetryState {
    /// Attempts made so far
    pub attempt: u32,
    /// Total time spent waiting between attempts
    pub total_backoff: Duration,
}

/// Transport client that retries and never fails outward
#[derive(Debug, Clone)]
pub struct RetryingClient {
    transport: Arc<dyn TranslationTransport>,
    target_language: String,
    policy: RetryPolicy,
}

impl RetryingClient {
    /// Create a new retrying client
    pub fn new(
        transport: Arc<dyn TranslationTransport>,
        target_language: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            target_language: target_language.into(),
            policy,
        }
    }

    /// The retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Translate one batch
    ///
    /// Attempts run strictly one after another. The returned result always has
    /// as many texts as the batch.
    pub async fn send(&self, batch: Batch) -> BatchResult {
        let batch_index = batch.index();
        let max_attempts = self.policy.max_attempts();
        let mut state = RetryState::default();

        if batch.is_empty() {
            return BatchResult {
                batch_index,
                texts: Vec::new(),
                status: BatchStatus::Translated,
                attempts: 0,
            };
        }

        loop {
            let outcome = self.attempt(batch.texts()).await;
            state.attempt += 1;

            match outcome {
                AttemptOutcome::Success(texts) => {
                    debug!(
                        "Batch {} translated on attempt {}/{} ({} texts)",
                        batch_index + 1,
                        state.attempt,
                        max_attempts,
                        texts.len()
                    );
                    return BatchResult {
                        batch_index,
                        texts,
                        status: BatchStatus::Translated,
                        attempts: state.attempt,
                    };
                }
                AttemptOutcome::Retryable(e) => {
                    let family = if e.is_transport_fault() { "transport" } else { "provider" };
                    warn!(
                        "Batch {} attempt {}/{} failed ({} fault): {}",
                        batch_index + 1,
                        state.attempt,
                        max_attempts,
                        family,
                        e
                    );

                    if state.attempt >= max_attempts {
                        break;
                    }

                    let wait = self.policy.backoff(state.attempt - 1);
                    info!(
                        "Retrying batch {} in {:.2} seconds...",
                        batch_index + 1,
                        wait.as_secs_f64()
                    );
                    tokio::time::sleep(wait).await;
                    state.total_backoff += wait;
                }
            }
        }

        error!(
            "Max retries reached for batch {} after {} attempts ({:.2}s of backoff). Returning original texts.",
            batch_index + 1,
            state.attempt,
            state.total_backoff.as_secs_f64()
        );

        BatchResult {
            batch_index,
            texts: batch.into_texts(),
            status: BatchStatus::PassedThrough,
            attempts: state.attempt,
        }
    }

    async fn attempt(&self, texts: &[String]) -> AttemptOutcome {
        match self.transport.translate(texts, &self.target_language).await {
            Ok(translated) if translated.len() == texts.len() => AttemptOutcome::Success(translated),
            Ok(translated) => AttemptOutcome::Retryable(ProviderError::ResponseMismatch {
                expected: texts.len(),
                actual: translated.len(),
            }),
            Err(e) => AttemptOutcome::Retryable(e),
        }
    }
}
