/*!
 * Core translation service implementation.
 *
 * `TranslationService` wires the pipeline together: partition the input
 * column into batches, dispatch them through the retrying client under the
 * concurrency cap, and flatten the results back into input order.
 */

use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::TranslationTransport;
use crate::providers::google::GoogleTranslate;
use crate::table::RecordTable;

use super::batch::partition;
use super::dispatcher::BatchDispatcher;
use super::reassemble::{flatten, flatten_statuses};
use super::retry::{BatchStatus, RetryPolicy, RetryingClient};

/// Settings for one translation run
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Target language code sent with every batch
    pub target_language: String,
    /// Character budget per batch
    pub max_chars_per_batch: usize,
    /// Maximum batches in flight at once
    pub max_concurrent_requests: usize,
    /// Retry and backoff policy
    pub retry: RetryPolicy,
}

impl TranslationOptions {
    /// Options with default limits for `target_language`
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            max_chars_per_batch: 5000,
            max_concurrent_requests: 5,
            retry: RetryPolicy::default(),
        }
    }

    /// Options from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, TranslationError> {
        let target_language = language_utils::validate_target_language(&config.target_language)
            .map_err(|e| TranslationError::InvalidOptions(e.to_string()))?;

        Ok(Self {
            target_language,
            max_chars_per_batch: config.translation.max_chars_per_batch,
            max_concurrent_requests: config.translation.max_concurrent_requests,
            retry: RetryPolicy::from(&config.translation),
        })
    }

    /// Set the character budget per batch
    pub fn with_max_chars(mut self, max_chars_per_batch: usize) -> Self {
        self.max_chars_per_batch = max_chars_per_batch;
        self
    }

    /// Set the concurrency cap
    pub fn with_max_concurrent(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Outcome of a translation run
#[derive(Debug, Clone)]
pub struct TranslationReport {
    /// Output texts, index-aligned with the input
    pub texts: Vec<String>,
    /// Per-record status, index-aligned with the input
    pub statuses: Vec<BatchStatus>,
    /// Number of batches sent
    pub batch_count: usize,
    /// Batches whose texts passed through untranslated
    pub passed_through_batches: usize,
    /// Attempts made across all batches
    pub total_attempts: u32,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl TranslationReport {
    /// Records the endpoint translated
    pub fn translated_count(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| **s == BatchStatus::Translated)
            .count()
    }

    /// Records kept in their original form
    pub fn passed_through_count(&self) -> usize {
        self.statuses.len() - self.translated_count()
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} records in {} batches ({} attempts) in {:.2}s: {} translated, {} passed through",
            self.texts.len(),
            self.batch_count,
            self.total_attempts,
            self.duration.as_secs_f64(),
            self.translated_count(),
            self.passed_through_count()
        )
    }
}

/// Translation service for a column of texts
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Shared transport used by every batch
    transport: Arc<dyn TranslationTransport>,
    /// Run settings
    options: TranslationOptions,
}

impl TranslationService {
    /// Create a service over any transport
    pub fn new(transport: Arc<dyn TranslationTransport>, options: TranslationOptions) -> Self {
        Self { transport, options }
    }

    /// Create a service backed by the HTTPS transport described in `config`
    pub fn from_config(config: &Config) -> Result<Self, TranslationError> {
        let options = TranslationOptions::from_config(config)?;
        let transport = GoogleTranslate::from_config(&config.translation)?;
        Ok(Self::new(Arc::new(transport), options))
    }

    /// Run settings
    pub fn options(&self) -> &TranslationOptions {
        &self.options
    }

    /// Translate texts, returning output aligned with the input
    ///
    /// Batches that exhaust their retries come back untranslated, with no
    /// marker; use `translate_with_report` to tell them apart.
    pub async fn translate_texts(&self, texts: &[String]) -> Result<Vec<String>, TranslationError> {
        let report = self.translate_with_report(texts, |_, _| {}).await?;
        Ok(report.texts)
    }

    /// Translate texts and report per-record status
    pub async fn translate_with_report<P>(
        &self,
        texts: &[String],
        progress: P,
    ) -> Result<TranslationReport, TranslationError>
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        if self.options.max_chars_per_batch == 0 {
            return Err(TranslationError::InvalidOptions(
                "max_chars_per_batch must be positive".to_string(),
            ));
        }

        let start_time = Instant::now();
        let batches = partition(texts, self.options.max_chars_per_batch);
        let batch_count = batches.len();

        info!(
            "Translating {} records in {} batches to '{}' via {}",
            texts.len(),
            batch_count,
            self.options.target_language,
            self.transport.name()
        );

        let client = RetryingClient::new(
            Arc::clone(&self.transport),
            self.options.target_language.clone(),
            self.options.retry.clone(),
        );
        let dispatcher = BatchDispatcher::new(self.options.max_concurrent_requests);

        let results = dispatcher
            .run_all(
                batches,
                move |batch| {
                    let client = client.clone();
                    async move { client.send(batch).await }
                },
                progress,
            )
            .await?;

        let statuses = flatten_statuses(&results);
        let passed_through_batches = results
            .iter()
            .filter(|r| r.status == BatchStatus::PassedThrough)
            .count();
        let total_attempts = results.iter().map(|r| r.attempts).sum();

        let output = flatten(results, texts.len())?;

        if passed_through_batches > 0 {
            warn!(
                "{} of {} batches exhausted their retries and were left untranslated",
                passed_through_batches, batch_count
            );
        }

        Ok(TranslationReport {
            texts: output,
            statuses,
            batch_count,
            passed_through_batches,
            total_attempts,
            duration: start_time.elapsed(),
        })
    }

    /// Translate one column of a record table into another
    ///
    /// The output column (and the status column, when named) is written back
    /// index-aligned with the input column.
    pub async fn translate_table<P>(
        &self,
        table: &mut RecordTable,
        input_field: &str,
        output_field: &str,
        status_field: Option<&str>,
        progress: P,
    ) -> Result<TranslationReport, TranslationError>
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        let texts = table.text_column(input_field)?;
        let report = self.translate_with_report(&texts, progress).await?;

        table.set_text_column(output_field, report.texts.clone())?;

        if let Some(status_field) = status_field {
            let statuses = report
                .statuses
                .iter()
                .map(|s| Value::String(s.as_str().to_string()))
                .collect();
            table.set_column(status_field, statuses)?;
        }

        Ok(report)
    }
}
