/*!
 * Mock transport implementations for testing.
 *
 * This module provides a mock transport that simulates different endpoint behaviors:
 * - `MockTransport::working()` - Always succeeds with tagged translations
 * - `MockTransport::fail_first(n)` - Returns HTTP 500 for the first `n` calls
 * - `MockTransport::failing()` - Always fails with HTTP 500
 *
 * Every transport records the batches it receives and the highest number of
 * calls it saw in flight at once.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::TranslationTransport;

/// Behavior mode for the mock transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails with status 500 for the first `failures` calls, then succeeds
    FailFirst { failures: usize },
    /// Fails with status 503 on every Nth call
    Intermittent { fail_every: usize },
    /// Always fails with status 500
    Failing,
    /// Always fails below HTTP (connection refused)
    Unreachable,
    /// Succeeds but drops the last translation of every batch
    ShortResponse,
}

/// Mock transport for testing dispatch and retry behavior
#[derive(Debug)]
pub struct MockTransport {
    /// Behavior mode
    behavior: MockBehavior,
    /// Fixed latency added to every call
    delay: Duration,
    /// Upper bound of an additional random latency
    random_delay: Duration,
    /// Total number of calls received
    request_count: Arc<AtomicUsize>,
    /// Calls currently in progress
    in_flight: Arc<AtomicUsize>,
    /// Highest value `in_flight` reached
    max_in_flight: Arc<AtomicUsize>,
    /// Texts of every call, in arrival order
    requests: Arc<Mutex<Vec<Vec<String>>>>,
}

/// Decrements the in-flight counter when a call ends, however it ends
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockTransport {
    /// Create a new mock transport with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            random_delay: Duration::ZERO,
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock transport that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock transport that fails its first `failures` calls
    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    /// Create an intermittently failing mock transport
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock transport that always returns status 500
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock transport whose endpoint cannot be reached
    pub fn unreachable() -> Self {
        Self::new(MockBehavior::Unreachable)
    }

    /// Create a mock transport that answers with one translation too few
    pub fn short_response() -> Self {
        Self::new(MockBehavior::ShortResponse)
    }

    /// Add a fixed latency to every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Add a random latency in `[0, max)` to every call
    pub fn with_random_delay(mut self, max: Duration) -> Self {
        self.random_delay = max;
        self
    }

    /// The translation this mock produces for `text`
    pub fn translated(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Texts of every call received, in arrival order
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().clone()
    }

    async fn simulate_latency(&self) {
        let mut latency = self.delay;
        if !self.random_delay.is_zero() {
            let max_ms = self.random_delay.as_millis().max(1) as u64;
            latency += Duration::from_millis(rand::rng().random_range(0..max_ms));
        }
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn translate_all(texts: &[String], target_language: &str) -> Vec<String> {
        texts
            .iter()
            .map(|text| Self::translated(text, target_language))
            .collect()
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            delay: self.delay,
            random_delay: self.random_delay,
            request_count: Arc::clone(&self.request_count),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl TranslationTransport for MockTransport {
    async fn translate(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(texts.to_vec());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        self.simulate_latency().await;

        match self.behavior {
            MockBehavior::Working => Ok(Self::translate_all(texts, target_language)),

            MockBehavior::FailFirst { failures } => {
                if count < failures {
                    Err(ProviderError::ApiError {
                        status_code: 500,
                        message: format!("Simulated failure (request #{})", count + 1),
                    })
                } else {
                    Ok(Self::translate_all(texts, target_language))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(Self::translate_all(texts, target_language))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Unreachable => Err(ProviderError::ConnectionError(
                "Simulated connection refused".to_string(),
            )),

            MockBehavior::ShortResponse => {
                let mut translated = Self::translate_all(texts, target_language);
                translated.pop();
                Ok(translated)
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
