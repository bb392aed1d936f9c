/*!
 * Transport implementations for the translation endpoint.
 *
 * - `google`: HTTPS client speaking the `{"q", "target"}` wire format with a
 *   mutual-TLS client identity
 * - `mock`: scripted in-process transport for tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for translation transports
///
/// One call is one network request for one batch. Implementations do not
/// retry; retry policy lives in `translation::retry`.
#[async_trait]
pub trait TranslationTransport: Send + Sync + Debug {
    /// Translate `texts` into `target_language`
    ///
    /// # Arguments
    /// * `texts` - The batch texts, in order
    /// * `target_language` - Target language code
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - One translation per input text,
    ///   in the same order, or the reason the attempt failed
    async fn translate(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError>;

    /// Short name used in log lines
    fn name(&self) -> &str;
}

pub mod google;
pub mod mock;
