use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Identity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::providers::TranslationTransport;

/// Longest body excerpt carried into error messages
const MAX_ERROR_BODY_CHARS: usize = 500;

/// HTTPS client for a Google-style translation endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    /// Pooled HTTP client, shared by every in-flight batch
    client: Client,
    /// Full URL the batches are posted to
    endpoint: String,
}

/// Client certificate and private key used for mutual TLS
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    /// PEM certificate (chain)
    pub cert_path: PathBuf,
    /// PKCS#8 PEM private key
    pub key_path: PathBuf,
}

/// Translate request body
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    /// Texts to translate
    q: &'a [String],
    /// Target language code
    target: &'a str,
}

/// Translate response body
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    /// Response payload
    pub data: TranslationData,
}

/// Payload of a translate response
#[derive(Debug, Deserialize)]
pub struct TranslationData {
    /// One entry per request text, in request order
    pub translations: Vec<Translation>,
}

/// Single translated text
#[derive(Debug, Deserialize)]
pub struct Translation {
    /// The translated text
    #[serde(rename = "translatedText")]
    pub translated_text: String,
    /// Source language reported by the endpoint, when it detected one
    #[serde(rename = "detectedSourceLanguage", default)]
    pub detected_source_language: Option<String>,
}

impl<'a> TranslateRequest<'a> {
    /// Create a new translate request
    pub fn new(texts: &'a [String], target_language: &'a str) -> Self {
        Self {
            q: texts,
            target: target_language,
        }
    }
}

impl ClientIdentity {
    /// Create an identity from a certificate and key path
    pub fn new(cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        }
    }

    /// Read both PEM files and build the reqwest identity
    pub fn load(&self) -> Result<Identity, ProviderError> {
        let cert = read_pem(&self.cert_path)?;
        let key = read_pem(&self.key_path)?;

        Identity::from_pkcs8_pem(&cert, &key).map_err(|e| {
            ProviderError::AuthenticationError(format!(
                "Invalid client identity ({}, {}): {}",
                self.cert_path.display(),
                self.key_path.display(),
                e
            ))
        })
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ProviderError> {
    std::fs::read(path).map_err(|e| {
        ProviderError::AuthenticationError(format!("Failed to read {}: {}", path.display(), e))
    })
}

/// Shorten a response body for logs and error messages
fn excerpt(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let mut short: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        short.push_str("...");
        short
    } else {
        body.to_string()
    }
}

/// Parse and validate a success body against the request it answers
///
/// Anything other than exactly `expected` translations is rejected so a
/// short or long answer can never shift records out of position.
pub fn parse_response(body: &str, expected: usize) -> Result<Vec<String>, ProviderError> {
    let response: TranslateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("{} (body: {})", e, excerpt(body))))?;

    let actual = response.data.translations.len();
    if actual != expected {
        return Err(ProviderError::ResponseMismatch { expected, actual });
    }

    Ok(response
        .data
        .translations
        .into_iter()
        .map(|t| t.translated_text)
        .collect())
}

impl GoogleTranslate {
    /// Create a new client
    ///
    /// The identity, when given, is loaded once here and presented on every
    /// connection the pool opens.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        identity: Option<&ClientIdentity>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(20)
            .tcp_keepalive(Duration::from_secs(60));

        if let Some(identity) = identity {
            builder = builder.identity(identity.load()?);
        }

        let client = builder
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a client from the translation configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self, ProviderError> {
        let identity = match (&config.cert_path, &config.key_path) {
            (Some(cert), Some(key)) => Some(ClientIdentity::new(cert, key)),
            (Some(cert), None) => {
                return Err(ProviderError::AuthenticationError(format!(
                    "Client certificate {} configured without a private key",
                    cert.display()
                )));
            }
            (None, Some(key)) => {
                return Err(ProviderError::AuthenticationError(format!(
                    "Private key {} configured without a client certificate",
                    key.display()
                )));
            }
            (None, None) => {
                warn!("No client certificate configured; connecting to {} without mutual TLS", config.endpoint);
                None
            }
        };

        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
            identity.as_ref(),
        )
    }

    /// Endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TranslationTransport for GoogleTranslate {
    async fn translate(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let request = TranslateRequest::new(texts, target_language);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::from_reqwest)?;

        if !status.is_success() {
            debug!("Translation endpoint returned {}: {}", status, excerpt(&body));
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: excerpt(&body),
            });
        }

        parse_response(&body, texts.len())
    }

    fn name(&self) -> &str {
        "google"
    }
}
