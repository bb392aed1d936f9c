/*!
 * # coltrans - column translation over mutual TLS
 *
 * A Rust library for translating a column of text records through a remote
 * translation endpoint.
 *
 * ## Features
 *
 * - Partition texts into character-bounded batches
 * - Bounded number of concurrent batch requests
 * - Retry with exponential backoff and jitter
 * - Untranslated passthrough when a batch exhausts its retries
 * - Output always index-aligned with the input records
 * - Client certificate authentication (mutual TLS)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `table`: JSON / JSON Lines record tables
 * - `translation`: The batching, dispatch and retry engine:
 *   - `translation::batch`: Batch partitioning
 *   - `translation::dispatcher`: Concurrency-bounded dispatch
 *   - `translation::retry`: Retrying client with passthrough fallback
 *   - `translation::reassemble`: Restoring input order
 *   - `translation::core`: The translation service
 * - `app_controller`: Main application controller
 * - `language_utils`: Target language code validation
 * - `providers`: Transports for the translation endpoint:
 *   - `providers::google`: HTTPS client with mTLS identity
 *   - `providers::mock`: Scripted transport for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod table;
pub mod translation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use table::RecordTable;
pub use translation::{TranslationOptions, TranslationReport, TranslationService};
pub use language_utils::validate_target_language;
pub use errors::{AppError, ProviderError, TableError, TranslationError};
