/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use coltrans::app_config::Config;
use coltrans::app_controller::Controller;
use coltrans::providers::mock::MockTransport;
use coltrans::table::RecordTable;
use coltrans::translation::{RetryPolicy, TranslationOptions, TranslationService};
use std::path::Path;
use std::sync::Arc;
use crate::common;
use crate::common::http_server::{Reply, TestServer};

/// Config pointing at a loopback endpoint with no backoff
fn loopback_config(server: &TestServer) -> Config {
    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.translation.endpoint = server.url();
    config.translation.retry_backoff_ms = 0;
    config.translation.retry_jitter_ms = 0;
    config
}

/// Test the controller with custom configuration
#[test]
fn test_controller_withCustomConfig_shouldInitialize() -> Result<()> {
    let mut config = Config::default();
    config.target_language = "de".to_string();

    let controller = Controller::with_config(config)?;
    assert_eq!(controller.config().target_language, "de");
    Ok(())
}

/// Test that invalid configuration is rejected up front
#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.target_language = "zz".to_string();
    assert!(Controller::with_config(config).is_err());

    let mut config = Config::default();
    config.translation.max_concurrent_requests = 0;
    assert!(Controller::with_config(config).is_err());
}

/// Test the default output naming
#[test]
fn test_default_output_path_withInputFile_shouldInsertLanguage() -> Result<()> {
    let mut config = Config::default();
    config.target_language = "fr".to_string();
    let controller = Controller::with_config(config)?;

    assert_eq!(
        controller.default_output_path(Path::new("/data/records.jsonl")),
        Path::new("/data/records.fr.jsonl")
    );
    Ok(())
}

/// Full run over HTTP: JSON in, JSON out, order preserved
#[tokio::test]
async fn test_run_withLoopbackEndpoint_shouldWriteTranslatedRecords() -> Result<()> {
    common::init_test_logger();
    let server = TestServer::start(vec![Reply::Echo]).await;
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_records(temp_dir.path(), "records.json")?;
    let output = temp_dir.path().join("records.fr.json");

    let controller = Controller::with_config(loopback_config(&server))?.without_progress();
    let report = controller.run(input, output.clone(), false).await?;

    let report = report.expect("run should not be skipped");
    assert_eq!(report.translated_count(), 4);

    let table = RecordTable::load(&output)?;
    let expected: Vec<String> = common::sample_texts()
        .iter()
        .map(|t| format!("[fr] {}", t))
        .collect();
    assert_eq!(table.text_column("translated_text")?, expected);
    assert_eq!(table.text_column("text")?, common::sample_texts());
    Ok(())
}

/// Full run where the endpoint always fails: originals land in the output column
#[tokio::test]
async fn test_run_withFailingEndpoint_shouldPassOriginalsThroughWithStatus() -> Result<()> {
    let server = TestServer::start(vec![Reply::Status(503, "unavailable".to_string())]).await;
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "records.jsonl",
        "{\"text\": \"one\"}\n{\"text\": \"two\"}\n",
    )?;
    let output = temp_dir.path().join("out.jsonl");

    let mut config = loopback_config(&server);
    config.status_field = Some("status".to_string());
    config.translation.max_retries = 2;
    let controller = Controller::with_config(config)?.without_progress();

    let report = controller.run(input, output.clone(), false).await?;
    assert_eq!(report.map(|r| r.passed_through_count()), Some(2));

    let table = RecordTable::load(&output)?;
    assert_eq!(table.text_column("translated_text")?, vec!["one", "two"]);
    assert_eq!(table.text_column("status")?, vec!["passed_through", "passed_through"]);
    assert_eq!(server.requests().len(), 2);
    Ok(())
}

/// Existing output is left alone unless forced
#[tokio::test]
async fn test_run_with_service_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_records(temp_dir.path(), "records.json")?;
    let output = common::create_test_file(temp_dir.path(), "records.es.json", "[]")?;

    let controller = Controller::with_config(Config::default())?.without_progress();
    let transport = MockTransport::working();
    let options = TranslationOptions::new("es").with_retry(RetryPolicy::immediate(3));
    let service = TranslationService::new(Arc::new(transport.clone()), options);

    let skipped = controller
        .run_with_service(&service, input.clone(), output.clone(), false)
        .await?;
    assert!(skipped.is_none());
    assert_eq!(std::fs::read_to_string(&output)?, "[]");
    assert_eq!(transport.request_count(), 0);

    let forced = controller
        .run_with_service(&service, input, output.clone(), true)
        .await?;
    assert!(forced.is_some());
    assert_eq!(RecordTable::load(&output)?.len(), 4);
    Ok(())
}

/// A missing input file is an error
#[tokio::test]
async fn test_run_with_service_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?.without_progress();
    let service = TranslationService::new(
        Arc::new(MockTransport::working()),
        TranslationOptions::new("es"),
    );

    let result = controller
        .run_with_service(
            &service,
            temp_dir.path().join("missing.json"),
            temp_dir.path().join("out.json"),
            false,
        )
        .await;
    assert!(result.is_err());
    Ok(())
}
