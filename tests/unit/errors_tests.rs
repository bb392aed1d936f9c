/*!
 * Tests for error types
 */

use coltrans::errors::{AppError, ProviderError, TableError, TranslationError};

/// Test provider error messages
#[test]
fn test_provider_error_display_withApiError_shouldIncludeStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "Service Unavailable".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "API responded with error: 503 - Service Unavailable"
    );

    let mismatch = ProviderError::ResponseMismatch { expected: 3, actual: 2 };
    assert_eq!(mismatch.to_string(), "Response carried 2 translations for 3 texts");
}

/// Test the transport/provider split used in retry logs
#[test]
fn test_provider_error_isTransportFault_shouldSeparateFamilies() {
    assert!(ProviderError::ConnectionError("refused".to_string()).is_transport_fault());
    assert!(ProviderError::Timeout("30s".to_string()).is_transport_fault());
    assert!(ProviderError::RequestFailed("reset".to_string()).is_transport_fault());

    assert!(!ProviderError::ApiError { status_code: 500, message: String::new() }.is_transport_fault());
    assert!(!ProviderError::ParseError("eof".to_string()).is_transport_fault());
    assert!(!ProviderError::AuthenticationError("bad key".to_string()).is_transport_fault());
}

/// Test conversions into the translation error
#[test]
fn test_translation_error_from_withNestedErrors_shouldWrap() {
    let error: TranslationError = ProviderError::AuthenticationError("no key".to_string()).into();
    assert!(matches!(error, TranslationError::Provider(_)));
    assert!(error.to_string().contains("no key"));

    let error: TranslationError = TableError::MissingField { row: 4, field: "text".to_string() }.into();
    assert!(matches!(error, TranslationError::Table(_)));
    assert_eq!(error.to_string(), "Table error: Row 4 has no field 'text'");
}

/// Test conversions into the app error
#[test]
fn test_app_error_from_withVariousSources_shouldPickVariant() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let any = anyhow::anyhow!("something odd");
    assert!(matches!(AppError::from(any), AppError::Unknown(_)));

    let translation = TranslationError::LengthMismatch { expected: 4, actual: 3 };
    let app: AppError = translation.into();
    assert_eq!(
        app.to_string(),
        "Translation error: Expected 4 translated records, got 3"
    );
}
