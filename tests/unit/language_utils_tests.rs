/*!
 * Tests for language utility functions
 */

use coltrans::language_utils::{get_language_name, validate_target_language};

/// Test ISO 639-1 codes
#[test]
fn test_validate_target_language_withIso6391_shouldKeepCode() {
    assert_eq!(validate_target_language("en").unwrap(), "en");
    assert_eq!(validate_target_language("FR").unwrap(), "fr");
    assert_eq!(validate_target_language(" ja ").unwrap(), "ja");
}

/// Test ISO 639-3 and bibliographic codes
#[test]
fn test_validate_target_language_withThreeLetterCodes_shouldShorten() {
    assert_eq!(validate_target_language("spa").unwrap(), "es");
    assert_eq!(validate_target_language("deu").unwrap(), "de");
    assert_eq!(validate_target_language("ger").unwrap(), "de");
    assert_eq!(validate_target_language("fre").unwrap(), "fr");
}

/// Test script and region subtags
#[test]
fn test_validate_target_language_withSubtags_shouldNormalizeCase() {
    assert_eq!(validate_target_language("zh-tw").unwrap(), "zh-TW");
    assert_eq!(validate_target_language("pt_br").unwrap(), "pt-BR");
    assert_eq!(validate_target_language("zh-HANS").unwrap(), "zh-Hans");
    assert_eq!(validate_target_language("es-419").unwrap(), "es-419");
}

/// Test rejected codes
#[test]
fn test_validate_target_language_withInvalidCodes_shouldFail() {
    assert!(validate_target_language("").is_err());
    assert!(validate_target_language("   ").is_err());
    assert!(validate_target_language("zz").is_err());
    assert!(validate_target_language("english").is_err());
    assert!(validate_target_language("en-!!").is_err());
}

/// Test language names
#[test]
fn test_get_language_name_withValidCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("de-AT").unwrap(), "German");
    assert!(get_language_name("zz").is_err());
}
