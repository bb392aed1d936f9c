use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for target language codes
///
/// Translation endpoints take an ISO 639 language, optionally followed by a
/// script or region subtag ("zh-Hant", "pt-BR"). This module validates such
/// codes and puts them into the canonical casing the endpoint expects.

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Resolve the primary subtag of a language code
fn primary_language(subtag: &str) -> Option<Language> {
    match subtag.len() {
        2 => Language::from_639_1(subtag),
        3 => {
            let part2t = bibliographic_to_terminology(subtag).unwrap_or(subtag);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Canonical casing for a secondary subtag, or None if it is not a script or region
fn normalize_subtag(subtag: &str) -> Option<String> {
    let is_alpha = subtag.chars().all(|c| c.is_ascii_alphabetic());
    let is_digit = subtag.chars().all(|c| c.is_ascii_digit());

    match subtag.len() {
        // Region, e.g. "BR"
        2 if is_alpha => Some(subtag.to_ascii_uppercase()),
        // UN M.49 region, e.g. "419"
        3 if is_digit => Some(subtag.to_string()),
        // Script, e.g. "Hant"
        4 if is_alpha => {
            let lower = subtag.to_ascii_lowercase();
            let mut chars = lower.chars();
            chars
                .next()
                .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        }
        _ => None,
    }
}

/// Validate a target language code and return it in canonical form
///
/// Two-letter codes are kept as-is; three-letter codes are shortened to
/// ISO 639-1 when one exists.
pub fn validate_target_language(code: &str) -> Result<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Target language cannot be empty"));
    }

    let mut subtags = trimmed.split(['-', '_']);
    let primary = subtags.next().unwrap_or_default().to_ascii_lowercase();

    let language = primary_language(&primary)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    let mut normalized = language
        .to_639_1()
        .map(str::to_string)
        .unwrap_or_else(|| language.to_639_3().to_string());

    for subtag in subtags {
        let subtag = normalize_subtag(subtag)
            .ok_or_else(|| anyhow!("Invalid subtag '{}' in language code: {}", subtag, code))?;
        normalized.push('-');
        normalized.push_str(&subtag);
    }

    Ok(normalized)
}

/// Get the English language name for a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = validate_target_language(code)?;
    let primary = normalized.split('-').next().unwrap_or_default();
    let lang = primary_language(primary)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}
