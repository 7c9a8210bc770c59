//! Pure checks for target URLs and custom aliases.
//!
//! Both validators are side-effect free and never touch a backend, so the
//! service can run them at any point of the create flow.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::AppError;

/// Minimum length of a custom alias, inclusive.
pub const ALIAS_MIN_LEN: usize = 3;

/// Maximum length of a custom alias, inclusive.
pub const ALIAS_MAX_LEN: usize = 20;

static ALIAS_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("alias pattern is a valid regex")
});

/// Validates a redirect target.
///
/// # Rules
///
/// - Must not be empty or whitespace only
/// - Must parse as an absolute URL
/// - Scheme must be `http` or `https`
/// - Host must be present and non-empty
///
/// # Errors
///
/// Returns [`AppError::InvalidTarget`] with the failing rule as the reason.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_target("https://example.com/path").is_ok());
/// assert!(validate_target("ftp://x.com").is_err());
/// assert!(validate_target("http:///").is_err());
/// ```
pub fn validate_target(target: &str) -> Result<(), AppError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_target("URL cannot be empty"));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| AppError::invalid_target(format!("URL could not be parsed: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AppError::invalid_target(format!(
                "unsupported scheme '{other}', only http and https are allowed"
            )));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::invalid_target("URL must have a host"));
    }

    Ok(())
}

/// Validates a caller-chosen alias.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: ASCII letters, digits, underscore, hyphen
///
/// # Errors
///
/// Returns [`AppError::InvalidAlias`] if any rule is violated.
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    let len = alias.chars().count();
    if !(ALIAS_MIN_LEN..=ALIAS_MAX_LEN).contains(&len) {
        return Err(AppError::invalid_alias(format!(
            "alias must be {ALIAS_MIN_LEN}-{ALIAS_MAX_LEN} characters, got {len}"
        )));
    }

    if !ALIAS_CHARSET.is_match(alias) {
        return Err(AppError::invalid_alias(
            "alias may only contain letters, digits, '_' and '-'",
        ));
    }

    Ok(())
}
