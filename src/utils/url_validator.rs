//! Validation of user-supplied original URLs.
//!
//! URLs are stored exactly as submitted. Two submissions are the same URL only
//! if they are byte-for-byte equal, so nothing here rewrites the input.
//! Callers store the trimmed input. Interior control characters are rejected
//! because the stored text is sent back verbatim as a `Location` header.

use url::Url;

/// Reasons a submitted URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must not contain control characters")]
    ControlCharacter,
}

/// Checks that `raw` is an absolute HTTP(S) URL with a host.
///
/// # Errors
///
/// Returns [`UrlValidationError`] describing the first rule that fails.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_url("http://ya.ru").is_ok());
/// assert!(validate_url("javascript:alert(1)").is_err());
/// ```
pub fn validate_url(raw: &str) -> Result<(), UrlValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    if trimmed.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacter);
    }

    let parsed = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::InvalidFormat("missing host".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_url("http://ya.ru").is_ok());
        assert!(validate_url("https://example.com/path?q=1#frag").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_url("   "), Err(UrlValidationError::Empty));
    }

    #[test]
    fn test_rejects_relative() {
        assert!(matches!(
            validate_url("example.com/path"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_rejects_interior_control_characters() {
        for url in [
            "http://example.com/a\nb",
            "http://example.com/a\tb",
            "http://exa\rmple.com",
            "http://example.com/\u{7f}",
        ] {
            assert_eq!(
                validate_url(url),
                Err(UrlValidationError::ControlCharacter),
                "{url:?}"
            );
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_not_rejected() {
        assert!(validate_url("  http://ya.ru\n").is_ok());
    }

    #[test]
    fn test_rejects_dangerous_schemes() {
        for url in ["javascript:alert(1)", "ftp://example.com", "file:///etc/passwd"] {
            assert_eq!(
                validate_url(url),
                Err(UrlValidationError::UnsupportedProtocol),
                "{url}"
            );
        }
    }
}
