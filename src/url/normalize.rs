use crate::{BundleError, UrlError};
use url::Url;

/// Turns free-form user input into the absolute base URL of a run
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject if nothing is left
/// 2. Prefix `https://` unless the input already starts with `http://` or
///    `https://` (case-insensitive)
/// 3. Parse as an absolute URL; reject if malformed
///
/// Both failures happen before any network activity.
///
/// # Returns
///
/// * `Ok(Url)` - Absolute http(s) URL
/// * `Err(BundleError::InvalidInput)` - Input was empty or whitespace
/// * `Err(BundleError::InvalidUrl)` - Input could not be parsed
///
/// # Examples
///
/// ```
/// use web_code_bundler::url::normalize_input;
///
/// let url = normalize_input("  example.com/docs ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn normalize_input(input: &str) -> Result<Url, BundleError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BundleError::InvalidInput);
    }

    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|source| UrlError::Parse {
        input: trimmed.to_string(),
        source,
    })?;

    Ok(url)
}

/// Checks for an explicit `http://` or `https://` prefix
fn has_http_scheme(input: &str) -> bool {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
