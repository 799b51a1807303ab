//! Endpoint URL construction.

/// Strip trailing slashes so endpoints can be appended without doubling them.
///
/// ```
/// use eda::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:5000/"), "http://localhost:5000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use eda::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.groq.com/openai/v1/", "/chat/completions"),
///     "https://api.groq.com/openai/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Reject values that are obviously not HTTP(S) base URLs before saving them.
pub fn validate_base_url(value: &str) -> Result<String, String> {
    let normalized = normalize_base_url(value);
    let has_scheme = normalized.starts_with("http://") || normalized.starts_with("https://");
    let has_host = normalized
        .split_once("://")
        .is_some_and(|(_, rest)| !rest.is_empty());
    if has_scheme && has_host {
        Ok(normalized)
    } else {
        Err(format!(
            "'{value}' is not an http(s) URL (expected something like http://localhost:5000)"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slashes_and_whitespace() {
        assert_eq!(normalize_base_url("http://localhost:5000"), "http://localhost:5000");
        assert_eq!(normalize_base_url("http://localhost:5000///"), "http://localhost:5000");
        assert_eq!(normalize_base_url(" https://api.openai.com/v1/ "), "https://api.openai.com/v1");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn construct_joins_backend_and_provider_paths() {
        assert_eq!(
            construct_api_url("http://localhost:5000/", "upload"),
            "http://localhost:5000/upload"
        );
        assert_eq!(
            construct_api_url("http://localhost:5000", "///extract_text"),
            "http://localhost:5000/extract_text"
        );
        assert_eq!(
            construct_api_url("https://api.openai.com/v1", "chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn validate_requires_scheme_and_host() {
        assert_eq!(
            validate_base_url("https://eda.example.org/").as_deref(),
            Ok("https://eda.example.org")
        );
        assert!(validate_base_url("localhost:5000").is_err());
        assert!(validate_base_url("http://").is_err());
        assert!(validate_base_url("ftp://host").is_err());
    }
}
