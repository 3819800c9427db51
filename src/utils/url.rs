//! URL helpers for building server endpoint URLs
//!
//! The server host comes from the `--host` flag, so it may arrive with or
//! without a trailing slash; these helpers keep endpoint construction
//! consistent either way.

/// Normalize a server host URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use lmchat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://127.0.0.1:1234"), "http://127.0.0.1:1234");
/// assert_eq!(normalize_base_url("http://127.0.0.1:1234/"), "http://127.0.0.1:1234");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete endpoint URL from the server host and an endpoint path
///
/// Normalizes the host and safely appends the endpoint, so neither a
/// trailing slash on the host nor a leading slash on the endpoint produces
/// a double slash in the result.
///
/// # Examples
///
/// ```
/// use lmchat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://127.0.0.1:1234", "v1/chat/completions"),
///     "http://127.0.0.1:1234/v1/chat/completions"
/// );
/// assert_eq!(
///     construct_api_url("http://localhost:1234/", "api/v0/models"),
///     "http://localhost:1234/api/v0/models"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slashes_only() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:1234"),
            "http://127.0.0.1:1234"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:1234/"),
            "http://127.0.0.1:1234"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:1234///"),
            "http://127.0.0.1:1234"
        );
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn construct_handles_slash_combinations() {
        assert_eq!(
            construct_api_url("http://127.0.0.1:1234", "v1/chat/completions"),
            "http://127.0.0.1:1234/v1/chat/completions"
        );
        assert_eq!(
            construct_api_url("http://127.0.0.1:1234/", "v1/chat/completions"),
            "http://127.0.0.1:1234/v1/chat/completions"
        );
        assert_eq!(
            construct_api_url("http://127.0.0.1:1234", "/api/v0/models"),
            "http://127.0.0.1:1234/api/v0/models"
        );
        assert_eq!(
            construct_api_url("http://127.0.0.1:1234///", "///api/v0/models"),
            "http://127.0.0.1:1234/api/v0/models"
        );
    }
}
