//! Target-URL validation and canonicalization.

use url::Url;

/// Errors from target-URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum TargetUrlError {
    #[error("Invalid URL: {0}")]
    Invalid(String),

    #[error("Only http and https targets are allowed")]
    UnsupportedScheme,
}

/// Normalizes a target URL to a canonical form.
///
/// Lowercases the host, strips default ports and fragments, and rejects any
/// scheme other than http/https. The canonical form is what the per-owner
/// target-uniqueness check compares against.
///
/// # Errors
///
/// Returns [`TargetUrlError::Invalid`] for unparseable input and
/// [`TargetUrlError::UnsupportedScheme`] for non-http(s) schemes.
pub fn normalize_target_url(input: &str) -> Result<String, TargetUrlError> {
    let mut url = Url::parse(input).map_err(|e| TargetUrlError::Invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(TargetUrlError::UnsupportedScheme),
    }

    if let Some(host) = url.host_str() {
        let lowered = host.to_ascii_lowercase();
        url.set_host(Some(&lowered))
            .map_err(|e| TargetUrlError::Invalid(e.to_string()))?;
    }

    url.set_fragment(None);

    let default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if default_port {
        // set_port only fails for cannot-be-a-base URLs, excluded above.
        let _ = url.set_port(None);
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_host_and_strips_fragment() {
        assert_eq!(
            normalize_target_url("HTTPS://EXAMPLE.COM/Path#section").unwrap(),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_strips_default_ports() {
        assert_eq!(
            normalize_target_url("http://example.com:80/a").unwrap(),
            "http://example.com/a"
        );
        assert_eq!(
            normalize_target_url("https://example.com:443/a").unwrap(),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_keeps_custom_port_and_query() {
        assert_eq!(
            normalize_target_url("http://example.com:8080/s?q=rust&l=en").unwrap(),
            "http://example.com:8080/s?q=rust&l=en"
        );
    }

    #[test]
    fn test_rejects_relative_and_garbage() {
        assert!(normalize_target_url("example.com").is_err());
        assert!(normalize_target_url("not a url").is_err());
        assert!(normalize_target_url("").is_err());
    }

    #[test]
    fn test_rejects_dangerous_schemes() {
        for input in [
            "javascript:alert(1)",
            "data:text/plain,hi",
            "file:///etc/passwd",
            "ftp://example.com/f",
        ] {
            assert!(matches!(
                normalize_target_url(input),
                Err(TargetUrlError::UnsupportedScheme)
            ));
        }
    }
}
