//! Error types for the Yahoo fetcher

use league_analytics::AnalyticsError;
use thiserror::Error;

/// Longest upstream body excerpt written to logs
pub const LOG_BODY_LIMIT: usize = 2048;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Not authenticated with Yahoo")]
    NotAuthenticated,

    #[error("Yahoo API returned {status} for {url}")]
    Upstream { status: u16, url: String, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] AnalyticsError),

    #[error("OAuth error: {message}")]
    OAuth { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl FetchError {
    /// Upstream body cut to [`LOG_BODY_LIMIT`] bytes on a char boundary
    pub fn body_excerpt(body: &str) -> &str {
        if body.len() <= LOG_BODY_LIMIT {
            return body;
        }
        let mut end = LOG_BODY_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        &body[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_excerpt_truncates_long_bodies() {
        let long = "x".repeat(LOG_BODY_LIMIT + 100);
        assert_eq!(FetchError::body_excerpt(&long).len(), LOG_BODY_LIMIT);
        assert_eq!(FetchError::body_excerpt("short"), "short");
    }

    #[test]
    fn test_body_excerpt_respects_char_boundaries() {
        // 'é' is two bytes, so the limit lands mid-character
        let body = format!("a{}", "é".repeat(LOG_BODY_LIMIT));
        let excerpt = FetchError::body_excerpt(&body);
        assert!(excerpt.len() <= LOG_BODY_LIMIT);
        assert!(excerpt.len() >= LOG_BODY_LIMIT - 1);
    }

    #[test]
    fn test_upstream_display_names_status_and_url() {
        let err = FetchError::Upstream { status: 503, url: "https://x/league".into(), body: String::new() };
        assert_eq!(err.to_string(), "Yahoo API returned 503 for https://x/league");
    }
}
