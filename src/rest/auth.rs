use axum::http::HeaderMap;

use crate::{config::TaskdConfig, error::ApiError};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Check the shared-secret header on a mutating route.
///
/// Query routes never call this; reads are open. The check happens before
/// any store access, so an unauthorized request has no side effect.
pub fn require_api_key(headers: &HeaderMap, config: &TaskdConfig) -> Result<(), ApiError> {
    match headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(key) if key == config.api_key => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(key: &str) -> TaskdConfig {
        TaskdConfig::new(
            None,
            Some(std::env::temp_dir().join("taskd-auth-test")),
            None,
            None,
            Some(key.to_string()),
        )
    }

    #[test]
    fn accepts_matching_key() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("s3cret"));
        assert!(require_api_key(&headers, &config("s3cret")).is_ok());
    }

    #[test]
    fn rejects_missing_or_wrong_key() {
        let cfg = config("s3cret");
        assert!(require_api_key(&HeaderMap::new(), &cfg).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("nope"));
        assert!(require_api_key(&headers, &cfg).is_err());
    }
}
