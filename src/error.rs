use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Everything a REST handler can fail with, mapped 1:1 to an HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The id does not exist in the caller's own collection. An id that
    /// lives in another client's collection is indistinguishable from an
    /// absent one — collections are fully isolated.
    #[error("task {0} not found for this client")]
    NotFound(Uuid),

    /// Missing or wrong `x-api-key` on a mutating route.
    #[error("invalid API key")]
    Unauthorized,

    /// Malformed input caught at the boundary, before any store access.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::NotFound(Uuid::new_v4()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::validation("bad").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
