use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MomentsError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Notion API error ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Notion rate limit exceeded, retry after {retry_after:?} seconds")]
    RateLimit { retry_after: Option<u64> },

    #[error("Notion authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Copy of a failure observed by another caller, keeping its text and status.
    #[error("{message}")]
    Shared { status: u16, message: String },
}

impl MomentsError {
    /// Status used when a feed route has to report this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            MomentsError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            MomentsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MomentsError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            MomentsError::Shared { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// Cloneable stand-in for this error, for handing one failure to several callers.
    pub fn shared(&self) -> MomentsError {
        MomentsError::Shared {
            status: self.status_code().as_u16(),
            message: self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MomentsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_copy_keeps_message_and_status() {
        let err = MomentsError::Auth("API token is invalid.".to_string());
        let copy = err.shared();
        assert_eq!(copy.to_string(), err.to_string());
        assert_eq!(copy.status_code(), StatusCode::BAD_GATEWAY);

        let timeout = MomentsError::Timeout { timeout_ms: 100 }.shared();
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.shared().to_string(), "Request timed out after 100 ms");
    }

    #[test]
    fn test_timeout_message_mentions_duration() {
        let err = MomentsError::Timeout { timeout_ms: 15000 };
        assert_eq!(err.to_string(), "Request timed out after 15000 ms");
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_remote_failures_map_to_bad_gateway() {
        let err = MomentsError::Api {
            status: 400,
            code: "validation_error".to_string(),
            message: "bad filter".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            MomentsError::RateLimit { retry_after: Some(3) }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_missing_config_is_unavailable() {
        let err = MomentsError::Config("NOTION_TOKEN is not set".to_string());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
