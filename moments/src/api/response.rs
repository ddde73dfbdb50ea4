//! Envelope shared by every feed route.
//!
//! ```json
//! { "success": true, "data": [ ... ], "count": 3, "generatedAt": "2024-05-01T08:30:00.000Z" }
//! ```
//!
//! On failure `data` is empty and `error` / `message` describe what went wrong.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::MomentsError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip)]
    status: StatusCode,
}

fn generated_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl<T: Serialize> FeedResponse<T> {
    pub fn success(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            generated_at: generated_at(),
            error: None,
            message: None,
            status: StatusCode::OK,
        }
    }

    /// Empty envelope reporting `summary`, with the error text as `message`.
    pub fn failure(summary: &str, err: &MomentsError) -> Self {
        tracing::error!(error = %err, "{}", summary);

        Self {
            success: false,
            data: Vec::new(),
            count: 0,
            generated_at: generated_at(),
            error: Some(summary.to_string()),
            message: Some(err.to_string()),
            status: err.status_code(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for FeedResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
