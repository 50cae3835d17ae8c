//! Uniform JSON envelope wrapped around every API response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// `{ success, message, data?, error?, code?, timestamp }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human readable outcome.
    pub message: String,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error category on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    /// Specific error code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    /// RFC 3339 UTC time the response was built.
    pub timestamp: String,
}

impl<T: Serialize> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            code: None,
            timestamp: current_timestamp_rfc3339(),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Handler-boundary error rendered as a failure envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Error category (`BAD_REQUEST`, `NOT_FOUND`, ...).
    pub error: &'static str,
    /// Human readable message.
    pub message: &'static str,
    /// Specific error code.
    pub code: &'static str,
}

impl ApiError {
    const fn new(
        status: StatusCode,
        error: &'static str,
        message: &'static str,
        code: &'static str,
    ) -> Self {
        Self {
            status,
            error,
            message,
            code,
        }
    }

    /// Search without `q`.
    pub const fn missing_query() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "Query parameter 'q' is required",
            "MISSING_QUERY",
        )
    }

    /// Sort field with characters the engine would misread.
    pub const fn invalid_sort() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "Invalid sort field",
            "INVALID_SORT",
        )
    }

    /// Product lookup without `id`.
    pub const fn missing_id() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "Product ID is required",
            "MISSING_ID",
        )
    }

    /// Product lookup with a non-integer `id`.
    pub const fn invalid_id() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "Invalid product ID",
            "INVALID_ID",
        )
    }

    /// No record matched the requested id.
    pub const fn product_not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Product not found",
            "PRODUCT_NOT_FOUND",
        )
    }

    /// Unknown path.
    pub const fn route_not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Route not found",
            "ROUTE_NOT_FOUND",
        )
    }

    /// Downstream search failure.
    pub const fn search_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SEARCH_FAILED",
            "Search operation failed",
            "INTERNAL_ERROR",
        )
    }

    /// Downstream stats failure.
    pub const fn stats_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "STATS_FAILED",
            "Failed to get index statistics",
            "INTERNAL_ERROR",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: Envelope<()> = Envelope {
            success: false,
            message: self.message.to_string(),
            data: None,
            error: Some(self.error),
            code: Some(self.code),
            timestamp: current_timestamp_rfc3339(),
        };
        (self.status, Json(body)).into_response()
    }
}

pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
