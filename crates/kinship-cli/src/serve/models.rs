//! API response models for the genealogy server.
//!
//! Person records are returned as-is from `kinship_core`; this module only
//! holds the envelopes around them and the error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use kinship_core::{Error, ErrorKind, RecomputeReport};

// =============================================================================
// Success Models
// =============================================================================

/// Body of operations that return no record.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub result: &'static str,
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self { result: "success" }
    }
}

/// Body of `POST /reorder`.
#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub result: &'static str,
    /// Highest order written.
    pub layers: u32,
    /// Number of record writes.
    pub writes: usize,
}

impl From<RecomputeReport> for ReorderResponse {
    fn from(report: RecomputeReport) -> Self {
        Self {
            result: "success",
            layers: report.layers,
            writes: report.writes,
        }
    }
}

// =============================================================================
// Error Models
// =============================================================================

/// Error envelope: `{"error": {"kind": ..., "message": ...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// Engine error carried out of a handler.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidIdentifier | ErrorKind::ImmutableFieldViolation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::SameIdentifier | ErrorKind::DuplicateEdge | ErrorKind::OrderViolation => {
            StatusCode::CONFLICT
        }
        ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            tracing::error!(kind = kind.as_str(), "request failed: {}", self.0);
        }

        let body = ErrorResponse {
            error: ErrorBody {
                kind,
                message: self.0.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
