//! API response types.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard API response wrapper, serialized as `{"data": ...}`.
///
/// Errors are rendered by `AppError` as `{"error": {"code", "message"}}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Acknowledgement for operations with nothing else to report.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    /// The acknowledgement.
    pub const OK: Self = Self { ok: true };
}
