use crate::models::TrackResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, warn};

const INVALID_REQUEST: &str = "Requisição inválida";
const INTERNAL_ERROR: &str = "Erro interno do servidor";

/// Error surfaced to HTTP callers. The body is always the generic
/// `{success: false, message}` shape; details only go to the log.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(status: StatusCode, detail: impl std::fmt::Display) -> Self {
        warn!(%status, "rejected request: {detail}");
        Self {
            status,
            message: INVALID_REQUEST.to_string(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        error!("failed to process tracking data: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.status(), rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(TrackResponse::failure(self.message))).into_response()
    }
}
