use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use hamming_core::HammingError;
use hamming_core::filename::UnknownArtifact;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] HammingError),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("missing multipart field `file`")]
    MissingFile,

    #[error(transparent)]
    UnknownArtifact(#[from] UnknownArtifact),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(HammingError::SizeLimitExceeded { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Core(HammingError::Pipeline { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Core(HammingError::NoCurrentFile) => StatusCode::NO_CONTENT,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(e) => e.status(),
            ApiError::MissingFile | ApiError::UnknownArtifact(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
