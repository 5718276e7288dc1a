use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Errors surfaced to HTTP callers, keyed by the callable error kinds the
/// client app already understands.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Caller must be authenticated")]
    Unauthenticated,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", self.to_string())
            }
            AppError::InvalidArgument(message) => {
                (StatusCode::BAD_REQUEST, "invalid-argument", message.clone())
            }
            AppError::InvalidSignature => {
                tracing::warn!("Webhook signature verification failed");
                (StatusCode::UNAUTHORIZED, "unauthenticated", self.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
            }
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

/// Push transport failures. Unregistered tokens are distinguished so callers
/// can feed them into the token cleanup job.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("device token is no longer registered")]
    Unregistered,

    #[error("push transport rejected the message: {0}")]
    Rejected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
