use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use callsheet_types::api::StatusResponse;
use callsheet_types::validate::ValidationError;

/// Every handler failure. Renders as the uniform `{status, message}`
/// envelope; storage detail is logged server-side and never leaks.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Internal Server Error")]
    Storage(#[source] anyhow::Error),
    #[error("Incorrect credentials. Please try again.")]
    IncorrectCredentials,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Not found")]
    NotFound,
    #[error("Email service is not configured")]
    MailerUnavailable,
    #[error("Failed to send email")]
    MailerFailed,
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Storage(anyhow::anyhow!("blocking task failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(source) => {
                error!("storage failure: {:#}", source);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::IncorrectCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MailerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::MailerFailed => StatusCode::BAD_GATEWAY,
        };

        let body = Json(StatusResponse::error(self.to_string()));
        (status, body).into_response()
    }
}
