use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use seasonarr::ReconcileError;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid payload: {}", .0.body_text())]
    Payload(#[from] JsonRejection),

    #[error("Missing tvdbId")]
    MissingIdentifier,

    #[error("Invalid tvdbId: {0}")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("reconciliation task failed: {0}")]
    Task(#[from] JoinError),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Payload(rejection) => rejection.status(),
            WebhookError::MissingIdentifier | WebhookError::InvalidIdentifier(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Reconcile(_) | WebhookError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!("Webhook failed: {}", message);
        }

        (status, Json(json!({ "status": "error", "message": message }))).into_response()
    }
}
