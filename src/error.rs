use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

/// Failures of a single call through the schedule API adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Rejected locally, nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error("{status} - {body}")]
    Api { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response from the API: {0}")]
    Decode(String),
}

impl ScheduleError {
    pub fn validation(message: impl Into<String>) -> Self {
        ScheduleError::Validation(message.into())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API token is not set")]
    MissingToken,

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingToken => return Redirect::to("/settings").into_response(),
            AppError::Schedule(ScheduleError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::Schedule(e @ ScheduleError::Api { .. }) => {
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Schedule(e @ ScheduleError::Decode(_)) => {
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Schedule(e @ ScheduleError::Transport(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, e.to_string())
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server is misconfigured".to_string(),
                )
            }
            AppError::Template(e) => {
                error!("template error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to render page".to_string(),
                )
            }
        };

        let body = crate::views::ErrorPage::new(status, message).into_html();
        (status, body).into_response()
    }
}

/// Shorthand used by handlers that only fail on rendering.
pub type PageResult = Result<Html<String>, AppError>;
