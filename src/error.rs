use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    MagicLink(#[from] crate::auth::magic_link::MagicLinkError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    InternalError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use crate::auth::magic_link::MagicLinkError;

        let (status, message) = match self {
            AppError::MagicLink(err) => match err {
                MagicLinkError::InvalidPayload(msg) => (StatusCode::BAD_REQUEST, msg),
                MagicLinkError::Expired => {
                    (StatusCode::BAD_REQUEST, "The magic link has expired".to_string())
                }
                MagicLinkError::NonceMismatch => {
                    (StatusCode::BAD_REQUEST, "Invalid nonce".to_string())
                }
                MagicLinkError::Validation(errors) => (
                    StatusCode::BAD_REQUEST,
                    errors
                        .values()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                MagicLinkError::Email(_)
                | MagicLinkError::Repository(_)
                | MagicLinkError::Session(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Database(_) | AppError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, message).into_response()
    }
}

impl From<crate::repositories::RepositoryError> for AppError {
    fn from(err: crate::repositories::RepositoryError) -> Self {
        use crate::repositories::RepositoryError;
        match err {
            RepositoryError::NotFound => AppError::NotFound("Not found".to_string()),
            RepositoryError::AlreadyExists => {
                AppError::Validation("Already exists".to_string())
            }
            RepositoryError::Database(e) => AppError::Database(e),
        }
    }
}
