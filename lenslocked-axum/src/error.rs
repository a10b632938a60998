use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lenslocked::{AuthError, Error, GalleryError, StorageError};
use serde_json::json;
use thiserror::Error;

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Lenslocked(#[from] Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Lenslocked(err) => status_for(err),
        }
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err.root() {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Session(_) => StatusCode::UNAUTHORIZED,
        Error::Auth(AuthError::EmailTaken) => StatusCode::CONFLICT,
        Error::Auth(AuthError::UserNotFound | AuthError::IncorrectPassword) => {
            StatusCode::UNAUTHORIZED
        }
        Error::Auth(AuthError::InvalidResetToken) => StatusCode::BAD_REQUEST,
        Error::Gallery(GalleryError::NotFound | GalleryError::InvalidId(_)) => {
            StatusCode::NOT_FOUND
        }
        Error::Gallery(GalleryError::Forbidden) => StatusCode::FORBIDDEN,
        Error::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The message shown to the client. Internal failures never leak details.
fn message_for(err: &Error, status: StatusCode) -> String {
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        return INTERNAL_ERROR_MESSAGE.to_string();
    }
    if let Some(message) = err.user_message() {
        return message.to_string();
    }
    match err.root() {
        Error::Validation(e) => e.to_string(),
        Error::Session(e) => e.to_string(),
        Error::Storage(StorageError::NotFound) => "Not found".to_string(),
        _ => INTERNAL_ERROR_MESSAGE.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::Lenslocked(err) => {
                if status.is_server_error() {
                    tracing::error!(error = %err, "Request failed");
                }
                message_for(err, status)
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
