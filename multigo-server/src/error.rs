use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use multigo_engine::{ErrorKind, GoError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        }
    }

    /// Message sent back over the websocket.
    pub fn client_message(&self) -> String {
        self.status_and_message().1
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.status_and_message().into_response()
    }
}

/// Rule violations are ordinary bad requests; a player acting on a room they
/// are not seated in is not authorized.
impl From<GoError> for AppError {
    fn from(e: GoError) -> Self {
        match e.kind() {
            ErrorKind::RuleViolation => AppError::BadRequest(e.to_string()),
            ErrorKind::PreconditionViolation => match e {
                GoError::NotSeated => AppError::Unauthorized(e.to_string()),
                _ => AppError::BadRequest(e.to_string()),
            },
        }
    }
}

/// JSON-returning error type for API routes.
/// Wraps AppError and returns `{"error": "message"}` responses.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.status_and_message();
        (status, Json(json!({"error": message}))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError(e)
    }
}
