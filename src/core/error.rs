use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

/// Failures of the messaging core.
///
/// Delivery misses (receiver offline, closed or full queue) are deliberately
/// absent: they are reported as [`crate::ws::DeliveryOutcome`] values.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Empty body, missing or malformed participant id, self-addressed message.
    #[error("{0}")]
    Validation(String),

    #[error("resource not found")]
    NotFound,

    /// Storage I/O failure; the caller may retry at its own discretion.
    #[error("message store unavailable: {0}")]
    TransientStore(String),

    #[error("message store did not answer in time")]
    Timeout,
}

impl ChatError {
    /// True for the errors a caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientStore(_) | Self::Timeout)
    }
}

impl From<sqlx::Error> for ChatError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::TransientStore(other.to_string()),
        }
    }
}

impl From<validator::ValidationError> for ChatError {
    fn from(err: validator::ValidationError) -> Self {
        match err.message {
            Some(message) => Self::Validation(message.to_string()),
            None => Self::Validation(err.code.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ChatError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // schema-level errors are reported under the "__all__" field
        let mut reasons: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        reasons.sort();
        if reasons.is_empty() {
            reasons.push(errors.to_string());
        }
        Self::Validation(reasons.join("; "))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Validation(reason) => Self::bad_request("Validation error").with_details(reason),
            ChatError::NotFound => Self::not_found("Resource not found"),
            ChatError::TransientStore(_) | ChatError::Timeout => {
                Self::service_unavailable("Message store unavailable")
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "Invalid request").with_details(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), "Invalid request").with_details(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}
