//! Error types for the onboarding API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use onboarding_forms::{ErrorKind, FormError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown form type: {0}")]
    UnknownForm(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::UnknownForm(name) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_FORM",
                format!("Form type '{}' not found", name),
            ),
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ApiError::Form(err @ (FormError::MissingSignature | FormError::InvalidDocument(_))) => {
                (StatusCode::BAD_REQUEST, err.code(), err.to_string())
            }
            ApiError::Form(err) => match err.kind() {
                ErrorKind::Validation => {
                    (StatusCode::UNPROCESSABLE_ENTITY, err.code(), err.to_string())
                }
                ErrorKind::Configuration => {
                    tracing::error!("Form configuration error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        err.code(),
                        "Form template configuration error".to_string(),
                    )
                }
                ErrorKind::Internal => {
                    tracing::error!("PDF error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        err.code(),
                        "Failed to produce the document".to_string(),
                    )
                }
            },
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("generation task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_error_kind() {
        let status = |err: ApiError| err.parts().0;
        assert_eq!(
            status(FormError::MissingSignature.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(FormError::InvalidDocument("not a readable PDF".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(FormError::TooManyAccounts(4).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(FormError::UnknownField("bank4_routing".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(ApiError::UnknownForm("w2".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let (_, code, message) =
            ApiError::from(FormError::Template("missing /srv/templates/w4.pdf".into())).parts();
        assert_eq!(code, "TEMPLATE_ERROR");
        assert!(!message.contains("/srv"));
    }
}
