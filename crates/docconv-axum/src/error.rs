//! Axum-specific error types and mappings.
//!
//! Every error is returned to the client as a plain-text body. Server-side
//! failures echo the underlying message.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use docconv_core::{ServiceError, UploadError};
use thiserror::Error;
use tracing::{error, warn};

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Method not supported on this route.
    #[error("Method not allowed")]
    MethodNotAllowed {
        /// Value of the `Allow` header.
        allow: &'static str,
    },

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl HttpError {
    /// Status code this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal(msg) => error!(target: "docconv.http", %status, "{msg}"),
            other => warn!(target: "docconv.http", %status, "{other}"),
        }

        let body = self.to_string();
        match self {
            Self::MethodNotAllowed { allow } => {
                (status, [(header::ALLOW, allow)], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => Self::NotFound(err.to_string()),
            ServiceError::UnsupportedFormat(_)
            | ServiceError::InvalidDownloadName(_)
            | ServiceError::Upload(UploadError::TooLarge { .. }) => {
                Self::BadRequest(err.to_string())
            }
            ServiceError::Upload(UploadError::Io { .. })
            | ServiceError::Conversion(_)
            | ServiceError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<UploadError> for HttpError {
    fn from(err: UploadError) -> Self {
        ServiceError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docconv_core::{ConversionError, DownloadNameError};

    #[test]
    fn client_errors_map_to_4xx() {
        let cases = [
            (ServiceError::UnsupportedFormat("docx"), StatusCode::BAD_REQUEST),
            (
                ServiceError::InvalidDownloadName(DownloadNameError::Traversal),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Upload(UploadError::TooLarge { limit: 10 }),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::NotFound("x.pdf".to_string()),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }

    #[test]
    fn conversion_failure_echoes_detail() {
        let err = HttpError::from(ServiceError::Conversion(ConversionError::EngineFailed {
            status: "exit status: 1".to_string(),
            detail: "bad input".to_string(),
        }));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Error converting file:"));
        assert!(err.to_string().contains("bad input"));
    }

    #[test]
    fn method_not_allowed_sets_allow_header() {
        let response = HttpError::MethodNotAllowed { allow: "POST" }.into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
