use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inkwell_service::ServiceError;
use thiserror::Error;
use tracing::error;

const INTERNAL_ERROR: &str = "internal server error";

/// Errors that can occur when running the Inkwell server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A service-level error surfaced through the API.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The request itself is malformed (bad multipart body, bad JSON).
    #[error("{0}")]
    BadRequest(String),

    /// Authentication failed (missing or invalid credentials).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl ServerError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Service(err) => match err {
                ServiceError::Parse(e) => (StatusCode::BAD_REQUEST, e.to_string()),
                ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
                ServiceError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
                ServiceError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
                ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                ServiceError::Upstream(msg) => {
                    error!(error = %msg, "upstream failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_owned())
                }
            },
            Self::Config(msg) => {
                error!(error = %msg, "configuration failure");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_owned())
            }
            Self::Io(e) => {
                error!(error = %e, "io failure");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_owned())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use inkwell_query::ParseError;

    use super::*;

    fn status(err: ServerError) -> (StatusCode, String) {
        err.status_and_message()
    }

    #[test]
    fn client_errors_keep_their_message() {
        let (code, msg) = status(ServiceError::Validation("title cannot be empty".into()).into());
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "title cannot be empty");

        let parse = ParseError::MalformedFilter("age".into());
        let (code, _) = status(ServiceError::from(parse).into());
        assert_eq!(code, StatusCode::BAD_REQUEST);

        let (code, _) = status(ServiceError::NotFound("gone".into()).into());
        assert_eq!(code, StatusCode::NOT_FOUND);
        let (code, _) = status(ServiceError::Forbidden("no".into()).into());
        assert_eq!(code, StatusCode::FORBIDDEN);
        let (code, _) = status(ServerError::Unauthorized("missing token".into()));
        assert_eq!(code, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_details_are_hidden() {
        let err = ServiceError::Upstream("connection refused to 10.0.0.5:5432".into());
        let (code, msg) = status(err.into());
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "internal server error");
    }
}
