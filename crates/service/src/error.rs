use inkwell_blob::BlobError;
use inkwell_core::ContentError;
use inkwell_query::ParseError;
use inkwell_store::StoreError;
use thiserror::Error;

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A raw filter, sort or projection token was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The request content was rejected.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Credentials were missing or wrong, or the account may not sign in.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// A store or upload backend failed.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<ContentError> for ServiceError {
    fn from(err: ContentError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidQuery(msg) => Self::Validation(msg),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<BlobError> for ServiceError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::EmptyFilename => Self::Validation(err.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_by_cause() {
        assert!(matches!(
            ServiceError::from(StoreError::InvalidQuery("bad id".into())),
            ServiceError::Validation(ref m) if m == "bad id"
        ));
        assert!(matches!(
            ServiceError::from(StoreError::Connection("refused".into())),
            ServiceError::Upstream(_)
        ));
    }

    #[test]
    fn parse_errors_keep_their_message() {
        let err = ServiceError::from(ParseError::MalformedSort("title".into()));
        assert_eq!(err.to_string(), "invalid sort format: title");
    }

    #[test]
    fn empty_filename_is_a_client_error() {
        assert!(matches!(
            ServiceError::from(BlobError::EmptyFilename),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            ServiceError::from(BlobError::Storage("down".into())),
            ServiceError::Upstream(_)
        ));
    }
}
