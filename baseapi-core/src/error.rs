//! Error types for baseapi.
//!
//! - [`ApiError`] - Top-level error for controller operations
//! - [`RepositoryError`] - Errors reported by repositories and managers
//! - [`StoreError`] - Data store and repository lookup errors
//! - [`FormError`] - Errors raised while building a form
//! - [`RoutingError`] - Errors raised while generating URLs

use http::StatusCode;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message returned to clients when a query fails.
pub const QUERY_FAILURE: &str = "A DBAL error occurred while processing your request";

/// Message returned to clients when the data store is unreachable or misconfigured.
pub const CONNECTION_FAILURE: &str =
    "A DB configuration error occurred while processing your request";

/// Top-level error type for controller operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A lookup produced no document.
    #[error("Could not find resource")]
    NotFound,

    /// The data store failed. Carries a fixed client-facing message only.
    #[error("{0}")]
    Backend(&'static str),

    /// Nothing could handle a dynamically dispatched method.
    #[error("Call to undefined method {target}::{method}.")]
    MissingRepositoryMethod {
        /// The controller or repository the call was made on.
        target: String,
        /// The requested method.
        method: String,
    },

    /// An edit or delete addressed a document that does not exist.
    #[error("The requested resource with id \"{0}\" doesn't exist.")]
    ResourceAbsent(String),

    /// A find method returned a scalar where documents were expected.
    #[error("repository method `{0}` did not return documents")]
    UnexpectedOutput(String),

    /// A persisted document has no identifier to build a `Location` from.
    #[error("persisted document has no identifier")]
    MissingIdentifier,

    /// Data store or repository lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The form could not be built.
    #[error(transparent)]
    Form(#[from] FormError),

    /// URL generation failed.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// A response body could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::ResourceAbsent(_) => StatusCode::BAD_REQUEST,
            ApiError::Form(FormError::Malformed(_)) => StatusCode::BAD_REQUEST,
            ApiError::Backend(_)
            | ApiError::MissingRepositoryMethod { .. }
            | ApiError::UnexpectedOutput(_)
            | ApiError::MissingIdentifier
            | ApiError::Store(_)
            | ApiError::Form(_)
            | ApiError::Routing(_)
            | ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UnknownMethod { repository, method } => {
                ApiError::MissingRepositoryMethod {
                    target: repository,
                    method,
                }
            }
            RepositoryError::Connection(_) => ApiError::Backend(CONNECTION_FAILURE),
            RepositoryError::Query(_) | RepositoryError::InvalidArgument(_) => {
                ApiError::Backend(QUERY_FAILURE)
            }
        }
    }
}

/// Errors reported by a repository or persistence manager.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The repository has no method with this name.
    #[error("repository `{repository}` has no method `{method}`")]
    UnknownMethod {
        /// Repository name.
        repository: String,
        /// Requested method.
        method: String,
    },

    /// The query itself failed.
    #[error("query failed: {0}")]
    Query(#[source] BoxError),

    /// The data store could not be reached or is misconfigured.
    #[error("connection failed: {0}")]
    Connection(#[source] BoxError),

    /// An argument was rejected by the repository.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RepositoryError {
    /// Shorthand for [`RepositoryError::UnknownMethod`].
    pub fn unknown_method(repository: impl Into<String>, method: impl Into<String>) -> Self {
        RepositoryError::UnknownMethod {
            repository: repository.into(),
            method: method.into(),
        }
    }
}

/// Errors raised while resolving a data store or repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No data store was named and no default is configured.
    #[error("no data store given and no default configured")]
    NoDataStore,

    /// No repository was named and no default is configured.
    #[error("no repository given and no default configured")]
    NoRepository,

    /// The data store is not registered.
    #[error("unknown data store `{0}`")]
    UnknownStore(String),

    /// The data store has no repository with this name.
    #[error("data store has no repository `{0}`")]
    UnknownRepository(String),
}

/// Errors raised while building a form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// No form is registered under this type name.
    #[error("unknown form type `{0}`")]
    UnknownType(String),

    /// The request data could not be read at all.
    #[error("malformed request data: {0}")]
    Malformed(String),
}

/// Errors raised while generating URLs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// No route is registered under this name.
    #[error("unknown route `{0}`")]
    UnknownRoute(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_are_generalized() {
        let query = ApiError::from(RepositoryError::Query("syntax error near FROM".into()));
        assert_eq!(query.to_string(), QUERY_FAILURE);
        assert_eq!(query.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let connection = ApiError::from(RepositoryError::Connection("refused".into()));
        assert_eq!(connection.to_string(), CONNECTION_FAILURE);

        let invalid = ApiError::from(RepositoryError::InvalidArgument("skip < 0".into()));
        assert_eq!(invalid.to_string(), QUERY_FAILURE);
    }

    #[test]
    fn test_unknown_method_names_repository() {
        let err = ApiError::from(RepositoryError::unknown_method("Product", "frobnicate"));
        assert_eq!(
            err.to_string(),
            "Call to undefined method Product::frobnicate."
        );
    }

    #[test]
    fn test_statuses() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NotFound.to_string(), "Could not find resource");
        assert_eq!(
            ApiError::ResourceAbsent("42".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Form(FormError::UnknownType("X".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Form(FormError::Malformed("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
