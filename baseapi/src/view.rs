//! The response produced by controller operations.

use crate::form::{ErrorEntry, ErrorMap};
use baseapi_core::{ApiError, Value};
use http::StatusCode;
use serde::Serialize;

/// A framework-neutral response: status, optional `Location`, optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// HTTP status.
    pub status: StatusCode,
    /// `Location` header value.
    pub location: Option<String>,
    /// JSON body.
    pub body: Option<Value>,
}

impl View {
    /// 200 with `data` serialized as the body.
    pub fn ok<T: Serialize>(data: &T) -> Result<Self, ApiError> {
        Ok(Self {
            status: StatusCode::OK,
            location: None,
            body: Some(serde_json::to_value(data)?),
        })
    }

    /// 201 pointing at the created resource.
    pub fn created(location: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            location: Some(location.into()),
            body: None,
        }
    }

    /// 204 without a body.
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            location: None,
            body: None,
        }
    }

    /// 400 carrying a flattened validation error map.
    ///
    /// The body keeps the map's key order: own errors first, then invalid
    /// children in the order they were added.
    pub fn errors(errors: ErrorMap) -> Self {
        let body = errors
            .into_iter()
            .map(|(key, entry)| (key, entry_value(entry)))
            .collect::<serde_json::Map<_, _>>();
        Self {
            status: StatusCode::BAD_REQUEST,
            location: None,
            body: Some(Value::Object(body)),
        }
    }

    /// `status` with a plain message as the body.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            location: None,
            body: Some(Value::String(message.into())),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

fn entry_value(entry: ErrorEntry) -> Value {
    match entry {
        ErrorEntry::Message(message) => Value::String(message),
        ErrorEntry::Nested(map) => Value::Object(
            map.into_iter()
                .map(|(key, entry)| (key, entry_value(entry)))
                .collect(),
        ),
    }
}

impl From<ApiError> for View {
    fn from(err: ApiError) -> Self {
        View::message(err.status(), err.to_string())
    }
}

#[cfg(feature = "axum")]
mod axum_impl {
    use super::View;
    use axum::{
        Json,
        http::header::LOCATION,
        response::{IntoResponse, Response},
    };
    use baseapi_core::ApiError;

    impl IntoResponse for View {
        fn into_response(self) -> Response {
            let mut response = match self.body {
                Some(body) => (self.status, Json(body)).into_response(),
                None => self.status.into_response(),
            };
            if let Some(location) = self.location {
                match location.parse() {
                    Ok(value) => {
                        response.headers_mut().insert(LOCATION, value);
                    }
                    Err(err) => tracing::error!(%location, error = %err, "invalid Location header"),
                }
            }
            response
        }
    }

    /// Wraps an [`ApiError`] so handlers can return `Result<View, ApiResponseError>`.
    #[derive(Debug)]
    pub struct ApiResponseError(pub ApiError);

    impl From<ApiError> for ApiResponseError {
        fn from(err: ApiError) -> Self {
            Self(err)
        }
    }

    impl IntoResponse for ApiResponseError {
        fn into_response(self) -> Response {
            View::from(self.0).into_response()
        }
    }
}

#[cfg(feature = "axum")]
pub use axum_impl::ApiResponseError;
