//! Pagination parameters.

use baseapi_core::{Request, Value};

/// The `skip` and `limit` query parameters of a collection request.
///
/// Values are passed through unchecked: integers become JSON numbers, any
/// other text stays a string, and the repository decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    /// Number of documents to skip.
    pub skip: Option<Value>,
    /// Maximum number of documents to return.
    pub limit: Option<Value>,
}

impl Pagination {
    /// Read `skip` and `limit` from the query string.
    pub fn from_request(request: &Request) -> Self {
        Self {
            skip: request.query("skip").map(parameter),
            limit: request.query("limit").map(parameter),
        }
    }

    /// Positional arguments for a paginated find: `[skip, limit]`.
    pub fn into_arguments(self) -> Vec<Value> {
        vec![
            self.skip.unwrap_or(Value::Null),
            self.limit.unwrap_or(Value::Null),
        ]
    }
}

fn parameter(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(number) => Value::from(number),
        Err(_) => Value::from(raw),
    }
}
