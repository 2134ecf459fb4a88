//! The parts of an HTTP request a controller reads.

use http::Method;
use serde_json::Value;

/// An incoming request: method, query parameters, and JSON body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    query: Vec<(String, String)>,
    body: Value,
}

impl Request {
    /// A request with no query parameters and a `null` body.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: Vec::new(),
            body: Value::Null,
        }
    }

    /// Parse `query` (`skip=0&limit=5`, without the leading `?`).
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        self
    }

    /// Append a single query parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The last value of query parameter `name`.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// JSON body.
    pub fn body(&self) -> &Value {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing() {
        let request = Request::new(Method::GET).with_query("skip=10&limit=5&name=a%20b");
        assert_eq!(request.query("skip"), Some("10"));
        assert_eq!(request.query("limit"), Some("5"));
        assert_eq!(request.query("name"), Some("a b"));
        assert_eq!(request.query("from"), None);
    }

    #[test]
    fn test_last_value_wins() {
        let request = Request::new(Method::GET)
            .with_query("limit=5")
            .with_param("limit", "7");
        assert_eq!(request.query("limit"), Some("7"));
    }
}
