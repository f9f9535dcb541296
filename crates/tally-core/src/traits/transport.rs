//! Transport trait and the request/response types it carries.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::types::ApiKey;
use crate::Result;

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the method name in upper case.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to the API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL, e.g. `prices/price_1`.
    pub path: String,
    /// Query pairs, in order. Repeated keys are allowed.
    pub query: Vec<(String, String)>,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Bearer credential, if the request is authenticated.
    pub bearer: Option<ApiKey>,
    /// JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a request with no query, headers or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    /// Create a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Create a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Create a `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append query pairs.
    pub fn with_query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Authenticate with a bearer key.
    pub fn with_bearer(mut self, key: ApiKey) -> Self {
        self.bearer = Some(key);
        self
    }

    /// Set the JSON body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response from the API, fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names in lower case.
    pub headers: Vec<(String, String)>,
    /// Raw body.
    pub body: Vec<u8>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    error_type: Option<String>,
    title: Option<String>,
    detail: Option<String>,
}

impl ApiResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`](crate::Error::Serialization) if the
    /// body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Build the error for a non-success response.
    ///
    /// The body is read as `{"type", "title", "detail"}` when possible.
    /// Otherwise a non-empty text body becomes the detail.
    pub fn api_error(&self) -> ApiError {
        match serde_json::from_slice::<ErrorBody>(&self.body) {
            Ok(body) => ApiError::new(self.status, body.error_type, body.title, body.detail),
            Err(_) => {
                let text = String::from_utf8_lossy(&self.body).trim().to_string();
                ApiError::new(self.status, None, None, Some(text).filter(|t| !t.is_empty()))
            }
        }
    }
}

/// A way of sending [`ApiRequest`]s.
///
/// Implementations own retry, timeout and connection policy. They must stop
/// and return [`Error::Cancelled`](crate::Error::Cancelled) when `cancel`
/// fires before the response is complete.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the full response.
    ///
    /// Non-success statuses are returned as responses, not errors.
    async fn execute(&self, request: &ApiRequest, cancel: &CancellationToken)
    -> Result<ApiResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_builder() {
        let request = ApiRequest::get("prices")
            .with_query([("limit".to_string(), "2".to_string())])
            .with_header("Idempotency-Key", "k1");
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "prices");
        assert_eq!(request.query.len(), 1);
        assert_eq!(request.headers[0].0, "Idempotency-Key");
        assert!(request.body.is_none());
    }

    #[test]
    fn request_debug_hides_bearer() {
        let request = ApiRequest::get("prices").with_bearer(ApiKey::new("sk_secret").unwrap());
        assert!(!format!("{request:?}").contains("sk_secret"));
    }

    #[test]
    fn parses_problem_body() {
        let body = json!({
            "type": "https://docs.withorb.com/reference/error-responses#404-not-found",
            "status": 404,
            "title": "Resource not found",
            "detail": "No price with id price_x"
        });
        let response = ApiResponse::new(404, serde_json::to_vec(&body).unwrap());
        assert!(!response.is_success());

        let err = response.api_error();
        assert_eq!(err.status, 404);
        assert_eq!(err.title.as_deref(), Some("Resource not found"));
        assert_eq!(err.detail.as_deref(), Some("No price with id price_x"));
        assert!(err.error_type.unwrap().ends_with("404-not-found"));
    }

    #[test]
    fn text_body_becomes_detail() {
        let err = ApiResponse::new(502, "Bad gateway\n").api_error();
        assert_eq!(err.detail.as_deref(), Some("Bad gateway"));

        let err = ApiResponse::new(500, "").api_error();
        assert_eq!(err.detail, None);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut response = ApiResponse::new(200, "{}");
        response
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.json::<Value>().unwrap(), json!({}));
    }
}
