//! Request/response envelope
//!
//! A minimal, transport-free view of an HTTP call: the hosting platform (or
//! the CLI) converts its own request type into a [`FunctionRequest`] and
//! writes the [`FunctionResponse`] back out.

use crate::error::{FunctionError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;

/// Headers attached to every response so browsers on any origin can call us
pub const CORS_HEADERS: [(&str, &str); 2] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "authorization, x-client-info, apikey, content-type",
    ),
];

/// [`CORS_HEADERS`] as owned pairs
pub fn cors_headers() -> Vec<(String, String)> {
    CORS_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Options,
    Other,
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "OPTIONS" => Method::Options,
            _ => Method::Other,
        })
    }
}

/// An incoming call
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionRequest {
    pub method: Method,
    /// Raw body text
    pub body: String,
}

impl FunctionRequest {
    pub fn new(method: Method, body: impl Into<String>) -> Self {
        Self {
            method,
            body: body.into(),
        }
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self::new(Method::Post, body)
    }

    pub fn post_json(body: &Value) -> Self {
        Self::post(body.to_string())
    }

    /// CORS preflight
    pub fn options() -> Self {
        Self::new(Method::Options, "")
    }

    pub fn is_preflight(&self) -> bool {
        self.method == Method::Options
    }

    /// Decode the body. A body that is not JSON, or has the wrong shape, is
    /// a validation error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| FunctionError::validation(format!("Invalid JSON body: {e}")))
    }
}

/// An outgoing response
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl FunctionResponse {
    /// JSON response with CORS headers
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = cors_headers();
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    /// Answer to an `OPTIONS` preflight
    pub fn preflight() -> Self {
        Self {
            status: 200,
            headers: cors_headers(),
            body: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_parsing() {
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("OPTIONS".parse::<Method>().unwrap(), Method::Options);
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Other);
    }

    #[test]
    fn json_responses_carry_cors() {
        let response = FunctionResponse::ok(json!({"success": true}));
        assert!(response.is_success());
        assert_eq!(response.header("access-control-allow-origin"), Some("*"));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn preflight_has_no_body() {
        let response = FunctionResponse::preflight();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, Value::Null);
        assert!(response.header("Access-Control-Allow-Headers").is_some());
    }

    #[test]
    fn malformed_body_is_a_validation_error() {
        let request = FunctionRequest::post("{not json");
        let err = request.json::<Value>().unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
