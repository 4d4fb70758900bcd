//! Function error types

use crate::http::FunctionResponse;
use serde_json::json;
use thiserror::Error;

/// Everything that can end a function call early
#[derive(Error, Debug)]
pub enum FunctionError {
    /// Missing or malformed request fields
    #[error("{0}")]
    Validation(String),

    /// Gateway answered 429
    #[error("AI gateway rate limit exceeded")]
    RateLimited,

    /// Gateway answered 402
    #[error("AI gateway quota exhausted")]
    QuotaExhausted,

    /// The model's reply was not the JSON we asked for
    #[error("failed to parse AI response: {0}")]
    Parse(String),

    /// Gateway answered with some other non-success status
    #[error("AI gateway returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The request never got a response (DNS, TLS, timeout)
    #[error("AI gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Missing or invalid deployment configuration
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Internal(String),
}

impl FunctionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status the error is reported with
    pub fn status(&self) -> u16 {
        match self {
            FunctionError::Validation(_) => 400,
            FunctionError::QuotaExhausted => 402,
            FunctionError::RateLimited => 429,
            FunctionError::Parse(_)
            | FunctionError::Upstream { .. }
            | FunctionError::Transport(_)
            | FunctionError::Config(_)
            | FunctionError::Internal(_) => 500,
        }
    }

    /// Message shown to the caller. Parse details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            FunctionError::RateLimited => {
                "Rate limit exceeded. Please try again in a moment.".to_string()
            }
            FunctionError::QuotaExhausted => {
                "AI usage quota exhausted. Please add credits to continue.".to_string()
            }
            FunctionError::Parse(_) => "Failed to parse AI response".to_string(),
            other => other.to_string(),
        }
    }

    /// Log and render as an error response
    pub fn into_response(self) -> FunctionResponse {
        let status = self.status();
        if status >= 500 {
            tracing::error!(status, error = %self, "function failed");
        } else {
            tracing::warn!(status, error = %self, "function rejected request");
        }
        FunctionResponse::json(
            status,
            json!({ "success": false, "error": self.public_message() }),
        )
    }
}

/// Result type for function operations
pub type Result<T> = std::result::Result<T, FunctionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(FunctionError::validation("x").status(), 400);
        assert_eq!(FunctionError::RateLimited.status(), 429);
        assert_eq!(FunctionError::QuotaExhausted.status(), 402);
        assert_eq!(FunctionError::Parse("bad".into()).status(), 500);
        assert_eq!(
            FunctionError::Upstream {
                status: 503,
                body: String::new()
            }
            .status(),
            500
        );
        assert_eq!(FunctionError::Config("k".into()).status(), 500);
    }

    #[test]
    fn parse_details_are_not_exposed() {
        let response = FunctionError::Parse("raw model output".into()).into_response();
        assert_eq!(response.status, 500);
        assert_eq!(response.body["error"], "Failed to parse AI response");
    }

    #[test]
    fn validation_message_is_passed_through() {
        let response = FunctionError::validation("No resume text provided").into_response();
        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"], "No resume text provided");
        assert_eq!(response.body["success"], false);
        assert_eq!(
            response.header("Access-Control-Allow-Origin"),
            Some("*")
        );
    }
}
