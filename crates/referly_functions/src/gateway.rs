//! Chat-completion gateway client
//!
//! [`ChatCompletion`] is the seam the handlers are written against;
//! [`HttpGateway`] is the production implementation speaking the
//! OpenAI-compatible `/chat/completions` protocol. Every call is a single
//! attempt: rate-limit and quota answers are surfaced, never retried.

use crate::config::GatewayConfig;
use crate::error::{FunctionError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A completion request, independent of model and transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Ask for `response_format: {"type": "json_object"}`
    pub json_reply: bool,
}

impl ChatRequest {
    /// System + user prompt expecting a JSON object back
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            json_reply: true,
        }
    }
}

/// Anything that can answer a [`ChatRequest`] with the reply text
pub trait ChatCompletion: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// reqwest-backed gateway
#[derive(Clone, Debug)]
pub struct HttpGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl ChatCompletion for HttpGateway {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| FunctionError::Config("AI gateway API key is not configured".into()))?;

        let body = WireRequest {
            model: &self.config.model,
            messages: &request.messages,
            response_format: request.json_reply.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let url = self.config.completions_url();
        tracing::debug!(%url, model = %self.config.model, "calling AI gateway");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        // Limits are reported without touching the body
        match status {
            429 => return Err(FunctionError::RateLimited),
            402 => return Err(FunctionError::QuotaExhausted),
            _ => {}
        }

        let text = response.text().await?;
        if !(200..300).contains(&status) {
            tracing::error!(status, body = %text, "AI gateway error");
            return Err(FunctionError::Upstream { status, body: text });
        }

        extract_content(&text)
    }
}

/// Pull `choices[0].message.content` out of a completion body
pub(crate) fn extract_content(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        tracing::error!(raw = %body, error = %e, "AI gateway body is not JSON");
        FunctionError::Parse(e.to_string())
    })?;

    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::error!(raw = %body, "AI gateway reply has no message content");
            FunctionError::Parse("no message content in AI response".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format() {
        let request = ChatRequest::json("be terse", "hello");
        let wire = WireRequest {
            model: "m",
            messages: &request.messages,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };
        assert_eq!(
            serde_json::to_value(&wire).unwrap(),
            json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "be terse"},
                    {"role": "user", "content": "hello"}
                ],
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn content_extraction() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"a\":1}"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), r#"{"a":1}"#);

        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(FunctionError::Parse(_))
        ));
        assert!(matches!(
            extract_content("<html>"),
            Err(FunctionError::Parse(_))
        ));
    }

    #[test]
    fn missing_key_fails_at_call_time() {
        let gateway = HttpGateway::new(GatewayConfig::default()).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let err = runtime
            .block_on(gateway.complete(&ChatRequest::json("s", "u")))
            .unwrap_err();
        assert!(matches!(err, FunctionError::Config(_)));
        assert_eq!(err.status(), 500);
    }
}
