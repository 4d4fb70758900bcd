//! `linkedin-import`: accept a profile the client already scraped, or
//! validate a profile URL and ask for manual entry
//!
//! LinkedIn offers no public profile API, so a bare URL cannot be
//! resolved server-side.

use crate::error::{FunctionError, Result};
use crate::http::{FunctionRequest, FunctionResponse};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

pub const MANUAL_ENTRY_MESSAGE: &str =
    "LinkedIn profile data cannot be fetched automatically. Please fill in your details manually.";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedinRequest {
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub profile_data: Option<Value>,
}

/// Outcome of an import
#[derive(Clone, Debug, PartialEq)]
pub enum Import {
    /// Client-supplied profile, passed through untouched
    Profile(Map<String, Value>),
    /// Valid URL; the user has to type their details in
    ManualEntry { linkedin_url: String },
}

fn profile_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://(www\.)?linkedin\.com/in/[\w-]+/?$")
            .expect("Invalid regex pattern")
    })
}

pub fn is_profile_url(url: &str) -> bool {
    profile_url_pattern().is_match(url)
}

pub fn import(request: LinkedinRequest) -> Result<Import> {
    match request.profile_data {
        Some(Value::Object(profile)) => return Ok(Import::Profile(profile)),
        Some(Value::Null) | None => {}
        Some(_) => return Err(FunctionError::validation("profileData must be an object")),
    }

    let url = request
        .linkedin_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| FunctionError::validation("LinkedIn URL or profile data is required"))?;

    if !is_profile_url(&url) {
        return Err(FunctionError::validation("Invalid LinkedIn URL format"));
    }

    Ok(Import::ManualEntry { linkedin_url: url })
}

pub async fn handle(request: &FunctionRequest) -> FunctionResponse {
    if request.is_preflight() {
        return FunctionResponse::preflight();
    }

    let result = request.json::<LinkedinRequest>().and_then(import);
    match result {
        Ok(Import::Profile(profile)) => FunctionResponse::ok(json!({
            "success": true,
            "data": profile,
        })),
        Ok(Import::ManualEntry { linkedin_url }) => {
            tracing::debug!(%linkedin_url, "LinkedIn URL needs manual entry");
            FunctionResponse::ok(json!({
                "success": true,
                "requiresManualEntry": true,
                "message": MANUAL_ENTRY_MESSAGE,
                "linkedinUrl": linkedin_url,
            }))
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_pattern() {
        assert!(is_profile_url("https://www.linkedin.com/in/jane-doe"));
        assert!(is_profile_url("http://linkedin.com/in/jane_doe_42/"));
        assert!(!is_profile_url("https://example.com/in/x"));
        assert!(!is_profile_url("https://linkedin.com/company/acme"));
        assert!(!is_profile_url("https://www.linkedin.com/in/jane/posts"));
    }

    #[test]
    fn profile_wins_over_url() {
        let request = LinkedinRequest {
            linkedin_url: Some("not a url".into()),
            profile_data: Some(json!({"name": "Jane"})),
        };
        match import(request).unwrap() {
            Import::Profile(profile) => assert_eq!(profile["name"], "Jane"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejections() {
        assert_eq!(import(LinkedinRequest::default()).unwrap_err().status(), 400);
        let scalar = LinkedinRequest {
            profile_data: Some(json!("Jane")),
            ..Default::default()
        };
        assert_eq!(import(scalar).unwrap_err().status(), 400);
    }
}
