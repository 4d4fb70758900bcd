//! `parse-resume`: extract structured candidate data from resume text

use crate::error::{FunctionError, Result};
use crate::fence::parse_reply;
use crate::gateway::{ChatCompletion, ChatRequest};
use crate::http::{FunctionRequest, FunctionResponse};
use crate::lenient;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Longest slice of resume text forwarded to the model
pub const MAX_RESUME_CHARS: usize = 12_000;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRequest {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedResume {
    #[serde(deserialize_with = "lenient::vec_or_default")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub experience_years: Option<f64>,
    pub experience_level: Option<String>,
    pub current_title: Option<String>,
    pub current_company: Option<String>,
    #[serde(deserialize_with = "lenient::vec_or_default")]
    pub education: Vec<Education>,
    pub compensation_expectations: Option<Compensation>,
    pub summary: Option<String>,
}

/// Models return education either as plain lines or as records
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Education {
    Text(String),
    Detailed {
        #[serde(default)]
        degree: Option<String>,
        #[serde(default)]
        institution: Option<String>,
        #[serde(default)]
        year: Option<serde_json::Value>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Compensation {
    #[serde(deserialize_with = "lenient::optional_number")]
    pub min_salary: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub max_salary: Option<f64>,
    pub currency: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are an expert resume parser for a recruitment platform. \
Extract structured information from the resume and respond with a single JSON object only.";

fn prompt(text: &str) -> String {
    format!(
        "Parse this resume and return JSON with exactly these fields:\n\
         - skills: array of technical and soft skills\n\
         - experienceYears: total years of professional experience (number)\n\
         - experienceLevel: one of \"entry\", \"mid\", \"senior\", \"lead\", \"executive\"\n\
         - currentTitle: most recent job title\n\
         - currentCompany: most recent employer\n\
         - education: array of {{degree, institution, year}}\n\
         - compensationExpectations: {{minSalary, maxSalary, currency}} if stated, otherwise null\n\
         - summary: two sentence professional summary\n\n\
         Resume:\n{text}"
    )
}

/// Cut at a char boundary so multi-byte text never splits
fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Validate, ask the model, and parse its reply
pub async fn parse<G: ChatCompletion>(request: &ResumeRequest, gateway: &G) -> Result<ParsedResume> {
    let text = request
        .resume_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FunctionError::validation("No resume text provided"))?;

    tracing::debug!(
        chars = text.chars().count(),
        file = request.file_name.as_deref().unwrap_or("-"),
        "parsing resume"
    );

    let reply = gateway
        .complete(&ChatRequest::json(
            SYSTEM_PROMPT,
            prompt(truncate(text, MAX_RESUME_CHARS)),
        ))
        .await?;
    parse_reply(&reply)
}

pub async fn handle<G: ChatCompletion>(request: &FunctionRequest, gateway: &G) -> FunctionResponse {
    if request.is_preflight() {
        return FunctionResponse::preflight();
    }

    let result = async {
        let body: ResumeRequest = request.json()?;
        let data = parse(&body, gateway).await?;
        Ok::<_, FunctionError>(json!({
            "success": true,
            "data": data,
            "fileName": body.file_name,
        }))
    }
    .await;

    match result {
        Ok(body) => FunctionResponse::ok(body),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn lenient_resume_fields() {
        let reply = r#"{
            "skills": ["Rust", "SQL"],
            "experienceYears": "7",
            "education": ["BSc Computer Science", {"degree": "MSc", "institution": "UCL", "year": 2015}],
            "compensationExpectations": {"minSalary": "80,000", "maxSalary": 95000, "currency": "GBP"}
        }"#;
        let parsed: ParsedResume = serde_json::from_str(reply).unwrap();
        assert_eq!(parsed.experience_years, Some(7.0));
        assert_eq!(parsed.education.len(), 2);
        assert!(matches!(parsed.education[0], Education::Text(_)));
        let comp = parsed.compensation_expectations.unwrap();
        assert_eq!(comp.min_salary, Some(80000.0));
        assert_eq!(parsed.current_title, None);
    }

    #[test]
    fn null_lists_are_empty() {
        let reply = r#"{"skills": null, "experienceYears": 3, "education": null, "summary": "Backend developer"}"#;
        let parsed: ParsedResume = serde_json::from_str(reply).unwrap();
        assert!(parsed.skills.is_empty());
        assert!(parsed.education.is_empty());
        assert_eq!(parsed.experience_years, Some(3.0));
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(ParsedResume {
            current_title: Some("Engineer".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(value["currentTitle"], "Engineer");
        assert!(value.get("experienceYears").is_some());
    }
}
