//! `salary-intelligence`: market comparison for a role and location
//!
//! The model's numbers are taken as given, but its reply is normalized
//! before it leaves: percentile is clamped, status is one of three
//! values and agrees with the numbers when the model left it out, and
//! difference is always present.

use crate::error::{FunctionError, Result};
use crate::fence::parse_reply;
use crate::gateway::{ChatCompletion, ChatRequest};
use crate::http::{FunctionRequest, FunctionResponse};
use crate::lenient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative band counted as "at" market
pub const AT_MARKET_TOLERANCE: f64 = 0.05;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SalaryRequest {
    pub job_title: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub years_experience: Option<f64>,
    pub industry: Option<String>,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub current_salary: Option<f64>,
    pub company_size: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryStatus {
    Above,
    Below,
    At,
}

impl SalaryStatus {
    /// Read a model-written status ("Above market", "below", "at market rate")
    pub fn parse_loose(text: &str) -> Option<Self> {
        let text = text.trim().to_ascii_lowercase();
        if text.starts_with("above") {
            Some(SalaryStatus::Above)
        } else if text.starts_with("below") {
            Some(SalaryStatus::Below)
        } else if text == "at" || text.starts_with("at ") || text == "average" || text == "market" {
            Some(SalaryStatus::At)
        } else {
            None
        }
    }

    /// Compare a salary against the market average
    pub fn compare(current: f64, market: f64) -> Self {
        if market.abs() < f64::EPSILON {
            return if current > 0.0 {
                SalaryStatus::Above
            } else {
                SalaryStatus::At
            };
        }
        let relative = (current - market) / market.abs();
        if relative > AT_MARKET_TOLERANCE {
            SalaryStatus::Above
        } else if relative < -AT_MARKET_TOLERANCE {
            SalaryStatus::Below
        } else {
            SalaryStatus::At
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SalaryStatus::Above => "above",
            SalaryStatus::Below => "below",
            SalaryStatus::At => "at",
        }
    }
}

impl fmt::Display for SalaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response body
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryInsights {
    pub current_salary: Option<f64>,
    pub market_average: f64,
    pub percentile: f64,
    pub status: SalaryStatus,
    pub difference: f64,
    pub industry_insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// The reply as the model wrote it
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawInsights {
    #[serde(deserialize_with = "lenient::optional_number")]
    current_salary: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_number")]
    market_average: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_number")]
    percentile: Option<f64>,
    status: Option<String>,
    #[serde(deserialize_with = "lenient::optional_number")]
    difference: Option<f64>,
    #[serde(deserialize_with = "lenient::vec_or_default")]
    industry_insights: Vec<String>,
    #[serde(deserialize_with = "lenient::vec_or_default")]
    recommendations: Vec<String>,
}

impl SalaryInsights {
    /// Normalize a raw model reply. Fails only when there is no market average.
    fn from_raw(raw: RawInsights, request: &SalaryRequest) -> Result<Self> {
        let market_average = raw
            .market_average
            .ok_or_else(|| FunctionError::Parse("reply has no marketAverage".into()))?;
        let current_salary = request.current_salary.or(raw.current_salary);

        let derived = current_salary.map(|current| SalaryStatus::compare(current, market_average));
        let status = raw
            .status
            .as_deref()
            .and_then(SalaryStatus::parse_loose)
            .or(derived)
            .unwrap_or(SalaryStatus::At);

        let difference = raw
            .difference
            .or_else(|| current_salary.map(|current| current - market_average))
            .unwrap_or(0.0);

        let percentile = match raw.percentile {
            Some(p) => {
                if !(0.0..=100.0).contains(&p) {
                    tracing::warn!(percentile = p, "clamping out-of-range percentile");
                }
                p.clamp(0.0, 100.0)
            }
            None => 50.0,
        };

        Ok(Self {
            current_salary,
            market_average,
            percentile,
            status,
            difference,
            industry_insights: raw.industry_insights,
            recommendations: raw.recommendations,
        })
    }
}

const SYSTEM_PROMPT: &str = "You are a compensation analyst with current knowledge of salary \
markets. Respond with a single JSON object only.";

fn field(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or("not specified")
}

fn number_field(value: Option<f64>) -> String {
    value.map_or_else(|| "not specified".to_string(), |n| n.to_string())
}

fn prompt(request: &SalaryRequest) -> String {
    format!(
        "Analyze the salary position of this professional:\n\
         - Job title: {}\n\
         - Location: {}\n\
         - Years of experience: {}\n\
         - Industry: {}\n\
         - Current salary: {}\n\
         - Company size: {}\n\n\
         Return JSON with these fields:\n\
         - currentSalary: number\n\
         - marketAverage: market average salary for this profile (number)\n\
         - percentile: where the current salary sits in the market, 0-100\n\
         - status: \"above\", \"below\" or \"at\" market\n\
         - difference: currentSalary minus marketAverage\n\
         - industryInsights: array of 3-4 short market observations\n\
         - recommendations: array of 3-4 actionable recommendations",
        field(&request.job_title),
        field(&request.location),
        number_field(request.years_experience),
        field(&request.industry),
        number_field(request.current_salary),
        field(&request.company_size),
    )
}

pub async fn analyze<G: ChatCompletion>(request: &SalaryRequest, gateway: &G) -> Result<SalaryInsights> {
    tracing::debug!(
        title = field(&request.job_title),
        location = field(&request.location),
        "requesting salary insights"
    );
    let reply = gateway
        .complete(&ChatRequest::json(SYSTEM_PROMPT, prompt(request)))
        .await?;
    let raw: RawInsights = parse_reply(&reply)?;
    SalaryInsights::from_raw(raw, request)
}

pub async fn handle<G: ChatCompletion>(request: &FunctionRequest, gateway: &G) -> FunctionResponse {
    if request.is_preflight() {
        return FunctionResponse::preflight();
    }

    let result = async {
        let body: SalaryRequest = request.json()?;
        let insights = analyze(&body, gateway).await?;
        serde_json::to_value(insights).map_err(|e| FunctionError::Internal(e.to_string()))
    }
    .await;

    match result {
        Ok(body) => FunctionResponse::ok(body),
        Err(e) => e.into_response(),
    }
}
