//! Markdown fence stripping
//!
//! Models asked for JSON often wrap it in a fenced code block anyway
//! (```` ```json ... ``` ````). These helpers peel that off before parsing.

use crate::error::{FunctionError, Result};
use serde::de::DeserializeOwned;

const FENCE: &str = "```";

/// Remove a leading ```` ``` ```` / ```` ```json ```` line and a trailing
/// ```` ``` ````, plus surrounding whitespace. Unfenced text is only trimmed,
/// so applying this twice is the same as applying it once.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        body = match rest.find('\n') {
            // Drop the info string ("json", "JSON", ...) with its line
            Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
                &rest[newline + 1..]
            }
            Some(_) => rest,
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }

    if let Some(rest) = body.trim_end().strip_suffix(FENCE) {
        body = rest;
    }

    body.trim()
}

/// Strip fences and parse
pub fn parse_fenced_json<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    serde_json::from_str(strip_code_fences(text))
}

/// Parse a model reply, logging the raw text if it is not valid JSON
pub(crate) fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    parse_fenced_json(reply).map_err(|e| {
        tracing::error!(raw = %reply, error = %e, "AI reply is not the expected JSON");
        FunctionError::Parse(e.to_string())
    })
}
