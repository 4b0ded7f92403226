//! Locate the JSON object inside free-form generator output.
//!
//! Generators wrap their answer in markdown fences or add a sentence before
//! and after it. We strip a leading ```` ```json ```` fence and its closing
//! fence, then slice from the first `{` to the last `}`.

use regex::Regex;

use itinera_core::{EngineError, Result};

pub fn extract_json_object(raw: &str) -> Result<&str> {
    let mut text = raw.trim();

    if text.starts_with("```") {
        let open = Regex::new(r"(?i)^```(?:json)?[ \t]*\r?\n?")
            .map_err(|e| EngineError::structural(format!("fence pattern: {e}")))?;
        if let Some(m) = open.find(text) {
            text = &text[m.end()..];
        }
        let trimmed = text.trim_end();
        text = trimmed.strip_suffix("```").unwrap_or(trimmed).trim();
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&text[start..=end]),
        _ => Err(EngineError::structural("generator output contains no JSON object")),
    }
}
