use tracing::error;

use crate::domain::{
    analysis::entities::HealthAssessment, common::entities::app_errors::CoreError,
};

/// Split a label's ingredient text on commas, semicolons and newlines.
pub fn parse_ingredients(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns the slice from the first `{` to the last `}` of a model reply.
pub fn extract_json_object(reply: &str) -> Result<&str, CoreError> {
    let start = reply.find('{');
    let end = reply.rfind('}');

    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&reply[start..=end]),
        _ => Err(CoreError::ResponseFormatError(
            "no JSON object found in LLM reply".to_string(),
        )),
    }
}

pub fn decode_assessment(reply: &str) -> Result<HealthAssessment, CoreError> {
    let raw = extract_json_object(reply)?;

    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
        error!("Failed to parse LLM response: {}", e);
        CoreError::ResponseFormatError(e.to_string())
    })?;

    serde_json::from_value(value).map_err(|e| {
        error!("LLM response does not match the assessment shape: {}", e);
        CoreError::ResponseFormatError(e.to_string())
    })
}
