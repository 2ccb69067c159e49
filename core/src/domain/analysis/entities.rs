use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de};
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::common::{generate_timestamp, generate_uuid_v4};

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?)")
        .expect("valid leading number regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<String>,
    pub is_healthy: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub concerns: Vec<Concern>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nutritional_info: NutritionalInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl AnalysisResult {
    pub fn new(
        ingredients: Vec<String>,
        assessment: HealthAssessment,
        image_url: String,
        user_id: Option<String>,
    ) -> Self {
        let is_healthy = assessment.verdict();

        Self {
            id: generate_uuid_v4(),
            timestamp: generate_timestamp(),
            image_url,
            ingredients,
            is_healthy,
            concerns: assessment.concerns,
            nutritional_info: assessment.nutritional_info,
            alternatives: assessment.alternatives,
            user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Concern {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredient: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Citation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Every figure is optional: the model is free to omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutritionalInfo {
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbs: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sugars: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub fat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sodium: Option<f64>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Alternative {
    #[serde(default, deserialize_with = "null_as_default")]
    pub original: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub benefits: String,
}

/// The part of an [`AnalysisResult`] the language model supplies.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAssessment {
    #[serde(default)]
    pub is_healthy: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub concerns: Vec<Concern>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nutritional_info: NutritionalInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alternatives: Vec<Alternative>,
}

impl HealthAssessment {
    /// The model's verdict, or `concerns.is_empty()` when it gave none.
    /// A verdict contradicting the concern list is kept as given.
    pub fn verdict(&self) -> bool {
        match self.is_healthy {
            Some(verdict) => {
                if verdict != self.concerns.is_empty() {
                    warn!(
                        is_healthy = verdict,
                        concerns = self.concerns.len(),
                        "LLM verdict disagrees with its concern list"
                    );
                }
                verdict
            }
            None => self.concerns.is_empty(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `120`, `"120"` or `"120 kcal"`; a string without a leading number
/// reads as absent. Booleans, arrays and objects are rejected.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(number)) => Ok(number.as_f64()),
        Some(serde_json::Value::String(text)) => Ok(LEADING_NUMBER
            .captures(&text)
            .and_then(|captures| captures.get(1))
            .and_then(|m| m.as_str().parse().ok())),
        Some(other) => Err(de::Error::invalid_type(
            unexpected(&other),
            &"a number or a numeric string",
        )),
    }
}

fn unexpected(value: &serde_json::Value) -> de::Unexpected<'_> {
    match value {
        serde_json::Value::Bool(b) => de::Unexpected::Bool(*b),
        serde_json::Value::Array(_) => de::Unexpected::Seq,
        _ => de::Unexpected::Map,
    }
}
