use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Fixed storage key of the profile.
pub const PROFILE_KEY: &str = "baby_profile";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BabyProfile {
    /// Age in months.
    #[serde(rename = "age", alias = "ageMonths")]
    pub age_months: u32,
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl Default for BabyProfile {
    fn default() -> Self {
        Self {
            age_months: 24,
            allergies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevelopmentStage {
    Infant,
    YoungToddler,
    Toddler,
    Preschooler,
}

impl DevelopmentStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevelopmentStage::Infant => "Infant",
            DevelopmentStage::YoungToddler => "Young Toddler",
            DevelopmentStage::Toddler => "Toddler",
            DevelopmentStage::Preschooler => "Preschooler",
        }
    }
}

impl BabyProfile {
    pub fn development_stage(&self) -> DevelopmentStage {
        match self.age_months {
            0..12 => DevelopmentStage::Infant,
            12..24 => DevelopmentStage::YoungToddler,
            24..36 => DevelopmentStage::Toddler,
            _ => DevelopmentStage::Preschooler,
        }
    }

    pub fn age_description(&self) -> String {
        let years = self.age_months / 12;
        let months = self.age_months % 12;

        match (years, months) {
            (0, _) => format!("{} months", self.age_months),
            (1, 0) => "1 year".to_string(),
            (_, 0) => format!("{} years", years),
            _ => format!(
                "{} year{} and {} month{}",
                years,
                if years > 1 { "s" } else { "" },
                months,
                if months > 1 { "s" } else { "" }
            ),
        }
    }

    /// Appends a trimmed allergy; blank input is ignored.
    pub fn add_allergy(&mut self, allergy: &str) -> bool {
        let allergy = allergy.trim();
        if allergy.is_empty() {
            return false;
        }
        self.allergies.push(allergy.to_string());
        true
    }

    pub fn remove_allergy(&mut self, index: usize) -> Option<String> {
        (index < self.allergies.len()).then(|| self.allergies.remove(index))
    }
}

/// A profile as callers send it. Malformed fields read as absent instead of
/// failing the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProfileHint {
    /// Age in months.
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient_allergies")]
    pub allergies: Vec<String>,
}

impl From<&BabyProfile> for ProfileHint {
    fn from(profile: &BabyProfile) -> Self {
        Self {
            age: Some(profile.age_months),
            allergies: profile.allergies.clone(),
        }
    }
}

impl From<BabyProfile> for ProfileHint {
    fn from(profile: BabyProfile) -> Self {
        Self {
            age: Some(profile.age_months),
            allergies: profile.allergies,
        }
    }
}

/// Whole non-negative numbers, as a number or a numeric string.
fn lenient_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let age = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Some(Value::String(text)) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    Ok(age.and_then(|age| u32::try_from(age).ok()))
}

/// Keeps the string and number entries of an array; anything else is empty.
fn lenient_allergies<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
        .collect())
}
