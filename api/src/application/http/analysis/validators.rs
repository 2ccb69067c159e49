use nutritot_core::domain::{
    analysis::value_objects::AnalyzeIngredientsInput, profile::entities::ProfileHint,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Raw label text, split on commas, semicolons and newlines
    #[schema(example = "sugar, wheat flour, salt")]
    pub ingredients_text: String,
    /// Used as given; a profile that is not an object is ignored
    #[serde(default, deserialize_with = "any_profile")]
    pub baby_profile: Option<ProfileHint>,
    pub image_url: Option<String>,
    pub user_id: Option<String>,
}

impl From<AnalyzeRequest> for AnalyzeIngredientsInput {
    fn from(request: AnalyzeRequest) -> Self {
        Self {
            ingredients_text: request.ingredients_text,
            profile: request.baby_profile,
            image_url: request.image_url,
            user_id: request.user_id,
        }
    }
}

fn any_profile<'de, D>(deserializer: D) -> Result<Option<ProfileHint>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(|value| serde_json::from_value(value).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_camel_case_body() {
        let request: AnalyzeRequest = serde_json::from_value(json!({
            "ingredientsText": "sugar, salt",
            "babyProfile": { "age": 18, "allergies": ["wheat"] },
            "userId": "parent-1"
        }))
        .unwrap();

        let input = AnalyzeIngredientsInput::from(request);
        assert_eq!(input.ingredients_text, "sugar, salt");
        assert_eq!(input.profile.unwrap().age, Some(18));
        assert_eq!(input.user_id.as_deref(), Some("parent-1"));
        assert!(input.image_url.is_none());
    }

    #[test]
    fn partial_or_odd_profiles_still_decode() {
        let request: AnalyzeRequest = serde_json::from_value(json!({
            "ingredientsText": "oats",
            "babyProfile": { "allergies": ["wheat"] }
        }))
        .unwrap();
        let profile = request.baby_profile.unwrap();
        assert_eq!(profile.age, None);
        assert_eq!(profile.allergies, vec!["wheat"]);

        let request: AnalyzeRequest = serde_json::from_value(json!({
            "ingredientsText": "oats",
            "babyProfile": "toddler"
        }))
        .unwrap();
        assert!(request.baby_profile.is_none());

        let request: AnalyzeRequest = serde_json::from_value(json!({
            "ingredientsText": "oats",
            "babyProfile": { "age": "two", "allergies": null }
        }))
        .unwrap();
        assert_eq!(request.baby_profile, Some(ProfileHint::default()));
    }
}
