use crate::domain::profile::entities::ProfileHint;

pub const SYSTEM_PROMPT: &str = "You are a helpful pediatric nutrition assistant.";

const RESPONSE_SHAPE: &str = "{ concerns: [ { ingredient, reason, citations: [ { title, source, url } ] } ], nutritionalInfo: { calories, protein, carbs, sugars, fat, sodium, additionalInfo }, alternatives: [ { original, suggestion, benefits } ], isHealthy: boolean }";

/// Builds the user prompt for one label.
pub fn build_analysis_prompt(ingredients: &[String], profile: Option<&ProfileHint>) -> String {
    let age = profile
        .and_then(|p| p.age)
        .map(|age| age.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let allergies = profile
        .filter(|p| !p.allergies.is_empty())
        .map(|p| p.allergies.join(", "))
        .unwrap_or_else(|| "None".to_string());

    format!(
        "You are a pediatric nutrition expert. Given the following food ingredients, analyze if this food is healthy for a toddler aged 1-3 years. \
For each ingredient, check for health concerns based on current medical guidelines and cite at least one reputable source (medical journal, WHO, AAP, PubMed, etc.) for each flagged ingredient. \
Summarize your reasoning and provide a final verdict with citations.\n\n\
Ingredients: {}\n\
Baby's age: {} months\n\
Allergies: {}\n\n\
Format your answer as JSON with this structure:\n{}",
        ingredients.join(", "),
        age,
        allergies,
        RESPONSE_SHAPE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::entities::BabyProfile;

    #[test]
    fn test_prompt_embeds_profile() {
        let profile = ProfileHint::from(BabyProfile {
            age_months: 18,
            allergies: vec!["wheat".to_string(), "egg".to_string()],
        });
        let prompt = build_analysis_prompt(
            &["sugar".to_string(), "wheat flour".to_string()],
            Some(&profile),
        );

        assert!(
            prompt.contains("final verdict with citations.\n\nIngredients: sugar, wheat flour\n")
        );
        assert!(prompt.contains("Baby's age: 18 months\n"));
        assert!(prompt.contains("Allergies: wheat, egg\n"));
        assert!(prompt.ends_with(RESPONSE_SHAPE));
    }

    #[test]
    fn test_prompt_without_allergies() {
        let default_profile = ProfileHint::from(BabyProfile::default());
        let prompt = build_analysis_prompt(&["water".to_string()], Some(&default_profile));
        assert!(prompt.contains("Allergies: None\n"));

        let prompt = build_analysis_prompt(&[], None);
        assert!(prompt.contains("Baby's age: unknown months"));

        let allergies_only = ProfileHint {
            age: None,
            allergies: vec!["wheat".to_string()],
        };
        let prompt = build_analysis_prompt(&["flour".to_string()], Some(&allergies_only));
        assert!(prompt.contains("Baby's age: unknown months\nAllergies: wheat\n"));
    }
}
