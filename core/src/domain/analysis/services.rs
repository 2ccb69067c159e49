use tracing::{debug, instrument};

use crate::domain::{
    analysis::{
        entities::AnalysisResult,
        helpers::{decode_assessment, parse_ingredients},
        ports::{AnalysisService, LLMClient},
        prompt::{SYSTEM_PROMPT, build_analysis_prompt},
        value_objects::{AnalyzeIngredientsInput, ChatMessage},
    },
    common::{entities::app_errors::CoreError, services::Service},
    history::ports::HistoryRepository,
};

/// Runs one label through the model. Shared by the server and the client session.
#[instrument(skip_all, fields(text_len = input.ingredients_text.len()))]
pub async fn run_analysis<LLM>(
    llm_client: &LLM,
    input: AnalyzeIngredientsInput,
) -> Result<AnalysisResult, CoreError>
where
    LLM: LLMClient,
{
    // 1. Split the label text
    let ingredients = parse_ingredients(&input.ingredients_text);

    // 2. Build prompt
    let prompt = build_analysis_prompt(&ingredients, input.profile.as_ref());

    // 3. Call LLM
    let reply = llm_client
        .chat_completion(vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)])
        .await?;

    // 4. Decode the reply into a typed assessment
    let assessment = decode_assessment(&reply)?;

    let result = AnalysisResult::new(
        ingredients,
        assessment,
        input.image_url.unwrap_or_default(),
        input.user_id,
    );

    debug!(
        id = %result.id,
        is_healthy = result.is_healthy,
        concerns = result.concerns.len(),
        "label analyzed"
    );

    Ok(result)
}

impl<H, LLM> AnalysisService for Service<H, LLM>
where
    H: HistoryRepository,
    LLM: LLMClient,
{
    async fn analyze_ingredients(
        &self,
        input: AnalyzeIngredientsInput,
    ) -> Result<AnalysisResult, CoreError> {
        run_analysis(&self.llm_client, input).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::{analysis::value_objects::ChatRole, profile::entities::BabyProfile};

    /// Replies with a fixed text and records the prompts it received.
    #[derive(Clone, Default)]
    pub(crate) struct CannedLLMClient {
        pub reply: String,
        pub fail_with: Option<CoreError>,
        pub received: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    }

    impl CannedLLMClient {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                ..Default::default()
            }
        }
    }

    impl LLMClient for CannedLLMClient {
        async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String, CoreError> {
            self.received.lock().unwrap().push(messages);
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(self.reply.clone()),
            }
        }
    }

    pub(crate) const WHEAT_TODDLER_REPLY: &str = r#"Sure! Here is my assessment:
{
  "concerns": [
    {"ingredient": "sugar", "reason": "Added sugars should be avoided under 2 years.",
     "citations": [{"title": "Added Sugars and Cardiovascular Disease Risk in Children", "source": "American Heart Association", "url": "https://www.ahajournals.org/doi/full/10.1161/CIR.0000000000000439"}]},
    {"ingredient": "wheat flour", "reason": "Contains wheat which is on your baby's allergy list.", "citations": []},
    {"ingredient": "salt", "reason": "Toddler kidneys are still developing.",
     "citations": [{"title": "Salt Intake in Children and Adolescents", "source": "American Heart Association"}]}
  ],
  "nutritionalInfo": {"calories": 110, "sugars": "9 g", "additionalInfo": "High in added sugar."},
  "alternatives": [{"original": "sugar", "suggestion": "Fruit puree", "benefits": "Fiber and nutrients."}],
  "isHealthy": false
}"#;

    fn input(text: &str, profile: BabyProfile) -> AnalyzeIngredientsInput {
        AnalyzeIngredientsInput {
            ingredients_text: text.to_string(),
            profile: Some(profile.into()),
            image_url: None,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_wheat_allergy_scenario() {
        let llm = CannedLLMClient::replying(WHEAT_TODDLER_REPLY);
        let profile = BabyProfile {
            age_months: 18,
            allergies: vec!["wheat".to_string()],
        };

        let result = run_analysis(&llm, input("sugar, wheat flour, salt", profile))
            .await
            .unwrap();

        assert_eq!(result.ingredients, vec!["sugar", "wheat flour", "salt"]);
        assert!(!result.is_healthy);
        assert_eq!(result.concerns.len(), 3);
        assert!(
            result
                .concerns
                .iter()
                .any(|c| c.ingredient == "wheat flour" && c.reason.contains("allergy"))
        );
        assert!(
            result
                .concerns
                .iter()
                .filter(|c| c.ingredient == "sugar" || c.ingredient == "salt")
                .all(|c| !c.citations.is_empty())
        );
        assert_eq!(result.nutritional_info.sugars, Some(9.0));
        assert_eq!(result.image_url, "");

        let received = llm.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0][0].role, ChatRole::System);
        assert!(received[0][1].content.contains("Allergies: wheat"));
    }

    #[tokio::test]
    async fn test_clean_label_scenario() {
        let llm = CannedLLMClient::replying(
            r#"{"concerns": [], "nutritionalInfo": {}, "alternatives": [], "isHealthy": true}"#,
        );
        let profile = BabyProfile {
            age_months: 24,
            allergies: vec![],
        };

        let result = run_analysis(&llm, input("Organic apples, water", profile))
            .await
            .unwrap();

        assert!(result.is_healthy);
        assert!(result.concerns.is_empty());
        assert!(result.alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_reply_without_json_is_a_format_error() {
        let llm = CannedLLMClient::replying("Sorry, I can't help with that.");

        let err = run_analysis(&llm, input("sugar", BabyProfile::default()))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ResponseFormatError(_)));
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let llm = CannedLLMClient {
            fail_with: Some(CoreError::UpstreamRequestError("503".to_string())),
            ..Default::default()
        };

        let err = run_analysis(&llm, input("sugar", BabyProfile::default()))
            .await
            .unwrap_err();

        assert_eq!(err, CoreError::UpstreamRequestError("503".to_string()));
    }

    #[tokio::test]
    async fn test_each_analysis_gets_a_fresh_id() {
        let llm = CannedLLMClient::replying("{}");

        let first = run_analysis(&llm, input("rice", BabyProfile::default()))
            .await
            .unwrap();
        let second = run_analysis(&llm, input("rice", BabyProfile::default()))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
    }
}
