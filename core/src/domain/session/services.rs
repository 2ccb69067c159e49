use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    analysis::{
        entities::AnalysisResult, ports::LLMClient, services::run_analysis,
        value_objects::AnalyzeIngredientsInput,
    },
    common::entities::app_errors::CoreError,
    ocr::{entities::OcrProgress, ports::TextRecognizer},
    profile::{
        entities::{BabyProfile, ProfileHint},
        ports::ProfileStore,
    },
    session::ports::HistoryGateway,
};

/// Client state: the profile, the cached history and the result on screen.
/// Storage, OCR, the model and the history service are injected.
pub struct ClientSession<P, T, L, G> {
    profile_store: P,
    recognizer: T,
    llm_client: L,
    history_gateway: G,
    profile: BabyProfile,
    history: Vec<AnalysisResult>,
    current: Option<AnalysisResult>,
}

impl<P, T, L, G> ClientSession<P, T, L, G>
where
    P: ProfileStore,
    T: TextRecognizer,
    L: LLMClient,
    G: HistoryGateway,
{
    /// Loads the stored profile, falling back to the default one.
    pub fn open(
        profile_store: P,
        recognizer: T,
        llm_client: L,
        history_gateway: G,
    ) -> Result<Self, CoreError> {
        let profile = profile_store.load()?.unwrap_or_default();

        Ok(Self {
            profile_store,
            recognizer,
            llm_client,
            history_gateway,
            profile,
            history: Vec::new(),
            current: None,
        })
    }

    pub fn profile(&self) -> &BabyProfile {
        &self.profile
    }

    pub fn update_profile(&mut self, profile: BabyProfile) -> Result<(), CoreError> {
        self.profile_store.save(&profile)?;
        self.profile = profile;
        Ok(())
    }

    pub fn history(&self) -> &[AnalysisResult] {
        &self.history
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.current.as_ref()
    }

    /// Reloads the history cache. A failed fetch leaves it empty.
    pub async fn refresh_history(&mut self, user_id: Option<String>) {
        self.history = match self.history_gateway.fetch(user_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "Failed to fetch analysis history");
                Vec::new()
            }
        };
    }

    /// OCR, then analysis against the current profile, then recording.
    pub async fn scan<F>(
        &mut self,
        image: Vec<u8>,
        image_url: String,
        user_id: Option<String>,
        on_progress: F,
    ) -> Result<AnalysisResult, CoreError>
    where
        F: Fn(OcrProgress) + Send + Sync,
    {
        self.current = None;

        let text = self.recognizer.recognize(image, on_progress).await?;
        info!(chars = text.len(), "Label text extracted");

        let result = run_analysis(
            &self.llm_client,
            AnalyzeIngredientsInput {
                ingredients_text: text,
                profile: Some(ProfileHint::from(&self.profile)),
                image_url: Some(image_url),
                user_id,
            },
        )
        .await?;

        self.current = Some(result.clone());
        self.record(&result).await;

        Ok(result)
    }

    /// Saves a result and refreshes the cache. Failures are only logged.
    pub async fn record(&mut self, result: &AnalysisResult) {
        if let Err(e) = self.history_gateway.save(result).await {
            warn!(id = %result.id, error = %e, "Failed to save analysis result");
            return;
        }
        self.refresh_history(result.user_id.clone()).await;
    }

    pub fn select(&mut self, id: Uuid) -> Option<&AnalysisResult> {
        self.current = self.history.iter().find(|r| r.id == id).cloned();
        self.current.as_ref()
    }

    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Clears the local cache only; stored results are kept.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
