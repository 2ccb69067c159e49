use std::sync::Arc;

use crate::domain::{
    analysis::ports::LLMClient,
    history::{outbox::HistoryOutbox, ports::HistoryRepository},
};

/// Server-side service; the port traits are implemented on it per domain.
pub struct Service<H, LLM>
where
    H: HistoryRepository,
    LLM: LLMClient,
{
    pub(crate) history_repository: Arc<H>,
    pub(crate) llm_client: LLM,
    pub(crate) outbox: HistoryOutbox,
}

impl<H, LLM> Service<H, LLM>
where
    H: HistoryRepository,
    LLM: LLMClient,
{
    pub fn new(history_repository: Arc<H>, llm_client: LLM, outbox: HistoryOutbox) -> Self {
        Self {
            history_repository,
            llm_client,
            outbox,
        }
    }

    pub fn outbox(&self) -> &HistoryOutbox {
        &self.outbox
    }
}

impl<H, LLM> Clone for Service<H, LLM>
where
    H: HistoryRepository,
    LLM: LLMClient + Clone,
{
    fn clone(&self) -> Self {
        Self {
            history_repository: Arc::clone(&self.history_repository),
            llm_client: self.llm_client.clone(),
            outbox: self.outbox.clone(),
        }
    }
}
