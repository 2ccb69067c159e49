use std::future::Future;

use crate::domain::{common::entities::app_errors::CoreError, ocr::entities::OcrProgress};

/// Black-box text recognition over raw image bytes.
pub trait TextRecognizer: Send + Sync {
    fn recognize<F>(
        &self,
        image: Vec<u8>,
        on_progress: F,
    ) -> impl Future<Output = Result<String, CoreError>> + Send
    where
        F: Fn(OcrProgress) + Send + Sync;
}
