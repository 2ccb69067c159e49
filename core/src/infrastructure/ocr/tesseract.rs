use std::process::Stdio;

use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, error};

use crate::domain::{
    common::{OcrConfig, entities::app_errors::CoreError},
    ocr::{
        entities::{OcrProgress, OcrStatus},
        ports::TextRecognizer,
    },
};

/// Runs the `tesseract` executable on image bytes piped through stdin.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    config: OcrConfig,
}

impl TesseractRecognizer {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }
}

impl TextRecognizer for TesseractRecognizer {
    async fn recognize<F>(&self, image: Vec<u8>, on_progress: F) -> Result<String, CoreError>
    where
        F: Fn(OcrProgress) + Send + Sync,
    {
        on_progress(OcrProgress::new(OcrStatus::LoadingLanguage, 0.0));

        let mut child = Command::new(&self.config.binary)
            .args(["stdin", "stdout", "-l", self.config.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                error!("Failed to start {}: {}", self.config.binary.display(), e);
                CoreError::OcrError(format!("failed to start OCR engine: {}", e))
            })?;

        on_progress(OcrProgress::new(OcrStatus::LoadingLanguage, 1.0));
        on_progress(OcrProgress::new(OcrStatus::RecognizingText, 0.0));

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CoreError::OcrError("OCR engine stdin unavailable".to_string()))?;
        stdin
            .write_all(&image)
            .await
            .map_err(|e| CoreError::OcrError(format!("failed to send image: {}", e)))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CoreError::OcrError(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("OCR engine exited with {}: {}", output.status, stderr.trim());
            return Err(CoreError::OcrError(format!(
                "OCR engine exited with {}",
                output.status
            )));
        }

        on_progress(OcrProgress::new(OcrStatus::RecognizingText, 1.0));

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "OCR finished");

        Ok(text)
    }
}
