use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrStatus {
    LoadingLanguage,
    RecognizingText,
}

impl OcrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrStatus::LoadingLanguage => "loading language",
            OcrStatus::RecognizingText => "recognizing text",
        }
    }
}

/// A progress event; `progress` is a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OcrProgress {
    pub status: OcrStatus,
    pub progress: f32,
}

impl OcrProgress {
    pub fn new(status: OcrStatus, progress: f32) -> Self {
        Self {
            status,
            progress: progress.clamp(0.0, 1.0),
        }
    }
}
