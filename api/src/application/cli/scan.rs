use std::path::Path;

use anyhow::Context;
use base64::{Engine, engine::general_purpose::STANDARD};
use nutritot_core::{
    domain::{common::OcrConfig, ocr::entities::OcrProgress, session::services::ClientSession},
    infrastructure::{
        history::HttpHistoryGateway, llm::AzureOpenAIClient, ocr::TesseractRecognizer,
        profile::FileProfileStore,
    },
};
use tracing::info;

use crate::args::ScanArgs;

/// Content type guessed from the file extension.
fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Inline `data:` URI stored with the result as its image reference.
pub fn data_uri(path: &Path, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type(path), STANDARD.encode(bytes))
}

fn report_progress(progress: OcrProgress) {
    eprintln!(
        "{}: {:>3.0}%",
        progress.status.as_str(),
        progress.progress * 100.0
    );
}

pub async fn run(args: ScanArgs) -> Result<(), anyhow::Error> {
    let image = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let image_url = data_uri(&args.image, &image);

    let mut session = ClientSession::open(
        FileProfileStore::new(&args.client.profile_dir),
        TesseractRecognizer::new(OcrConfig::from(&args)),
        AzureOpenAIClient::new(args.llm.clone().into())?,
        HttpHistoryGateway::new(&args.client.server_url)?,
    )?;

    info!(
        age = %session.profile().age_description(),
        allergies = ?session.profile().allergies,
        "Analyzing label"
    );

    let result = session
        .scan(image, image_url, args.user_id.clone(), report_progress)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    info!(saved = session.history().len(), "History refreshed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn data_uri_uses_extension_mime_type() {
        let uri = data_uri(&PathBuf::from("label.JPG"), b"abc");

        assert_eq!(uri, "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        assert_eq!(mime_type(Path::new("label")), "application/octet-stream");
        assert_eq!(mime_type(Path::new("label.png")), "image/png");
    }
}
