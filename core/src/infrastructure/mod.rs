pub mod db;
pub mod history;
pub mod llm;
pub mod ocr;
pub mod profile;
