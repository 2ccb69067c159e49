pub mod analysis;
pub mod common;
pub mod history;
pub mod ocr;
pub mod profile;
pub mod session;
