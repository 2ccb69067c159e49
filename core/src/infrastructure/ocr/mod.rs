pub mod tesseract;

pub use tesseract::TesseractRecognizer;
