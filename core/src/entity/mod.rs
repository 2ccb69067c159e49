pub mod analysis_documents;
