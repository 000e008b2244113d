pub mod ingest;
pub mod oracle;

pub use ingest::{format_bytes, read_document, read_documents, ReadError};
pub use oracle::OpenAiOracleAdapter;
