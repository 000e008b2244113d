//! services/chat/src/adapters/ingest.rs
//!
//! The file ingestion boundary: turns paths on disk into normalized
//! `Document`s. Each file is read independently; a failure is attributed to
//! that single file and never aborts the rest of the batch.

use futures::future::join_all;
use rag_chat_core::domain::Document;
use std::path::Path;

/// A single file failed to read. Reported per-file and surfaced to the user
/// as a per-file notice.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Failed to read '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reads and normalizes one file into a `Document`.
///
/// The MIME type is guessed from the file extension; unknown extensions fall
/// through to the `text/plain` default inside the normalizer.
pub async fn read_document(path: impl AsRef<Path>) -> Result<Document, ReadError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = tokio::fs::read(path).await.map_err(|source| ReadError::Io {
        name: name.clone(),
        source,
    })?;

    let declared_mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for_extension);

    let byte_size = bytes.len() as u64;
    Ok(Document::from_bytes(&name, declared_mime, &bytes, byte_size))
}

/// Reads a batch of files concurrently. The returned vector preserves input
/// order; each entry settles to a `Document` or its own `ReadError`.
pub async fn read_documents(
    paths: &[impl AsRef<Path>],
) -> Vec<Result<Document, ReadError>> {
    join_all(paths.iter().map(read_document)).await
}

/// A small fixed table covering the types users actually drop into the
/// knowledge base. Everything unknown is treated as plain text upstream.
fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        "md" | "markdown" => Some("text/markdown"),
        "csv" => Some("text/csv"),
        "json" => Some("application/json"),
        "html" | "htm" => Some("text/html"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// Human-readable file size for the document listing.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
    let i = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let i = i.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(i as i32);
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[i])
}
