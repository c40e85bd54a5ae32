//! Résumé PDF handling: upload policy and plain-text extraction.
//!
//! `pdf_extract` can panic on malformed input, so extraction runs on the blocking
//! pool behind `catch_unwind` and every failure comes back as `ExtractError`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use bytes::Bytes;
use regex::Regex;
use thiserror::Error;
use tracing::info;

/// Uploads above this size are rejected before extraction.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF parser panicked (malformed document)")]
    Panicked,

    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// True when the declared content type is a PDF (parameters such as `; name=` ignored).
pub fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}

/// Extracts and cleans the text of an uploaded PDF.
pub async fn extract_resume_text(data: Bytes) -> Result<String, ExtractError> {
    let raw = tokio::task::spawn_blocking(move || extract_raw(&data)).await??;
    let text = clean_extracted_text(&raw);
    info!("Extracted {} characters from PDF", text.chars().count());
    Ok(text)
}

fn extract_raw(data: &[u8]) -> Result<String, ExtractError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(data)
    }));
    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Parse(e.to_string())),
        Err(_) => Err(ExtractError::Panicked),
    }
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn page_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)page \d+ of \d+").expect("static regex"))
}

/// Flattens extracted PDF text to a single line: whitespace runs (form feeds
/// included) become one space and `Page N of M` footers are dropped.
pub fn clean_extracted_text(raw: &str) -> String {
    let flattened = whitespace_run().replace_all(raw, " ");
    let without_pages = page_marker().replace_all(&flattened, "");
    whitespace_run()
        .replace_all(&without_pages, " ")
        .trim()
        .to_string()
}
