//! Text extraction for imported documents
//!
//! Turns raw file bytes into the flat text a book is built from. Plain text is
//! always available; PDF support needs the `pdf` feature (MuPDF).

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File is not valid UTF-8 text")]
    InvalidEncoding,

    #[error("Text extraction error: {0}")]
    Document(String),
}

pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(|_| ExtractError::InvalidEncoding)?;
        Ok(text.trim().to_string())
    }
}

#[cfg(feature = "pdf")]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfExtractor {
    /// Page texts joined by a single space.
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        use mupdf::{Document, TextPageOptions};

        let doc = Document::from_bytes(bytes, "application/pdf")
            .map_err(|e| ExtractError::Document(e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| ExtractError::Document(e.to_string()))?;

        let mut text = String::new();
        for page_index in 0..page_count {
            let page = doc
                .load_page(page_index)
                .map_err(|e| ExtractError::Document(e.to_string()))?;
            let page_text = page
                .to_text_page(TextPageOptions::empty())
                .and_then(|text_page| text_page.to_text())
                .map_err(|e| ExtractError::Document(e.to_string()))?;
            text.push_str(&page_text);
            text.push(' ');
        }

        tracing::debug!(pages = page_count, chars = text.len(), "PDF text extracted");
        Ok(text.trim().to_string())
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Pick an extractor from the file extension.
pub fn extractor_for(path: &Path) -> Result<Box<dyn TextExtractor>, ExtractError> {
    match extension_of(path).as_deref() {
        #[cfg(feature = "pdf")]
        Some("pdf") => Ok(Box::new(PdfExtractor)),
        #[cfg(not(feature = "pdf"))]
        Some("pdf") => Err(ExtractError::UnsupportedFormat(
            "PDF support is not enabled in this build; rebuild with `cargo install pulseread-rs --features pdf`".to_string(),
        )),
        _ => Ok(Box::new(PlainTextExtractor)),
    }
}

/// Read and extract a document off the async runtime.
pub async fn extract_file(path: &Path) -> anyhow::Result<String> {
    let extractor = extractor_for(path)?;
    let bytes = tokio::fs::read(path).await?;
    let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes)).await??;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn plain_text_is_trimmed_and_bom_stripped() {
        let text = PlainTextExtractor.extract(b"\xEF\xBB\xBF  hello world \n").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let result = PlainTextExtractor.extract(&[0x66, 0xff, 0xfe, 0x6f]);
        assert!(matches!(result, Err(ExtractError::InvalidEncoding)));
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn pdf_without_feature_is_unsupported() {
        let result = extractor_for(Path::new("book.PDF"));
        match result {
            Err(ExtractError::UnsupportedFormat(detail)) => assert!(detail.contains("--features pdf")),
            _ => panic!("expected an unsupported format error"),
        }
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn corrupt_pdf_is_an_error() {
        let extractor = extractor_for(Path::new("book.pdf")).unwrap();
        assert!(extractor.extract(b"definitely not a pdf").is_err());
    }

    #[tokio::test]
    async fn extracts_text_files_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, "the quick brown fox").unwrap();

        let text = extract_file(&path).await.unwrap();
        assert_eq!(text, "the quick brown fox");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(extract_file(&temp_dir.path().join("missing.txt")).await.is_err());
    }
}
