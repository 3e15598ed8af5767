use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::warn;

/// Raw extraction result: plain text plus a page count derived from
/// form-feed page markers.
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    pub text: String,
    pub pages: usize,
}

/// PDF-to-text collaborator seam. Implementations must not fail: any
/// internal error yields empty text and zero pages so one bad document
/// can never abort a corpus run.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> ExtractedText;
}

/// Extractor backed by the `pdf_extract` crate.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> ExtractedText {
        // pdf_extract panics on some malformed files; the never-raise
        // contract is enforced at this boundary.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path)));
        match outcome {
            Ok(Ok(text)) => {
                let pages = if text.is_empty() {
                    0
                } else {
                    text.matches('\x0c').count() + 1
                };
                ExtractedText { text, pages }
            }
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "text extraction failed");
                ExtractedText::default()
            }
            Err(_) => {
                warn!(path = %path.display(), "text extraction panicked");
                ExtractedText::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_result() {
        let extractor = PdfTextExtractor;
        let out = extractor.extract(Path::new("/nonexistent/paper.pdf"));
        assert_eq!(out.text, "");
        assert_eq!(out.pages, 0);
    }

    #[test]
    fn garbage_file_yields_empty_result() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").expect("write");
        let out = PdfTextExtractor.extract(&path);
        assert_eq!(out.text, "");
        assert_eq!(out.pages, 0);
    }
}
