use std::panic;

use super::{ExtractionError, PageContent, TextExtractor};

/// Text extraction through the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
        extract_pdf(bytes)
    }
}

pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ExtractionError::PdfError("parser panicked on malformed input".to_string()))?
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    let pages = split_pages(&text);
    if pages.is_empty() {
        // Scanned/image PDFs extract to nothing.
        return Err(ExtractionError::Empty);
    }
    Ok(pages)
}

/// pdf-extract returns all text as one string; form feeds (\x0C) separate pages.
/// Blank pages are dropped but keep their numbering for the pages that follow.
fn split_pages(text: &str) -> Vec<PageContent> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if !text.contains('\x0C') {
        return vec![PageContent {
            page_number: 1,
            text: text.trim().to_string(),
        }];
    }
    text.split('\x0C')
        .enumerate()
        .filter(|(_, page_text)| !page_text.trim().is_empty())
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            text: page_text.trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_form_feeds() {
        let pages = split_pages("first page\x0Csecond page\x0C");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].text, "second page");
    }

    #[test]
    fn blank_pages_keep_numbering() {
        let pages = split_pages("one\x0C   \x0Cthree");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].page_number, 3);
    }

    #[test]
    fn no_form_feed_is_single_page() {
        let pages = split_pages("  The capital of France is Paris.  ");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text, "The capital of France is Paris.");
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert!(split_pages(" \n\x0C ").is_empty());
    }

    #[test]
    fn garbage_bytes_are_an_extraction_error() {
        let err = extract_pdf(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::PdfError(_)));
    }
}
