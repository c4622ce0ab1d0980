//! Text source: extract the text layer of a PDF's first page.
//!
//! The `pdf` crate is synchronous, so parsing runs under
//! `tokio::task::spawn_blocking` and never stalls the runtime workers.
//!
//! Contract: [`read_first_page`] soft-fails. A missing file, a corrupt
//! file, or an empty page set all come back as `""` with a `warn!` line;
//! the orchestrator treats empty text as "nothing to process" and exits.

use crate::error::PipelineError;
use pdf::file::FileOptions;
use std::path::Path;
use tracing::{debug, warn};

/// Read the text content of page one, or `""` on any failure.
pub async fn read_first_page(path: &Path) -> String {
    let path_display = path.display().to_string();
    let owned = path.to_path_buf();

    let result = tokio::task::spawn_blocking(move || {
        let data = std::fs::read(&owned)
            .map_err(|e| PipelineError::PdfParse(format!("{}: {e}", owned.display())))?;
        first_page_text(&data)
    })
    .await;

    match result {
        Ok(Ok(text)) => {
            debug!("Read {} chars from page one of '{path_display}'", text.chars().count());
            text
        }
        Ok(Err(e)) => {
            warn!("Error reading PDF '{path_display}': {e}");
            String::new()
        }
        Err(e) => {
            warn!("PDF read task panicked for '{path_display}': {e}");
            String::new()
        }
    }
}

/// Parse `data` as a PDF and return page one's text.
///
/// Walks the content stream and concatenates every `TextDraw` operation.
/// Layout is not reconstructed; the downstream model reads the text as a
/// bag of fragments.
pub fn first_page_text(data: &[u8]) -> Result<String, PipelineError> {
    let file = FileOptions::cached()
        .load(data)
        .map_err(|e| PipelineError::PdfParse(e.to_string()))?;

    if file.num_pages() == 0 {
        return Err(PipelineError::NoPages);
    }

    let resolver = file.resolver();
    let page = file
        .get_page(0)
        .map_err(|e| PipelineError::PdfParse(e.to_string()))?;

    let mut text = String::new();
    if let Some(content) = &page.contents {
        let operations = content
            .operations(&resolver)
            .map_err(|e| PipelineError::PdfParse(e.to_string()))?;
        for op in operations.iter() {
            if let pdf::content::Op::TextDraw { text: fragment } = op {
                text.push_str(&fragment.to_string_lossy());
            }
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_soft_fails_to_empty() {
        let text = read_first_page(Path::new("/no/such/file.pdf")).await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn garbage_bytes_soft_fail_to_empty() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"this is not a pdf at all").unwrap();
        let text = read_first_page(f.path()).await;
        assert_eq!(text, "");
    }

    #[test]
    fn garbage_bytes_error_from_inner_parser() {
        let err = first_page_text(b"not a pdf").unwrap_err();
        assert!(matches!(err, PipelineError::PdfParse(_)));
    }
}
