//! Pipeline orchestration: read, extract, persist.
//!
//! [`extract`] runs the three stages in sequence and short-circuits as
//! soon as a stage produces nothing usable. The persistence stage is the
//! exception: its failures are logged and recorded on the output, never
//! escalated, so a run counts as successful once fields were extracted.

use crate::config::ExtractionConfig;
use crate::error::PipelineError;
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::{llm, parse, sheet, text};
use std::time::Instant;
use tracing::{debug, info};

/// Run the full extraction pipeline with the given configuration.
///
/// # Errors
/// - [`PipelineError::EmptyDocument`] when page one yields no text
/// - [`PipelineError::NoReply`] when the inference call fails, times out,
///   or is interrupted
/// - [`PipelineError::NoJson`] when the reply carries no decodable object
///
/// A sink failure is NOT an error; check [`ExtractionOutput::sink`].
pub async fn extract(config: &ExtractionConfig) -> Result<ExtractionOutput, PipelineError> {
    let total_start = Instant::now();
    info!("Starting extraction pipeline for '{}'", config.pdf_path.display());

    // ── Step 1: Read ─────────────────────────────────────────────────────
    let document_text = text::read_first_page(&config.pdf_path).await;
    if document_text.is_empty() {
        return Err(PipelineError::EmptyDocument {
            path: config.pdf_path.clone(),
        });
    }
    let text_chars = document_text.chars().count();
    info!("Extracted {text_chars} characters from page one");

    // ── Step 2: Extract ──────────────────────────────────────────────────
    let llm_start = Instant::now();
    let reply = llm::extract_reply(&document_text, config)
        .await
        .ok_or(PipelineError::NoReply)?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    debug!("Model reply:\n{reply}");

    let fields = parse::parse_fields(&reply).ok_or(PipelineError::NoJson)?;
    info!(
        "Parsed {} field(s): {:?}",
        fields.len(),
        fields.keys().collect::<Vec<_>>()
    );

    // ── Step 3: Persist ──────────────────────────────────────────────────
    let sink = sheet::persist(&fields, config).await;

    let stats = ExtractionStats {
        text_chars,
        reply_chars: reply.chars().count(),
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Pipeline complete: {} field(s), sink {:?}, {}ms total",
        fields.len(),
        sink,
        stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        fields,
        sink,
        stats,
    })
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(config: &ExtractionConfig) -> Result<ExtractionOutput, PipelineError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PipelineError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(extract(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_pdf_is_an_empty_document_error() {
        let config = ExtractionConfig::builder()
            .pdf_path("/no/such/form.pdf")
            .build()
            .unwrap();
        let err = extract(&config).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDocument { .. }));
    }
}
