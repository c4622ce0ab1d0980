//! Error types for the pdf2sheet library.
//!
//! The pipeline's stage seams are soft-failing on purpose: the text source
//! returns an empty string, the field extractor returns `None`, the sink
//! returns an outcome flag. [`PipelineError`] is the typed error those seams
//! wrap internally (and log), and what the orchestrator returns once a stage
//! has produced nothing usable. Persistence failures never reach the
//! orchestrator's `Result`; they are logged and recorded on the output.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the pdf2sheet library.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Page one yielded no text; there is nothing to extract from.
    #[error("No text extracted from page one of '{path}'")]
    EmptyDocument { path: PathBuf },

    /// The PDF could not be parsed at all.
    #[error("Failed to parse PDF: {0}")]
    PdfParse(String),

    /// The file parsed but contains zero pages.
    #[error("PDF has no pages")]
    NoPages,

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The HTTP request itself failed (connect, TLS, body read).
    #[error("Chat completion transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The inference endpoint answered with a non-success status.
    #[error("Inference endpoint returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The response decoded but carried no choices.
    #[error("Model response contained no choices")]
    EmptyReply,

    /// The completion call timed out, errored, or was interrupted.
    #[error("No reply from the model (timed out, errored, or interrupted)")]
    NoReply,

    /// The reply carried no decodable JSON object.
    #[error("No JSON object found in the model reply")]
    NoJson,

    // ── Sheet errors ──────────────────────────────────────────────────────
    /// The service-account credential file could not be read or decoded.
    #[error("Credential file '{path}' could not be used: {detail}")]
    Credentials { path: PathBuf, detail: String },

    /// Signing the service-account assertion failed (bad private key).
    #[error("Failed to sign service-account assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The OAuth token endpoint rejected the assertion.
    #[error("Access-token exchange failed: {detail}")]
    TokenExchange { detail: String },

    /// The spreadsheet exists but exposes no sheets to append to.
    #[error("Spreadsheet '{sheet_id}' has no sheets")]
    MissingSheet { sheet_id: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_display_names_the_file() {
        let e = PipelineError::EmptyDocument {
            path: PathBuf::from("form.pdf"),
        };
        assert!(e.to_string().contains("form.pdf"));
    }

    #[test]
    fn api_display_carries_status_and_body() {
        let e = PipelineError::Api {
            status: 401,
            body: "bad credentials".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("401"), "got: {msg}");
        assert!(msg.contains("bad credentials"));
    }

    #[test]
    fn missing_sheet_display() {
        let e = PipelineError::MissingSheet {
            sheet_id: "abc123".into(),
        };
        assert!(e.to_string().contains("abc123"));
    }
}
