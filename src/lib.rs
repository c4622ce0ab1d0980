//! # pdf2sheet
//!
//! Extract structured contact fields from the first page of a PDF with a
//! hosted chat-completion model, then append them as a row to a Google
//! Sheet (or print them when no credential file is present).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Read     page one's text layer (pdf crate, spawn_blocking)
//!  ├─ 2. Extract  chat-completion call under a hard wall-clock deadline
//!  ├─ 3. Parse    first {...} region of the reply, decoded as JSON
//!  └─ 4. Persist  Sheets values:append, or pretty-printed to stdout
//! ```
//!
//! Stages 1 to 3 short-circuit the run when they produce nothing; stage 4
//! never does. A failed spreadsheet append is logged and surfaced as
//! [`SinkOutcome::Failed`] on the output while the run still succeeds.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2sheet::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from GITHUB_TOKEN by default
//!     let config = ExtractionConfig::builder()
//!         .pdf_path("intake_form.pdf")
//!         .sheet_id("1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms")
//!         .build()?;
//!     let output = extract(&config).await?;
//!     eprintln!("{} fields, sink: {:?}", output.fields.len(), output.sink);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2sheet` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2sheet = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::PipelineError;
pub use extract::{extract, extract_sync};
pub use output::{ExtractionOutput, ExtractionStats, FieldMap, SinkOutcome};
