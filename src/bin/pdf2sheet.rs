//! CLI binary for pdf2sheet.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and turns the pipeline result into an exit code.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2sheet::{extract, ExtractionConfig, SinkOutcome};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print extracted fields (no credentials.json present)
  pdf2sheet intake_form.pdf

  # Append to a spreadsheet
  pdf2sheet intake_form.pdf \
      --credentials credentials.json \
      --sheet-id 1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms

  # Tighter deadline and a different model
  pdf2sheet form.pdf --timeout 30 --model my-org/other-model

MODES:
  The sink mode is selected by the credential file alone. When the file at
  --credentials exists, the four-column row (name, phone, date, email) is
  appended to the first sheet of --sheet-id; when it does not, the full
  mapping is pretty-printed to stdout and no spreadsheet call is made.

ENVIRONMENT VARIABLES:
  GITHUB_TOKEN            Bearer token for the inference endpoint
  PDF2SHEET_ENDPOINT      Chat-completion base URL
  PDF2SHEET_MODEL         Model identifier
  PDF2SHEET_CREDENTIALS   Path to the service-account JSON
  PDF2SHEET_SHEET_ID      Target spreadsheet identifier

EXIT CODES:
  0  fields extracted (even when the sheet append failed; check the logs)
  1  empty PDF text, failed/timed-out extraction, or interrupt
"#;

/// Extract contact fields from a PDF and append them to a Google Sheet.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2sheet",
    version,
    about = "Extract contact fields from a PDF with a hosted LLM and append them to a Google Sheet",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to read (page one only).
    input: PathBuf,

    /// Bearer token for the inference endpoint.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat-completion base URL.
    #[arg(
        long,
        env = "PDF2SHEET_ENDPOINT",
        default_value = "https://models.github.ai/inference"
    )]
    endpoint: String,

    /// Model identifier.
    #[arg(
        long,
        env = "PDF2SHEET_MODEL",
        default_value = "meta/Llama-4-Scout-17B-16E-Instruct"
    )]
    model: String,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "PDF2SHEET_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Nucleus-sampling probability mass (0–1].
    #[arg(long, env = "PDF2SHEET_TOP_P", default_value_t = 1.0)]
    top_p: f32,

    /// Max tokens the model may generate.
    #[arg(long, env = "PDF2SHEET_MAX_TOKENS", default_value_t = 500)]
    max_tokens: u32,

    /// Hard deadline on the inference call, in seconds.
    #[arg(long, env = "PDF2SHEET_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Service-account credential JSON; its presence selects spreadsheet mode.
    #[arg(
        long,
        env = "PDF2SHEET_CREDENTIALS",
        default_value = "credentials.json"
    )]
    credentials: PathBuf,

    /// Target spreadsheet identifier.
    #[arg(long, env = "PDF2SHEET_SHEET_ID", default_value = "")]
    sheet_id: String,

    /// Also print the extracted mapping as indented JSON in spreadsheet mode.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2SHEET_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2SHEET_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    // ── Run pipeline ─────────────────────────────────────────────────────
    // The extractor folds a ctrl-c during its bounded wait into a timeout;
    // this select covers an interrupt at any other point of the run.
    let output = tokio::select! {
        result = extract(&config) => result.context("Extraction failed")?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("{}", red("✘ interrupted"));
            std::process::exit(1);
        }
    };

    if cli.json && output.sink != SinkOutcome::Printed {
        println!(
            "{}",
            serde_json::to_string_pretty(&output.fields)
                .context("Failed to serialise extracted fields")?
        );
    }

    if !cli.quiet {
        let sink_note = match output.sink {
            SinkOutcome::Appended => green("row appended"),
            SinkOutcome::Printed => dim("printed (no credential file)"),
            SinkOutcome::Failed => red("append failed, see logs"),
        };
        eprintln!(
            "{} {} field(s) extracted  {}  {}",
            green("✔"),
            bold(&output.fields.len().to_string()),
            sink_note,
            dim(&format!("{}ms", output.stats.total_duration_ms)),
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .endpoint(cli.endpoint.clone())
        .model(cli.model.clone())
        .temperature(cli.temperature)
        .top_p(cli.top_p)
        .max_tokens(cli.max_tokens)
        .timeout_secs(cli.timeout)
        .pdf_path(cli.input.clone())
        .credentials_path(cli.credentials.clone())
        .sheet_id(cli.sheet_id.clone());

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }

    builder.build().context("Invalid configuration")
}
