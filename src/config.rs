//! Configuration for the extraction pipeline.
//!
//! Every knob lives in [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. The struct replaces the ambient
//! process-wide constants a deployment would otherwise hard-code: each
//! component receives the config at construction and nothing reads globals.
//!
//! Defaults match the reference deployment: a GitHub Models endpoint,
//! deterministic sampling (temperature 0, top-p 1), a 500-token reply cap
//! and a 60 second hard deadline on the inference call.

use crate::error::PipelineError;
use std::fmt;
use std::path::PathBuf;

/// Configuration for a single PDF-to-sheet extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2sheet::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .pdf_path("intake_form.pdf")
///     .sheet_id("1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms")
///     .timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Bearer token for the inference endpoint.
    ///
    /// `Default` reads the `GITHUB_TOKEN` environment variable; an empty
    /// key is allowed and simply fails at the endpoint.
    pub api_key: String,

    /// Base URL of the chat-completion service. Default:
    /// `https://models.github.ai/inference`. The `/chat/completions` path
    /// is appended by the client.
    pub endpoint: String,

    /// Model identifier sent with every request.
    /// Default: `meta/Llama-4-Scout-17B-16E-Instruct`.
    pub model: String,

    /// Sampling temperature. Default: 0.0.
    ///
    /// Field extraction is transcription, not generation; zero keeps the
    /// model pinned to what the document actually says.
    pub temperature: f32,

    /// Nucleus-sampling probability mass. Default: 1.0.
    pub top_p: f32,

    /// Maximum tokens the model may generate. Default: 500.
    ///
    /// Six short fields fit comfortably; setting this lower risks a reply
    /// truncated mid-object, which the parser then rejects wholesale.
    pub max_tokens: u32,

    /// Hard wall-clock deadline on the inference call, in seconds.
    /// Default: 60.
    ///
    /// The deadline is enforced outside the HTTP client, on the task
    /// running the call; when it elapses the task is abandoned without
    /// waiting for its own cleanup.
    pub timeout_secs: u64,

    /// Path of the PDF to read. Only page one is consumed.
    pub pdf_path: PathBuf,

    /// Path of the Google service-account credential JSON. Its mere
    /// presence selects spreadsheet mode; absence selects console mode.
    /// Default: `credentials.json`.
    pub credentials_path: PathBuf,

    /// Opaque identifier of the target spreadsheet. Rows are appended to
    /// its first sheet.
    pub sheet_id: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GITHUB_TOKEN").unwrap_or_default(),
            endpoint: "https://models.github.ai/inference".to_string(),
            model: "meta/Llama-4-Scout-17B-16E-Instruct".to_string(),
            temperature: 0.0,
            top_p: 1.0,
            max_tokens: 500,
            timeout_secs: 60,
            pdf_path: PathBuf::from("document.pdf"),
            credentials_path: PathBuf::from("credentials.json"),
            sheet_id: String::new(),
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    // api_key is redacted from Debug output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("api_key", &format!("<{} bytes>", self.api_key.len()))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("pdf_path", &self.pdf_path)
            .field("credentials_path", &self.credentials_path)
            .field("sheet_id", &self.sheet_id)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.top_p = p.clamp(0.0, 1.0);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn pdf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdf_path = path.into();
        self
    }

    pub fn credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.credentials_path = path.into();
        self
    }

    pub fn sheet_id(mut self, id: impl Into<String>) -> Self {
        self.config.sheet_id = id.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, PipelineError> {
        let c = &self.config;
        if c.timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.top_p <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "top_p must be in (0, 1], got {}",
                c.top_p
            )));
        }
        if c.endpoint.is_empty() {
            return Err(PipelineError::InvalidConfig("endpoint must be set".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let c = ExtractionConfig::default();
        assert_eq!(c.temperature, 0.0);
        assert_eq!(c.top_p, 1.0);
        assert_eq!(c.max_tokens, 500);
        assert_eq!(c.timeout_secs, 60);
        assert_eq!(c.endpoint, "https://models.github.ai/inference");
        assert_eq!(c.credentials_path, PathBuf::from("credentials.json"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ExtractionConfig::builder().timeout_secs(0).build();
        assert!(matches!(err, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let err = ExtractionConfig::builder().max_tokens(0).build();
        assert!(matches!(err, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn temperature_clamped() {
        let c = ExtractionConfig::builder()
            .temperature(5.0)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn top_p_zero_rejected_after_clamp() {
        let err = ExtractionConfig::builder().top_p(-0.5).build();
        assert!(matches!(err, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = ExtractionConfig::builder()
            .api_key("super-secret-token")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret-token"));
    }
}
