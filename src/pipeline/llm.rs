//! Field extractor: drive the chat-completion call under a hard deadline.
//!
//! [`ChatClient`] speaks the OpenAI-compatible `/chat/completions` wire
//! format with typed serde bodies. [`extract_reply`] wraps a single call in
//! its own tokio task and races it against a wall-clock deadline and a
//! ctrl-c signal; the deadline holds even if the underlying HTTP call never
//! returns on its own.
//!
//! Failure semantics: timeout, transport error, API error, and interrupt
//! all collapse to `None`. Each is logged once; none is retried.

use crate::config::ExtractionConfig;
use crate::error::PipelineError;
use crate::prompts::{extraction_prompt, SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

// ── Client ───────────────────────────────────────────────────────────────

/// A client for an OpenAI-compatible chat-completion endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ChatClient {
    /// Create a client for the endpoint named in `config`.
    ///
    /// The client carries no request timeout of its own; the deadline is
    /// enforced externally by [`extract_reply`].
    pub fn new(config: &ExtractionConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Issue one completion request and return the first choice's content.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        config: &ExtractionConfig,
    ) -> Result<String, PipelineError> {
        let body = ChatRequest {
            model: &config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(PipelineError::EmptyReply)
    }
}

// ── Bounded extraction ───────────────────────────────────────────────────

/// Ask the model to extract fields from `text`, or `None` on any failure.
///
/// The completion call runs in its own spawned task so the deadline binds
/// the *wait*, not the call: when `config.timeout_secs` elapses, or a
/// ctrl-c arrives during the wait, the task is aborted and `None` is
/// returned without waiting for the call's own teardown.
pub async fn extract_reply(text: &str, config: &ExtractionConfig) -> Option<String> {
    let client = match ChatClient::new(config) {
        Ok(c) => c,
        Err(e) => {
            warn!("Could not build HTTP client: {e}");
            return None;
        }
    };

    info!(
        "Sending {} chars to '{}' with a {}s deadline",
        text.chars().count(),
        config.model,
        config.timeout_secs
    );

    let prompt = extraction_prompt(text);
    let call_config = config.clone();
    let mut call =
        tokio::spawn(async move { client.complete(SYSTEM_PROMPT, &prompt, &call_config).await });

    let deadline = sleep(Duration::from_secs(config.timeout_secs));
    tokio::pin!(deadline);

    tokio::select! {
        joined = &mut call => match joined {
            Ok(Ok(reply)) => {
                info!("Reply received ({} chars)", reply.chars().count());
                Some(reply)
            }
            Ok(Err(e)) => {
                warn!("Chat completion failed: {e}");
                debug!(
                    "token length: {}, text length: {}",
                    config.api_key.len(),
                    text.len()
                );
                None
            }
            Err(e) => {
                warn!("Completion task panicked: {e}");
                None
            }
        },
        _ = &mut deadline => {
            call.abort();
            warn!(
                "Deadline of {}s elapsed; abandoning the completion call",
                config.timeout_secs
            );
            None
        }
        _ = tokio::signal::ctrl_c() => {
            call.abort();
            warn!("Interrupted; abandoning the completion call");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "test-model",
            messages: vec![
                Message {
                    role: "system",
                    content: "sys",
                },
                Message {
                    role: "user",
                    content: "usr",
                },
            ],
            temperature: 0.0,
            top_p: 1.0,
            max_tokens: 500,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["top_p"], 1.0);
    }

    #[test]
    fn response_plucks_first_choice() {
        let raw = r#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "first");
    }

    #[test]
    fn client_strips_trailing_slash() {
        let config = ExtractionConfig::builder()
            .endpoint("http://localhost:9999/")
            .build()
            .unwrap();
        let client = ChatClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999");
    }
}
