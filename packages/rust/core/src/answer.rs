//! Answer generation grounded in the bounded context.
//!
//! One request per query against an OpenAI-compatible chat completion
//! endpoint, at a low fixed temperature. The system instruction embeds the
//! bounded context verbatim as the sole knowledge source and pins the exact
//! refusal phrase for questions the context cannot answer. An empty context
//! short-circuits to a fixed no-data message without touching the network.

use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};

use askbase_shared::{AskbaseError, CompletionConfig, Result};

/// Returned when there is no snapshot (or an empty one) to ground an answer.
pub const NO_DATA_MESSAGE: &str =
    "I cannot answer yet because no sources have been ingested. Run `askbase ingest` first.";

/// Exact phrase the model is instructed to use when the context is
/// insufficient.
pub const REFUSAL_PHRASE: &str = "I don't have that information in my current records.";

// ---------------------------------------------------------------------------
// CompletionClient
// ---------------------------------------------------------------------------

/// Thin client for the external completion service.
#[derive(Debug)]
pub struct CompletionClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    /// Build a client, resolving the API key from the configured env var.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AskbaseError::config(format!(
                    "completion API key not found. Set the {} environment variable.",
                    config.api_key_env
                ))
            })?;

        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit API key (embedding and tests).
    pub fn with_api_key(config: &CompletionConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AskbaseError::Completion(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }

    /// Issue a single chat completion request and return the text output.
    ///
    /// No retries, no streaming. Unreachable service, non-2xx status, or a
    /// response without message text all surface as
    /// [`AskbaseError::Completion`].
    pub async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": temperature,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AskbaseError::Completion(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskbaseError::Completion(format!(
                "service returned HTTP {status}"
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AskbaseError::Completion(format!("invalid response body: {e}")))?;

        let text = payload["choices"][0]["message"]["content"]
            .as_str()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AskbaseError::Completion("malformed response: missing message content".into())
            })?;

        debug!(chars = text.chars().count(), "completion received");
        Ok(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// AnswerGenerator
// ---------------------------------------------------------------------------

/// Produces a user-facing answer grounded in the bounded context.
pub struct AnswerGenerator {
    client: CompletionClient,
    temperature: f32,
}

impl AnswerGenerator {
    pub fn new(client: CompletionClient, temperature: f32) -> Self {
        Self {
            client,
            temperature,
        }
    }

    /// Answer `query` using only `context`.
    ///
    /// An empty (whitespace-only) context returns [`NO_DATA_MESSAGE`]
    /// without calling the completion service — an explicit precondition
    /// check, not a race with the service.
    #[instrument(skip_all, fields(query_chars = query.chars().count(), context_chars = context.chars().count()))]
    pub async fn answer(&self, query: &str, context: &str) -> Result<String> {
        if context.trim().is_empty() {
            debug!("empty context, returning no-data message without a completion call");
            return Ok(NO_DATA_MESSAGE.to_string());
        }

        let system = build_system_prompt(context);
        self.client.complete(&system, query, self.temperature).await
    }
}

/// Build the fixed answering-policy instruction around the bounded context.
pub fn build_system_prompt(context: &str) -> String {
    format!(
        "You are a precise assistant answering questions about a fixed set of ingested sources.\n\
         \n\
         KNOWLEDGE BASE:\n\
         {context}\n\
         \n\
         INSTRUCTIONS:\n\
         - Answer the user's question using ONLY the knowledge base above.\n\
         - If the answer is not in the knowledge base, reply exactly: \"{REFUSAL_PHRASE}\"\n\
         - Mention the SOURCE identifier when recommending a specific item.\n"
    )
}
