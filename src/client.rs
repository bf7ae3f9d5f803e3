//! Client for the local model-serving endpoint (Ollama HTTP API).
//!
//! Two calls are used:
//!
//! | Call | Purpose |
//! |------|---------|
//! | `GET /api/tags` | list installed model names |
//! | `POST /api/generate` | one non-streaming completion for a prompt |
//!
//! Every call is a single blocking request with the configured timeout and no
//! retry. Failures come back as a tagged [`ClientError`];
//! [`ClientError::user_message`] renders the fixed strings shown to the user.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ModelConfig;

pub const DEFAULT_URL: &str = "http://localhost:11434";
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
pub const EMPTY_RESPONSE_MESSAGE: &str = "No response generated";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("cannot connect to model endpoint at {url}: {detail}")]
    Connect { url: String, detail: String },
    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Transport(String),
    #[error("invalid response from model endpoint: {0}")]
    Decode(String),
}

impl ClientError {
    /// Text shown in place of an answer when a request fails.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Timeout(_) => TIMEOUT_MESSAGE.to_string(),
            ClientError::Status { status, body } => format!("Error: {} - {}", status, body),
            other => format!("Error generating response: {}", other),
        }
    }

    /// Text shown when model discovery fails.
    pub fn discovery_message(&self) -> String {
        match self {
            ClientError::Connect { url, .. } => format!(
                "Cannot connect to Ollama. Please ensure Ollama is running on {}",
                url
            ),
            other => format!("Error connecting to Ollama: {}", other),
        }
    }
}

/// Model-serving backend. Implemented over HTTP by [`OllamaClient`].
pub trait ModelBackend {
    /// Names of the models the endpoint can serve.
    fn list_models(&self) -> Result<Vec<String>, ClientError>;

    /// Run `prompt` through `model` and return the raw response text.
    fn generate(&self, model: &str, prompt: &str) -> Result<String, ClientError>;
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

pub struct OllamaClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &ModelConfig) -> Result<Self, ClientError> {
        Self::new(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else if e.is_connect() {
            ClientError::Connect {
                url: self.base_url.clone(),
                detail: e.to_string(),
            }
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }

    fn check_status(
        &self,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().map_err(|e| self.classify(e))?;
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl ModelBackend for OllamaClient {
    fn list_models(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .map_err(|e| self.classify(e))?;
        let tags: TagsResponse = self
            .check_status(response)?
            .json()
            .map_err(|e| self.classify(e))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn generate(&self, model: &str, prompt: &str) -> Result<String, ClientError> {
        let body = serde_json::json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
        });
        debug!(model, prompt_chars = prompt.len(), "sending generate request");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .map_err(|e| self.classify(e))?;
        let parsed: GenerateResponse = self
            .check_status(response)?
            .json()
            .map_err(|e| self.classify(e))?;

        Ok(parsed
            .response
            .unwrap_or_else(|| EMPTY_RESPONSE_MESSAGE.to_string()))
    }
}

/// Query the endpoint for models at startup.
///
/// A failure yields an empty list and is returned alongside for the caller to
/// report; callers must then refuse to ask questions until a model is
/// available.
pub fn discover_models(backend: &dyn ModelBackend) -> (Vec<String>, Option<ClientError>) {
    match backend.list_models() {
        Ok(models) => {
            info!(count = models.len(), "discovered models");
            (models, None)
        }
        Err(e) => {
            warn!("model discovery failed: {}", e);
            (Vec::new(), Some(e))
        }
    }
}

/// The grounding prompt: full document text plus the user's question.
pub fn build_prompt(document: &str, question: &str) -> String {
    format!(
        "You are a financial document analysis assistant. Based on the following financial document content, answer the user's question accurately and concisely.

Document Content:
{document}

User Question: {question}

Please provide a clear, accurate answer based only on the information in the document. If the information is not available in the document, please state that clearly."
    )
}

/// Ask `question` about `document` using `model`.
pub fn answer(
    backend: &dyn ModelBackend,
    model: &str,
    question: &str,
    document: &str,
) -> Result<String, ClientError> {
    backend.generate(model, &build_prompt(document, question))
}

/// Like [`answer`], but failures are rendered as the user-facing message.
pub fn answer_text(
    backend: &dyn ModelBackend,
    model: &str,
    question: &str,
    document: &str,
) -> String {
    answer(backend, model, question, document).unwrap_or_else(|e| {
        warn!(model, "generate failed: {}", e);
        e.user_message()
    })
}
