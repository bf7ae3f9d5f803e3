//! Per-user session state.
//!
//! A [`Session`] is owned by whoever drives the conversation (the `chat`
//! loop, a one-shot CLI command, a test). It holds the current document with
//! everything derived from it, the conversation history, and the model
//! selection. There is no global state and no locking: one caller mutates a
//! session sequentially.
//!
//! Loading a document replaces the content, tables and metrics together; the
//! derived data is always recomputed from the new text. Clearing the
//! conversation leaves the document untouched.

use thiserror::Error;
use tracing::info;

use crate::client::{answer_text, ModelBackend};
use crate::extract::{extract_or_empty, ExtractError};
use crate::metrics::{MetricExtractor, MetricSet, RegexMetricExtractor};
use crate::models::{MediaType, Role, Turn};
use crate::table::TableCollection;
use crate::upload::Upload;

/// Canned questions offered next to the chat input.
pub const QUICK_QUESTIONS: [&str; 3] = [
    "What is the total revenue?",
    "What are the main expenses?",
    "What is the net income?",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please upload a financial document first.")]
    NoDocument,
    #[error("Please select an Ollama model first.")]
    NoModelSelected,
    #[error("No Ollama models available. Please install and run a model.")]
    NoModelsAvailable,
    #[error("unknown model '{0}'")]
    UnknownModel(String),
}

/// The current document and everything derived from it.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub name: String,
    pub media_type: MediaType,
    pub size: u64,
    pub content: String,
    pub tables: TableCollection,
    pub metrics: MetricSet,
}

/// Append-only list of turns, cleared only explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) -> &Turn {
        self.turns.push(Turn {
            role,
            text: text.into(),
        });
        &self.turns[self.turns.len() - 1]
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

pub struct Session {
    document: Option<LoadedDocument>,
    conversation: Conversation,
    available_models: Vec<String>,
    model: Option<String>,
    extractor: Box<dyn MetricExtractor>,
    sample_rows: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            document: None,
            conversation: Conversation::new(),
            available_models: Vec::new(),
            model: None,
            extractor: Box::new(RegexMetricExtractor),
            sample_rows: 10,
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn MetricExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows;
        self
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    /// True when a document with non-empty normalized text is loaded.
    pub fn has_content(&self) -> bool {
        self.document
            .as_ref()
            .is_some_and(|doc| !doc.content.is_empty())
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn available_models(&self) -> &[String] {
        &self.available_models
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Replace the model list. The current selection survives if still
    /// listed; otherwise the first model is selected (or none).
    pub fn set_available_models(&mut self, models: Vec<String>) {
        let keep = self
            .model
            .as_ref()
            .is_some_and(|current| models.contains(current));
        if !keep {
            self.model = models.first().cloned();
        }
        self.available_models = models;
    }

    pub fn select_model(&mut self, name: &str) -> Result<(), SessionError> {
        if self.available_models.is_empty() {
            return Err(SessionError::NoModelsAvailable);
        }
        if !self.available_models.iter().any(|m| m == name) {
            return Err(SessionError::UnknownModel(name.to_string()));
        }
        self.model = Some(name.to_string());
        Ok(())
    }

    /// Extract `upload` and make it the current document.
    ///
    /// The previous document is replaced even when extraction fails; in that
    /// case the new document has empty content and no tables or metrics, and
    /// the decode error is returned for reporting.
    pub fn load_document(&mut self, upload: &Upload) -> Result<&LoadedDocument, ExtractError> {
        let (extracted, failure) =
            extract_or_empty(&upload.bytes, upload.media_type, self.sample_rows);
        let metrics = self.extractor.extract(&extracted.text);

        info!(
            file = %upload.name,
            media_type = %upload.media_type,
            bytes = upload.size(),
            chars = extracted.text.len(),
            sheets = extracted.tables.len(),
            metrics = metrics.len(),
            "document processed"
        );

        let doc = self.document.insert(LoadedDocument {
            name: upload.name.clone(),
            media_type: upload.media_type,
            size: upload.size(),
            content: extracted.text,
            tables: extracted.tables,
            metrics,
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(doc),
        }
    }

    /// Ask a question about the current document.
    ///
    /// Refused without a document or a selected model; nothing is recorded in
    /// that case. Otherwise the question and the answer (or the rendered
    /// failure message) are appended to the conversation and the assistant
    /// turn is returned.
    pub fn ask(
        &mut self,
        backend: &dyn ModelBackend,
        question: &str,
    ) -> Result<&Turn, SessionError> {
        let content = match &self.document {
            Some(doc) if !doc.content.is_empty() => doc.content.as_str(),
            _ => return Err(SessionError::NoDocument),
        };
        let model = self.model.as_deref().ok_or(SessionError::NoModelSelected)?;

        let reply = answer_text(backend, model, question, content);
        self.conversation.push(Role::User, question);
        Ok(self.conversation.push(Role::Assistant, reply))
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    /// End the session: drop the document and the history.
    pub fn reset(&mut self) {
        self.document = None;
        self.conversation.clear();
    }
}
