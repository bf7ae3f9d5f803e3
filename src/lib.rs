//! # findoc-qa
//!
//! Upload a financial document (PDF or spreadsheet), pull headline metrics out
//! of it with pattern matching, and ask free-form questions answered by a
//! locally hosted language model grounded on the document text.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌──────────────┐
//! │  Upload  │──▶│  Extract    │──▶│   Metrics    │
//! │ pdf/xlsx │   │ text+tables │   │ regex scan   │
//! └──────────┘   └──────┬──────┘   └──────────────┘
//!                       │
//!                       ▼
//!                ┌─────────────┐   ┌──────────────┐
//!                │   Session   │──▶│ Model client │
//!                │ doc+history │   │ /api/generate│
//!                └─────────────┘   └──────────────┘
//! ```
//!
//! Everything is synchronous: one extraction or one model call at a time,
//! driven by the owner of a [`session::Session`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Media types and conversation turns |
//! | [`upload`] | Upload validation |
//! | [`extract`] | PDF and spreadsheet normalization |
//! | [`table`] | Sheet tables, column statistics, text summaries |
//! | [`metrics`] | Regex metric extraction |
//! | [`client`] | Model-serving HTTP client |
//! | [`session`] | Session state: document, metrics, conversation |
//! | [`report`] | Terminal views of metrics, tables and history |
//! | [`chat`] | Interactive chat loop |

pub mod chat;
pub mod client;
pub mod config;
pub mod extract;
pub mod metrics;
pub mod models;
pub mod report;
pub mod session;
pub mod table;
pub mod upload;
