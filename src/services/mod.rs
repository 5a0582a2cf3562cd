// src/services/mod.rs
//
// Seams to the hosted collaborators. Handlers only see these traits.

pub mod gemini;
pub mod leads;

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        answer::AnswerMap,
        chat::ChatTurn,
        lead::{LeadReceipt, NewLead},
        report::Report,
    },
};

/// Failures talking to the language-model service.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Detected before any network call.
    MissingApiKey,
    Network(String),
    RateLimited,
    Http { status: u16, body: String },
    EmptyResponse,
    Malformed(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::MissingApiKey => f.write_str("API key missing"),
            LlmError::Network(msg) => write!(f, "network error: {}", msg),
            LlmError::RateLimited => f.write_str("rate limited"),
            LlmError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            LlmError::EmptyResponse => f.write_str("no response from model"),
            LlmError::Malformed(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

/// Turns a completed answer map into a report.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, answers: &AnswerMap) -> Result<Report, LlmError>;
}

/// Answers questions about a generated report.
///
/// Never fails: problems come back as a user-facing fallback reply.
#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn reply(&self, history: &[ChatTurn], message: &str, report: &Report) -> String;
}

/// Hosted store for captured email addresses.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn save(&self, lead: &NewLead) -> Result<LeadReceipt, AppError>;
}

pub const LEADS_NOT_CONFIGURED: &str =
    "Lead capture is not configured. Please set DATABASE_URL in your environment.";

/// Optional lead-store capability, decided once at startup.
#[derive(Clone)]
pub enum LeadCapture {
    Unavailable,
    Available(Arc<dyn LeadStore>),
}

impl LeadCapture {
    /// Fails fast with a configuration error when no store is wired in.
    pub fn store(&self) -> Result<&dyn LeadStore, AppError> {
        match self {
            LeadCapture::Available(store) => Ok(store.as_ref()),
            LeadCapture::Unavailable => Err(AppError::Configuration(LEADS_NOT_CONFIGURED.to_string())),
        }
    }
}
