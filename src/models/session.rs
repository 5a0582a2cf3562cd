// src/models/session.rs

use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    answer::{AnswerMap, AnswerValue},
    chat::ChatTurn,
    question::PublicQuestion,
    report::Report,
};

/// Interstitial overlay shown between questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestScreen {
    pub text: &'static str,
    pub image_id: u32,
}

/// What the ranked-list question should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RankingView {
    Items { items: Vec<String> },
    /// Nothing to rank; the user should go back to `back_to` and pick some items.
    Empty { back_to: &'static str },
}

/// Snapshot of the quiz flow for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    pub question: PublicQuestion,
    pub index: usize,
    pub total: usize,
    /// `index / total`, for the progress bar only.
    pub progress: f64,
    pub answer: Option<AnswerValue>,
    /// Present while the interstitial overlay is open.
    pub rest: Option<RestScreen>,
    pub ranking: Option<RankingView>,
    pub can_retreat: bool,
    pub is_last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Quiz,
    Generating,
    Report,
}

/// DTO returned by every session endpoint.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub phase: PhaseName,
    pub quiz: Option<QuizView>,
}

/// DTO for the finished report.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: Report,
    pub answers: AnswerMap,
    pub chat: Vec<ChatTurn>,
    pub lead_saved: bool,
}
