// src/models/question.rs

use serde::Serialize;

use crate::models::answer::AnswerMap;

/// Decides from the answers so far whether a question belongs to the active sequence.
pub type Visibility = fn(&AnswerMap) -> bool;

/// Part of the questionnaire a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Profile,
    Pain,
    Readiness,
}

/// Immutable question definition from the catalog.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    /// Unique key in the answer map.
    pub id: &'static str,
    pub section: Section,
    /// The prompt shown to the user.
    pub text: &'static str,
    pub kind: QuestionKind,
    /// Absent means always visible.
    pub visible_when: Option<Visibility>,
}

impl Question {
    /// A question is active when it has no predicate or the predicate holds.
    pub fn is_visible(&self, answers: &AnswerMap) -> bool {
        self.visible_when.is_none_or(|visible| visible(answers))
    }

    pub fn to_public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id,
            section: self.section,
            text: self.text,
            kind: self.kind,
        }
    }
}

/// Input type and its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Single {
        options: &'static [&'static str],
    },
    Multi {
        options: &'static [&'static str],
    },
    Range {
        min: f64,
        max: f64,
        step: f64,
    },
    Text {
        placeholder: &'static str,
    },
    /// Items come from the answer to `source`; `fallback` is used when
    /// that question is not part of the active sequence at all.
    Ranked {
        source: &'static str,
        #[serde(skip)]
        fallback: &'static [&'static str],
    },
}

impl QuestionKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::Single { .. } => "single",
            QuestionKind::Multi { .. } => "multi",
            QuestionKind::Range { .. } => "range",
            QuestionKind::Text { .. } => "text",
            QuestionKind::Ranked { .. } => "ranked",
        }
    }

    /// Whether an answer with this kind advances on its own.
    pub fn auto_advances(&self) -> bool {
        matches!(self, QuestionKind::Single { .. })
    }
}

/// DTO for sending a question to the client (the visibility predicate stays server side).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: &'static str,
    pub section: Section,
    pub text: &'static str,
    #[serde(flatten)]
    pub kind: QuestionKind,
}
