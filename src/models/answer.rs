// src/models/answer.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::question::QuestionKind;

/// A recorded answer. The variant must match the kind of the question it is stored under.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multi(Vec<String>),
    Number(f64),
    Text(String),
    Ranked(Vec<String>),
}

impl AnswerValue {
    /// Checks the value shape against a declared question kind.
    pub fn fits(&self, kind: &QuestionKind) -> bool {
        matches!(
            (self, kind),
            (AnswerValue::Single(_), QuestionKind::Single { .. })
                | (AnswerValue::Multi(_), QuestionKind::Multi { .. })
                | (AnswerValue::Number(_), QuestionKind::Range { .. })
                | (AnswerValue::Text(_), QuestionKind::Text { .. })
                | (AnswerValue::Ranked(_), QuestionKind::Ranked { .. })
        )
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            AnswerValue::Single(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AnswerValue::Multi(items) | AnswerValue::Ranked(items) => Some(items),
            _ => None,
        }
    }
}

/// Answers keyed by question id. Keys are unique and re-answering overwrites.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnswerMap {
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question_id: impl Into<String>, value: AnswerValue) {
        self.values.insert(question_id.into(), value);
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.values.get(question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.values.contains_key(question_id)
    }

    /// Convenience for visibility predicates on single-choice questions.
    pub fn single(&self, question_id: &str) -> Option<&str> {
        self.get(question_id).and_then(AnswerValue::as_single)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Input actions a client can apply to the current question.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerRequest {
    /// Pick one option of a single-choice question.
    Single { option: String },
    /// Add or remove an option of a multi-choice question.
    Toggle { option: String },
    Number { value: f64 },
    Text { value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward index 0.
    Up,
    Down,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveRankedRequest {
    pub index: usize,
    pub direction: Direction,
}
