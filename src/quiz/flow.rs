// src/quiz/flow.rs

use std::fmt;

use crate::{
    config::MAX_FREE_TEXT_CHARS,
    models::{
        answer::{AnswerMap, AnswerValue, Direction},
        question::{Question, QuestionKind},
        session::{QuizView, RankingView},
    },
    quiz::{
        catalog::{self, QUESTIONS, REST_PLAN},
        ranking::Ranking,
        rest::{RestPlan, RestProgress},
    },
};

/// Rejected flow operations.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Every question is hidden by its predicate.
    EmptySequence,
    /// Answers may only be written for the question on screen.
    NotCurrent { question_id: String },
    KindMismatch { question_id: &'static str, expected: &'static str },
    UnknownOption { question_id: &'static str, option: String },
    InvalidNumber,
    /// The interstitial overlay is open.
    Resting,
    /// The quiz already handed its answers over.
    Finished,
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::EmptySequence => f.write_str("No questions are available"),
            FlowError::NotCurrent { question_id } => {
                write!(f, "Question '{}' is not the current question", question_id)
            }
            FlowError::KindMismatch { question_id, expected } => {
                write!(f, "Question '{}' expects a {} answer", question_id, expected)
            }
            FlowError::UnknownOption { question_id, option } => {
                write!(f, "'{}' is not an option of question '{}'", option, question_id)
            }
            FlowError::InvalidNumber => f.write_str("Number must be finite"),
            FlowError::Resting => f.write_str("Dismiss the rest screen first"),
            FlowError::Finished => f.write_str("The quiz is already complete"),
        }
    }
}

impl std::error::Error for FlowError {}

/// Result of moving forward.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Moved,
    /// The last question was confirmed; the answers are handed over by value.
    Completed(AnswerMap),
    /// An auto-advance whose question is no longer on screen.
    Stale,
}

/// Token for a pending auto-advance: the index the single-choice answer was recorded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAdvance(pub usize);

/// Walks the catalog: tracks the position in the active sequence, collects
/// answers, opens interstitials and keeps the ranked-list working order.
#[derive(Debug, Clone)]
pub struct QuizFlow {
    catalog: &'static [Question],
    answers: AnswerMap,
    index: usize,
    rest: RestProgress,
    ranking: Ranking,
    finished: bool,
}

impl Default for QuizFlow {
    fn default() -> Self {
        Self::new(&QUESTIONS, REST_PLAN)
    }
}

impl QuizFlow {
    pub fn new(catalog: &'static [Question], plan: RestPlan) -> Self {
        let mut flow = Self {
            catalog,
            answers: AnswerMap::new(),
            index: 0,
            rest: RestProgress::new(plan),
            ranking: Ranking::default(),
            finished: false,
        };
        flow.arrive(true);
        flow
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_resting(&self) -> bool {
        self.rest.is_resting()
    }

    pub fn ranking(&self) -> &[String] {
        self.ranking.items()
    }

    /// Recomputed from scratch on every call.
    pub fn active_sequence(&self) -> Vec<&'static Question> {
        catalog::active_sequence(self.catalog, &self.answers)
    }

    pub fn current(&self) -> Option<&'static Question> {
        self.active_sequence().get(self.index).copied()
    }

    /// Fraction of the active sequence already behind the user, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        let total = self.active_sequence().len();
        if total == 0 {
            return 0.0;
        }
        self.index as f64 / total as f64
    }

    /// Inserts or overwrites the answer for the current question.
    ///
    /// Single-choice answers return an [`AutoAdvance`] token; the caller is
    /// expected to pass it to [`QuizFlow::auto_advance`] after the feedback delay.
    pub fn record_answer(
        &mut self,
        question_id: &str,
        value: AnswerValue,
    ) -> Result<Option<AutoAdvance>, FlowError> {
        self.ensure_interactive()?;
        let question = self.current().ok_or(FlowError::EmptySequence)?;

        if question.id != question_id {
            return Err(FlowError::NotCurrent { question_id: question_id.to_string() });
        }
        if !value.fits(&question.kind) {
            return Err(FlowError::KindMismatch {
                question_id: question.id,
                expected: question.kind.name(),
            });
        }

        let value = normalize(question, value)?;
        self.answers.insert(question.id, value);
        self.resync(question.id);

        Ok(question.kind.auto_advances().then_some(AutoAdvance(self.index)))
    }

    pub fn select_option(&mut self, option: &str) -> Result<Option<AutoAdvance>, FlowError> {
        let id = self.current_id()?;
        self.record_answer(id, AnswerValue::Single(option.to_string()))
    }

    /// Adds the option to a multi-choice answer, or removes it if already selected.
    pub fn toggle_option(&mut self, option: &str) -> Result<(), FlowError> {
        let id = self.current_id()?;
        let mut selected = match self.answers.get(id) {
            Some(AnswerValue::Multi(items)) => items.clone(),
            _ => Vec::new(),
        };

        if let Some(pos) = selected.iter().position(|s| s == option) {
            selected.remove(pos);
        } else {
            selected.push(option.to_string());
        }

        self.record_answer(id, AnswerValue::Multi(selected)).map(|_| ())
    }

    pub fn set_number(&mut self, value: f64) -> Result<(), FlowError> {
        let id = self.current_id()?;
        self.record_answer(id, AnswerValue::Number(value)).map(|_| ())
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), FlowError> {
        let id = self.current_id()?;
        self.record_answer(id, AnswerValue::Text(text.to_string())).map(|_| ())
    }

    /// Swaps a ranked item with its neighbour and records the new order at once.
    pub fn move_ranked(&mut self, index: usize, direction: Direction) -> Result<&[String], FlowError> {
        self.ensure_interactive()?;
        let question = self.current().ok_or(FlowError::EmptySequence)?;
        if !matches!(question.kind, QuestionKind::Ranked { .. }) {
            return Err(FlowError::KindMismatch {
                question_id: question.id,
                expected: question.kind.name(),
            });
        }

        if self.ranking.swap(index, direction) {
            self.answers
                .insert(question.id, AnswerValue::Ranked(self.ranking.items().to_vec()));
        }
        Ok(self.ranking.items())
    }

    /// Moves to the next active question, or completes the quiz on the last one.
    pub fn advance(&mut self) -> Result<Step, FlowError> {
        self.ensure_interactive()?;
        let question = self.current().ok_or(FlowError::EmptySequence)?;

        // Confirming the displayed order counts as answering the ranking.
        if matches!(question.kind, QuestionKind::Ranked { .. })
            && !self.answers.contains(question.id)
            && !self.ranking.is_empty()
        {
            self.answers
                .insert(question.id, AnswerValue::Ranked(self.ranking.items().to_vec()));
        }

        let total = self.active_sequence().len();
        if self.index + 1 < total {
            self.index += 1;
            self.arrive(true);
            Ok(Step::Moved)
        } else {
            self.finished = true;
            tracing::info!("Quiz completed with {} answers", self.answers.ids().count());
            Ok(Step::Completed(self.answers.clone()))
        }
    }

    /// Advances only if the flow still sits where the token was issued.
    pub fn auto_advance(&mut self, token: AutoAdvance) -> Result<Step, FlowError> {
        if self.finished || self.rest.is_resting() || self.index != token.0 {
            return Ok(Step::Stale);
        }
        self.advance()
    }

    /// Steps back one question. Never opens an interstitial.
    pub fn retreat(&mut self) -> Result<bool, FlowError> {
        self.ensure_interactive()?;
        if self.index == 0 {
            return Ok(false);
        }
        self.index -= 1;
        self.arrive(false);
        Ok(true)
    }

    pub fn dismiss_rest(&mut self) -> bool {
        self.rest.dismiss()
    }

    pub fn view(&self) -> Result<QuizView, FlowError> {
        let active = self.active_sequence();
        let question = active.get(self.index).copied().ok_or(FlowError::EmptySequence)?;
        let total = active.len();

        Ok(QuizView {
            question: question.to_public(),
            index: self.index,
            total,
            progress: self.index as f64 / total as f64,
            answer: self.answers.get(question.id).cloned(),
            rest: self.rest.screen(),
            ranking: self.ranking_view(question),
            can_retreat: self.index > 0,
            is_last: self.index + 1 == total,
        })
    }

    fn ranking_view(&self, question: &Question) -> Option<RankingView> {
        match question.kind {
            QuestionKind::Ranked { source, .. } if self.ranking.is_empty() => {
                Some(RankingView::Empty { back_to: source })
            }
            QuestionKind::Ranked { .. } => Some(RankingView::Items {
                items: self.ranking.items().to_vec(),
            }),
            _ => None,
        }
    }

    fn current_id(&self) -> Result<&'static str, FlowError> {
        self.current().map(|q| q.id).ok_or(FlowError::EmptySequence)
    }

    fn ensure_interactive(&self) -> Result<(), FlowError> {
        if self.finished {
            return Err(FlowError::Finished);
        }
        if self.rest.is_resting() {
            return Err(FlowError::Resting);
        }
        Ok(())
    }

    /// Clamps the index after the active sequence changed and runs arrival
    /// logic if a different question ended up on screen.
    fn resync(&mut self, previous_id: &str) {
        let total = self.active_sequence().len();
        if total > 0 && self.index >= total {
            self.index = total - 1;
        }
        if self.current().is_some_and(|q| q.id != previous_id) {
            self.arrive(true);
        }
    }

    /// Runs when a question becomes current. Interstitials only open on forward arrival.
    fn arrive(&mut self, forward: bool) {
        let Some(question) = self.current() else {
            return;
        };

        if forward && self.rest.arrive(question.id) {
            tracing::debug!("Rest screen opened at {}", question.id);
        }

        if let QuestionKind::Ranked { source, fallback } = question.kind {
            let source_active = self.active_sequence().iter().any(|q| q.id == source);
            let seeded = if source_active {
                let picked = self
                    .answers
                    .get(source)
                    .and_then(AnswerValue::as_list)
                    .unwrap_or_default();
                self.ranking.seed_with(picked.iter().cloned())
            } else {
                self.ranking.seed_with(fallback.iter().map(|s| s.to_string()))
            };
            if seeded {
                tracing::debug!("Ranking for {} seeded with {} items", question.id, self.ranking.items().len());
            }
        }
    }
}

/// Checks options and bounds, clamps numbers and truncates text.
fn normalize(question: &Question, value: AnswerValue) -> Result<AnswerValue, FlowError> {
    match (question.kind, value) {
        (QuestionKind::Single { options }, AnswerValue::Single(choice)) => {
            ensure_option(question.id, options, &choice)?;
            Ok(AnswerValue::Single(choice))
        }
        (QuestionKind::Multi { options }, AnswerValue::Multi(choices)) => {
            for choice in &choices {
                ensure_option(question.id, options, choice)?;
            }
            Ok(AnswerValue::Multi(choices))
        }
        (QuestionKind::Range { min, max, step }, AnswerValue::Number(n)) => {
            if !n.is_finite() {
                return Err(FlowError::InvalidNumber);
            }
            let clamped = n.clamp(min, max);
            let snapped = if step > 0.0 {
                (min + ((clamped - min) / step).round() * step).min(max)
            } else {
                clamped
            };
            Ok(AnswerValue::Number(snapped))
        }
        (QuestionKind::Text { .. }, AnswerValue::Text(text)) => {
            Ok(AnswerValue::Text(text.chars().take(MAX_FREE_TEXT_CHARS).collect()))
        }
        (_, value) => Ok(value),
    }
}

fn ensure_option(question_id: &'static str, options: &[&str], choice: &str) -> Result<(), FlowError> {
    if options.iter().any(|o| *o == choice) {
        Ok(())
    } else {
        Err(FlowError::UnknownOption { question_id, option: choice.to_string() })
    }
}
