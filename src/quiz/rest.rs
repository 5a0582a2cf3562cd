// src/quiz/rest.rs

use crate::models::session::RestScreen;

/// Which question opens each interstitial, and what it shows.
#[derive(Debug, Clone, Copy)]
pub struct RestPlan {
    pub first: (&'static str, RestScreen),
    pub second: (&'static str, RestScreen),
}

/// How far the interstitial progression has gone. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RestStage {
    Pending,
    FirstShown,
    Done,
}

/// Interstitial state: a forward-only stage plus the "currently resting" flag.
#[derive(Debug, Clone)]
pub struct RestProgress {
    plan: RestPlan,
    stage: RestStage,
    resting: Option<RestScreen>,
}

impl RestProgress {
    pub fn new(plan: RestPlan) -> Self {
        Self {
            plan,
            stage: RestStage::Pending,
            resting: None,
        }
    }

    pub fn stage(&self) -> RestStage {
        self.stage
    }

    pub fn is_resting(&self) -> bool {
        self.resting.is_some()
    }

    pub fn screen(&self) -> Option<RestScreen> {
        self.resting
    }

    /// Called when a question becomes current by moving forward.
    /// Returns true if this arrival opened an interstitial.
    pub fn arrive(&mut self, question_id: &str) -> bool {
        let (next, screen) = match self.stage {
            RestStage::Pending if question_id == self.plan.first.0 => {
                (RestStage::FirstShown, self.plan.first.1)
            }
            RestStage::FirstShown if question_id == self.plan.second.0 => {
                (RestStage::Done, self.plan.second.1)
            }
            _ => return false,
        };

        self.stage = next;
        self.resting = Some(screen);
        true
    }

    /// Closes the overlay. The stage stays where it is.
    pub fn dismiss(&mut self) -> bool {
        self.resting.take().is_some()
    }
}
