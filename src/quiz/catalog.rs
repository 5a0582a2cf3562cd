// src/quiz/catalog.rs

use serde_json::{Value, json};

use crate::models::{
    answer::AnswerMap,
    question::{Question, QuestionKind, Section},
    session::RestScreen,
};
use crate::quiz::rest::RestPlan;

pub const FOUNDER: &str = "Founder/Business owner";

/// Used for the ranking question when its source question never shows up.
pub const DEFAULT_RANKING: &[&str] = &["Email", "Meetings", "Data Entry", "Social Media", "Support"];

fn is_founder(answers: &AnswerMap) -> bool {
    answers.single("q1") == Some(FOUNDER)
}

/// The questionnaire, in presentation order.
pub static QUESTIONS: [Question; 10] = [
    Question {
        id: "q1",
        section: Section::Profile,
        text: "What best describes your current situation?",
        kind: QuestionKind::Single {
            options: &[
                "Employed professional (full-time/part-time)",
                FOUNDER,
                "Freelancer/Consultant",
                "On parental leave building a side project",
                "Student or career changer",
                "Other",
            ],
        },
        visible_when: None,
    },
    Question {
        id: "q2",
        section: Section::Profile,
        text: "What's the size of your business?",
        kind: QuestionKind::Single {
            options: &[
                "Just me (solopreneur)",
                "2-5 people",
                "6-15 people",
                "16-50 people",
                "50+ people",
            ],
        },
        visible_when: Some(is_founder),
    },
    Question {
        id: "q3",
        section: Section::Profile,
        text: "Which describes you best?",
        kind: QuestionKind::Single {
            options: &[
                "Working parent juggling family + work",
                "Managing multiple income sources/jobs",
                "Building a business while employed",
                "Running everything solo in my business",
                "Other",
            ],
        },
        visible_when: None,
    },
    Question {
        id: "q4",
        section: Section::Pain,
        text: "How many hours per week do you spend on repetitive admin tasks?",
        kind: QuestionKind::Range { min: 0.0, max: 40.0, step: 1.0 },
        visible_when: None,
    },
    Question {
        id: "q5",
        section: Section::Pain,
        text: "Which areas consume most of your time?",
        kind: QuestionKind::Multi {
            options: &[
                "Email management & follow-ups",
                "Social media content & posting",
                "Client communication & scheduling",
                "Invoicing & financial admin",
                "Data entry & reporting",
                "Research & information gathering",
                "Meeting scheduling & coordination",
                "Content creation & repurposing",
                "Lead generation & outreach",
                "Customer support responses",
            ],
        },
        visible_when: None,
    },
    Question {
        id: "q6",
        section: Section::Pain,
        text: "Rank your biggest time-wasters (Top is biggest)",
        kind: QuestionKind::Ranked { source: "q5", fallback: DEFAULT_RANKING },
        visible_when: None,
    },
    Question {
        id: "q7",
        section: Section::Pain,
        text: "Describe one task that you do repeatedly that makes you think: 'There must be a better way to do this'",
        kind: QuestionKind::Text {
            placeholder: "e.g., Copying data from emails to a spreadsheet manually every morning...",
        },
        visible_when: None,
    },
    Question {
        id: "q8",
        section: Section::Readiness,
        text: "How familiar are you with automation tools?",
        kind: QuestionKind::Single {
            options: &[
                "Never heard of them",
                "Heard about them but never tried",
                "Tried basic tools (like email filters)",
                "Use some automation (Zapier, Make, etc.)",
                "I'm quite technical and comfortable",
            ],
        },
        visible_when: None,
    },
    Question {
        id: "q9",
        section: Section::Readiness,
        text: "What would you do with 10 extra hours per week?",
        kind: QuestionKind::Multi {
            options: &[
                "Spend more time with family",
                "Focus on high-value business activities",
                "Rest and self-care",
                "Learn new skills",
                "Take on more clients/projects",
                "Start a new project",
            ],
        },
        visible_when: None,
    },
    Question {
        id: "q10",
        section: Section::Readiness,
        text: "What's holding you back from automating?",
        kind: QuestionKind::Single {
            options: &[
                "Don't know where to start",
                "Seems too technical",
                "Don't have time to set it up",
                "Not sure what can be automated",
                "Worried about costs",
                "Already tried and failed",
                "Nothing, I'm ready!",
            ],
        },
        visible_when: None,
    },
];

/// Interstitials open on arrival at the pain section and at the readiness section.
pub const REST_PLAN: RestPlan = RestPlan {
    first: ("q4", RestScreen {
        text: "Breathe. You're taking the first step towards reclaiming your time.",
        image_id: 28,
    }),
    second: ("q8", RestScreen {
        text: "Imagine what you could build if the busy-work just... vanished.",
        image_id: 180,
    }),
};

/// Keeps only the questions whose predicate holds, in catalog order.
pub fn active_sequence<'a>(catalog: &'a [Question], answers: &AnswerMap) -> Vec<&'a Question> {
    catalog.iter().filter(|q| q.is_visible(answers)).collect()
}

/// Answer sheet handed to the report generator: every answered question with its
/// prompt text. Values whose shape does not match the declared kind are dropped.
pub fn answer_sheet(catalog: &[Question], answers: &AnswerMap) -> Value {
    let entries: Vec<Value> = catalog
        .iter()
        .filter_map(|q| {
            let value = answers.get(q.id)?;
            if !value.fits(&q.kind) {
                tracing::warn!("Dropping answer for {} with mismatched shape", q.id);
                return None;
            }
            Some(json!({
                "id": q.id,
                "section": q.section,
                "question": q.text,
                "answer": value,
            }))
        })
        .collect();

    Value::Array(entries)
}
