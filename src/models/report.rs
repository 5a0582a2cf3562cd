// src/models/report.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Personalized automation report, as produced by the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// A short descriptor of the user's situation, e.g. "The Juggling Founder".
    pub persona_name: String,
    pub executive_summary: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub opportunity_score: f64,
    /// Hours per week.
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub estimated_hours_saved: f64,
    #[serde(default)]
    pub top_priorities: Vec<String>,
    pub quick_wins: Vec<QuickWin>,
    pub roadmap: Vec<RoadmapItem>,
    #[serde(default)]
    pub expert_help: Vec<ExpertHelpItem>,
    pub weekly_forecast: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickWin {
    pub title: String,
    pub tool: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapItem {
    pub task_name: String,
    pub difficulty: Difficulty,
    /// e.g. "2 hrs/week"
    pub time_savings: String,
    pub tools: String,
    /// Multi-step implementation guide.
    pub blueprint: String,
    pub approach: Approach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Approach {
    #[serde(rename = "DIY")]
    Diy,
    #[serde(rename = "Hire Help")]
    HireHelp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertHelpItem {
    pub area: String,
    pub roi: String,
    pub description: String,
}

/// One point of the cumulative hours-saved forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    #[serde(rename = "week")]
    pub period: String,
    pub hours_saved: f64,
}
