// src/services/gemini.rs
//
// Report generation and chat over the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    config::{Config, LLM_REQUEST_TIMEOUT_SECS},
    models::{
        answer::AnswerMap,
        chat::{ChatRole, ChatTurn},
        report::Report,
    },
    quiz::catalog::{self, QUESTIONS},
    services::{ChatAssistant, LlmError, ReportGenerator},
};

pub const CHAT_UNREACHABLE: &str = "I'm having trouble connecting right now.";
pub const CHAT_BUSY: &str =
    "Sorry, I'm experiencing a high volume of requests. Please try again in a moment.";
pub const CHAT_EMPTY: &str = "I didn't catch that. Could you rephrase?";

const REPORT_TEMPERATURE: f64 = 0.7;

/// Periods the forecast is asked for, in order.
const FORECAST_PERIODS: [&str; 4] = ["Week 1-2", "Week 3-4", "Month 2", "Month 6"];

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LLM_REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Sends a request body and returns the first non-empty text part.
    async fn send(&self, body: &Value) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http { status: status.as_u16(), body });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        parsed.first_text().ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl ReportGenerator for GeminiClient {
    async fn generate(&self, answers: &AnswerMap) -> Result<Report, LlmError> {
        let body = report_request(answers);
        let text = self.send(&body).await.inspect_err(|e| {
            tracing::error!("Report generation failed: {}", e);
        })?;
        parse_report(&text)
    }
}

#[async_trait]
impl ChatAssistant for GeminiClient {
    async fn reply(&self, history: &[ChatTurn], message: &str, report: &Report) -> String {
        let body = chat_request(history, message, report);
        match self.send(&body).await {
            Ok(text) => text,
            Err(LlmError::EmptyResponse) => CHAT_EMPTY.to_string(),
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                chat_fallback(&e).to_string()
            }
        }
    }
}

/// Unreachable or unconfigured services and busy services get different wording.
pub fn chat_fallback(err: &LlmError) -> &'static str {
    match err {
        LlmError::MissingApiKey | LlmError::Network(_) => CHAT_UNREACHABLE,
        LlmError::EmptyResponse => CHAT_EMPTY,
        LlmError::RateLimited | LlmError::Http { .. } | LlmError::Malformed(_) => CHAT_BUSY,
    }
}

pub fn report_prompt(answers: &AnswerMap) -> String {
    let sheet = catalog::answer_sheet(&QUESTIONS, answers);
    let sheet = serde_json::to_string_pretty(&sheet).unwrap_or_else(|_| sheet.to_string());

    format!(
        "Act as a world-class automation consultant.\n\
         Analyze the following user data from a \"TimeBack Studio\" quiz and generate a personalized automation plan.\n\n\
         User Data:\n{}\n\n\
         The tone should be empathetic, encouraging, and professional.\n\
         For the 'weeklyForecast', generate data points for: {}.\n\
         Ensure the 'roadmap' items directly address the pain points identified in the data.",
        sheet,
        FORECAST_PERIODS
            .iter()
            .map(|p| format!("\"{}\"", p))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

pub fn report_request(answers: &AnswerMap) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": report_prompt(answers) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": report_schema(),
            "temperature": REPORT_TEMPERATURE,
        }
    })
}

pub fn chat_request(history: &[ChatTurn], message: &str, report: &Report) -> Value {
    let context = serde_json::to_string_pretty(report).unwrap_or_default();
    let system = format!(
        "You are the TimeBack Studio AI Assistant. You are friendly, helpful, and an expert in business automation.\n\
         You have access to the user's quiz results and their generated report.\n\n\
         User Context:\n{}\n\n\
         Answer questions specifically about their automation plan. Keep answers concise (under 100 words) unless asked for detail.",
        context
    );

    let mut contents: Vec<Value> = history
        .iter()
        .map(|turn| {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
            };
            json!({ "role": role, "parts": [{ "text": turn.text }] })
        })
        .collect();
    contents.push(json!({ "role": "user", "parts": [{ "text": message }] }));

    json!({
        "systemInstruction": { "parts": [{ "text": system }] },
        "contents": contents,
    })
}

/// Structured-output schema matching [`Report`].
pub fn report_schema() -> Value {
    let string = json!({ "type": "STRING" });
    let number = json!({ "type": "NUMBER" });

    json!({
        "type": "OBJECT",
        "properties": {
            "personaName": { "type": "STRING", "description": "A creative name for the user's situation" },
            "executiveSummary": { "type": "STRING", "description": "2-3 sentences summarizing their situation" },
            "opportunityScore": { "type": "NUMBER", "description": "0-100 score" },
            "estimatedHoursSaved": { "type": "NUMBER", "description": "Estimated hours saved per week" },
            "topPriorities": {
                "type": "ARRAY",
                "items": string,
                "description": "Top 3 areas to focus on"
            },
            "quickWins": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": { "title": string, "tool": string, "description": string }
                }
            },
            "roadmap": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "taskName": string,
                        "difficulty": { "type": "STRING", "enum": ["Easy", "Medium", "Advanced"] },
                        "timeSavings": string,
                        "tools": string,
                        "blueprint": { "type": "STRING", "description": "A simple 3 step list" },
                        "approach": { "type": "STRING", "enum": ["DIY", "Hire Help"] }
                    }
                }
            },
            "expertHelp": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": { "area": string, "roi": string, "description": string }
                }
            },
            "weeklyForecast": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": { "week": string, "hoursSaved": number }
                }
            }
        },
        "required": ["personaName", "executiveSummary", "opportunityScore", "roadmap", "quickWins", "weeklyForecast"]
    })
}

/// Parses and validates the model's JSON text.
pub fn parse_report(text: &str) -> Result<Report, LlmError> {
    let report: Report =
        serde_json::from_str(text.trim()).map_err(|e| LlmError::Malformed(e.to_string()))?;
    report
        .validate()
        .map_err(|e| LlmError::Malformed(e.to_string()))?;
    Ok(report)
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .find(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer::AnswerValue;

    fn sample_report() -> Report {
        serde_json::from_value(json!({
            "personaName": "The Solo Operator",
            "executiveSummary": "Lots of admin.",
            "opportunityScore": 70,
            "quickWins": [],
            "roadmap": [],
            "weeklyForecast": [{ "week": "Week 1-2", "hoursSaved": 1.5 }]
        }))
        .unwrap()
    }

    #[test]
    fn report_request_embeds_answers_and_schema() {
        let mut answers = AnswerMap::new();
        answers.insert("q1", AnswerValue::Single("Freelancer/Consultant".into()));
        answers.insert("q4", AnswerValue::Number(15.0));

        let body = report_request(&answers);
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();

        assert!(prompt.contains("Freelancer/Consultant"));
        assert!(prompt.contains("How many hours per week"));
        assert!(prompt.contains("\"Month 6\""));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["required"][0], "personaName");
    }

    #[test]
    fn chat_request_maps_roles_and_appends_message() {
        let history = vec![ChatTurn::user("Hi"), ChatTurn::assistant("Hello!")];
        let body = chat_request(&history, "Which tool first?", &sample_report());

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "Which tool first?");

        let system = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(system.contains("The Solo Operator"));
    }

    #[test]
    fn first_text_skips_blank_parts() {
        let raw = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "  " }] } },
                { "content": { "parts": [{ "text": "{\"a\":1}" }] } }
            ]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_text(), None);
    }

    #[test]
    fn parse_report_rejects_invalid_payloads() {
        assert!(matches!(parse_report("not json"), Err(LlmError::Malformed(_))));

        let mut value = serde_json::to_value(sample_report()).unwrap();
        value["opportunityScore"] = json!(250);
        assert!(matches!(
            parse_report(&value.to_string()),
            Err(LlmError::Malformed(_))
        ));

        let ok = serde_json::to_string(&sample_report()).unwrap();
        assert_eq!(parse_report(&ok).unwrap(), sample_report());
    }

    #[test]
    fn fallback_wording_depends_on_failure() {
        assert_eq!(chat_fallback(&LlmError::MissingApiKey), CHAT_UNREACHABLE);
        assert_eq!(chat_fallback(&LlmError::Network("refused".into())), CHAT_UNREACHABLE);
        assert_eq!(chat_fallback(&LlmError::RateLimited), CHAT_BUSY);
        assert_eq!(chat_fallback(&LlmError::EmptyResponse), CHAT_EMPTY);
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let config = Config {
            database_url: None,
            gemini_api_key: None,
            gemini_model: "test-model".to_string(),
            gemini_base_url: "http://127.0.0.1:9".to_string(),
            rust_log: "error".to_string(),
            port: 0,
            static_dir: "public".to_string(),
            auto_advance_delay_ms: 0,
            session_ttl_secs: 3600,
        };
        let client = GeminiClient::new(&config);

        assert_eq!(
            client.generate(&AnswerMap::new()).await,
            Err(LlmError::MissingApiKey)
        );
        assert_eq!(
            client.reply(&[], "hello", &sample_report()).await,
            CHAT_UNREACHABLE
        );
    }
}
