// tests/common/mod.rs
#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use timeback::{
    config::Config,
    error::AppError,
    models::{
        answer::AnswerMap,
        chat::ChatTurn,
        lead::{LeadReceipt, NewLead},
        report::Report,
    },
    quiz::SessionStore,
    routes,
    services::{ChatAssistant, LeadCapture, LeadStore, LlmError, ReportGenerator},
    state::AppState,
};

pub const EMAIL_AREA: &str = "Email management & follow-ups";
pub const DATA_AREA: &str = "Data entry & reporting";

pub fn sample_report() -> Report {
    serde_json::from_value(json!({
        "personaName": "The Juggling Founder",
        "executiveSummary": "You lose a day a week to admin.",
        "opportunityScore": 78,
        "estimatedHoursSaved": 8,
        "topPriorities": ["Email", "Reporting"],
        "quickWins": [{ "title": "Inbox rules", "tool": "Gmail", "description": "Filter newsletters." }],
        "roadmap": [{
            "taskName": "Automate reporting",
            "difficulty": "Easy",
            "timeSavings": "2 hrs/week",
            "tools": "Sheets, Zapier",
            "blueprint": "1. Connect. 2. Map fields. 3. Schedule.",
            "approach": "DIY"
        }],
        "expertHelp": [],
        "weeklyForecast": [
            { "week": "Week 1-2", "hoursSaved": 2 },
            { "week": "Week 3-4", "hoursSaved": 6 },
            { "week": "Month 2", "hoursSaved": 20 },
            { "week": "Month 6", "hoursSaved": 120 }
        ]
    }))
    .expect("sample report must parse")
}

/// Report generator double: counts calls, remembers the last answers.
#[derive(Default)]
pub struct FakeReports {
    pub calls: AtomicUsize,
    pub last_answers: Mutex<Option<Value>>,
    pub delay: Duration,
    pub error: Option<LlmError>,
}

impl FakeReports {
    pub fn slow(delay: Duration) -> Self {
        Self { delay, ..Self::default() }
    }

    pub fn failing() -> Self {
        Self::erroring(LlmError::Network("connection reset".to_string()))
    }

    pub fn erroring(error: LlmError) -> Self {
        Self { error: Some(error), ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn answered_ids(&self) -> Vec<String> {
        let answers = self.last_answers.lock().unwrap();
        answers
            .as_ref()
            .and_then(Value::as_object)
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReportGenerator for FakeReports {
    async fn generate(&self, answers: &AnswerMap) -> Result<Report, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_answers.lock().unwrap() = Some(serde_json::to_value(answers).unwrap());
        tokio::time::sleep(self.delay).await;
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(sample_report()),
        }
    }
}

/// Replies with the message and the number of prior turns it saw.
pub struct EchoAssistant;

#[async_trait]
impl ChatAssistant for EchoAssistant {
    async fn reply(&self, history: &[ChatTurn], message: &str, report: &Report) -> String {
        format!("{} | {} | {} prior", report.persona_name, message, history.len())
    }
}

/// Takes its time before answering, so requests can overlap.
pub struct SlowAssistant {
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl SlowAssistant {
    pub fn new(delay: Duration) -> Self {
        Self { delay, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl ChatAssistant for SlowAssistant {
    async fn reply(&self, _history: &[ChatTurn], message: &str, _report: &Report) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        format!("slow reply to {}", message)
    }
}

#[derive(Default)]
pub struct MemoryLeads {
    pub saved: Mutex<Vec<NewLead>>,
    pub fail_with: Option<String>,
}

#[async_trait]
impl LeadStore for MemoryLeads {
    async fn save(&self, lead: &NewLead) -> Result<LeadReceipt, AppError> {
        if let Some(msg) = &self.fail_with {
            return Err(AppError::SubmissionFailed(msg.clone()));
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(lead.clone());
        Ok(LeadReceipt {
            id: saved.len() as i64,
            created_at: Utc::now(),
        })
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub reports: Arc<FakeReports>,
    pub leads: Option<Arc<MemoryLeads>>,
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        gemini_api_key: None,
        gemini_model: "test-model".to_string(),
        gemini_base_url: "http://127.0.0.1:9".to_string(),
        rust_log: "error".to_string(),
        port: 0,
        static_dir: "tests/no_such_dir".to_string(),
        auto_advance_delay_ms: 0,
        session_ttl_secs: 3600,
    }
}

/// Everything `spawn_app_from` wires into the router.
pub struct TestDoubles {
    pub config: Config,
    pub sessions: SessionStore,
    pub reports: FakeReports,
    pub assistant: Arc<dyn ChatAssistant>,
    pub leads: Option<MemoryLeads>,
}

impl Default for TestDoubles {
    fn default() -> Self {
        Self {
            config: test_config(),
            sessions: SessionStore::new(),
            reports: FakeReports::default(),
            assistant: Arc::new(EchoAssistant),
            leads: None,
        }
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_from(TestDoubles::default()).await
}

pub async fn spawn_app_with(reports: FakeReports, leads: Option<MemoryLeads>) -> TestApp {
    spawn_app_from(TestDoubles { reports, leads, ..TestDoubles::default() }).await
}

/// Spawns the app on a random port with the given collaborator doubles.
pub async fn spawn_app_from(doubles: TestDoubles) -> TestApp {
    let reports = Arc::new(doubles.reports);
    let leads = doubles.leads.map(Arc::new);

    let state = AppState {
        config: doubles.config,
        sessions: doubles.sessions,
        reports: reports.clone(),
        assistant: doubles.assistant,
        leads: match &leads {
            Some(store) => LeadCapture::Available(store.clone()),
            None => LeadCapture::Unavailable,
        },
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        reports,
        leads,
    }
}

impl TestApp {
    pub async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request");
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .client
            .post(format!("{}{}", self.address, path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    /// Starts a session and returns its id.
    pub async fn start(&self) -> String {
        let (status, body) = self.post("/api/sessions", json!({})).await;
        assert_eq!(status, 201);
        body["session_id"].as_str().unwrap().to_string()
    }

    pub async fn answer(&self, id: &str, body: Value) -> (u16, Value) {
        self.post(&format!("/api/sessions/{}/answer", id), body).await
    }

    pub async fn single(&self, id: &str, option: &str) -> (u16, Value) {
        self.answer(id, json!({ "kind": "single", "option": option })).await
    }

    pub async fn next(&self, id: &str) -> (u16, Value) {
        self.post(&format!("/api/sessions/{}/next", id), json!({})).await
    }

    pub async fn dismiss(&self, id: &str) -> (u16, Value) {
        self.post(&format!("/api/sessions/{}/rest/dismiss", id), json!({})).await
    }

    /// Answers everything up to and including q9, leaving the session on q10.
    pub async fn walk_to_last(&self, id: &str) {
        self.single(id, "Other").await;
        let (_, body) = self.single(id, "Other").await;
        assert_eq!(body["quiz"]["question"]["id"], "q4");
        self.dismiss(id).await;

        self.answer(id, json!({ "kind": "number", "value": 12 })).await;
        self.next(id).await;
        self.answer(id, json!({ "kind": "toggle", "option": EMAIL_AREA })).await;
        self.answer(id, json!({ "kind": "toggle", "option": DATA_AREA })).await;
        self.next(id).await;
        self.post(
            &format!("/api/sessions/{}/ranking", id),
            json!({ "index": 1, "direction": "up" }),
        )
        .await;
        self.next(id).await;
        self.answer(id, json!({ "kind": "text", "value": "Copying invoices into a sheet" }))
            .await;
        let (_, body) = self.next(id).await;
        assert_eq!(body["quiz"]["question"]["id"], "q8");
        self.dismiss(id).await;

        self.single(id, "Tried basic tools (like email filters)").await;
        self.answer(id, json!({ "kind": "toggle", "option": "Learn new skills" })).await;
        let (_, body) = self.next(id).await;
        assert_eq!(body["quiz"]["question"]["id"], "q10");
    }

    /// Runs a full quiz and returns the session id with the report ready.
    pub async fn complete_quiz(&self) -> String {
        let id = self.start().await;
        self.walk_to_last(&id).await;
        let (status, body) = self.single(&id, "Don't know where to start").await;
        assert_eq!(status, 200);
        assert_eq!(body["phase"], "report");
        id
    }
}
