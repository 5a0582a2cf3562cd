use std::{sync::Arc, time::Duration};

use sqlx::PgPool;

use crate::{
    config::Config,
    quiz::SessionStore,
    services::{
        ChatAssistant, LeadCapture, ReportGenerator, gemini::GeminiClient, leads::PgLeadStore,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub reports: Arc<dyn ReportGenerator>,
    pub assistant: Arc<dyn ChatAssistant>,
    pub leads: LeadCapture,
}

impl AppState {
    /// Wires the production collaborators. Lead capture is only available with a pool.
    pub fn new(config: Config, pool: Option<PgPool>) -> Self {
        let gemini = Arc::new(GeminiClient::new(&config));
        let sessions = SessionStore::with_ttl(Duration::from_secs(config.session_ttl_secs));
        let leads = match pool {
            Some(pool) => LeadCapture::Available(Arc::new(PgLeadStore::new(pool))),
            None => LeadCapture::Unavailable,
        };

        Self {
            config,
            sessions,
            reports: gemini.clone(),
            assistant: gemini,
            leads,
        }
    }
}
