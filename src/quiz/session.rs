// src/quiz/session.rs

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{sync::RwLock, task::JoinHandle};
use uuid::Uuid;

use crate::{
    config::DEFAULT_SESSION_TTL_SECS,
    error::AppError,
    models::{
        answer::AnswerMap,
        chat::ChatTurn,
        report::Report,
        session::{PhaseName, ReportResponse, SessionResponse},
    },
    quiz::flow::QuizFlow,
};

/// Report data kept after generation succeeded.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub report: Report,
    pub answers: AnswerMap,
    pub chat: Vec<ChatTurn>,
    /// At most one chat request per session is in flight.
    pub chat_pending: bool,
    pub lead_saved: bool,
}

#[derive(Debug, Clone, Default)]
pub enum Phase {
    #[default]
    Quiz,
    /// Exactly one report request is outstanding.
    Generating,
    Report(Box<ReportBundle>),
}

/// One visitor's walk through the funnel.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    pub flow: QuizFlow,
    pub phase: Phase,
}

impl QuizSession {
    /// The flow, as long as the quiz is still being answered.
    pub fn quiz_mut(&mut self) -> Result<&mut QuizFlow, AppError> {
        match self.phase {
            Phase::Quiz => Ok(&mut self.flow),
            Phase::Generating => Err(AppError::Conflict(
                "Your report is already being generated".to_string(),
            )),
            Phase::Report(_) => Err(AppError::Conflict("The quiz is already complete".to_string())),
        }
    }

    pub fn report(&self) -> Result<&ReportBundle, AppError> {
        match &self.phase {
            Phase::Report(bundle) => Ok(&**bundle),
            _ => Err(AppError::Conflict("The report is not ready yet".to_string())),
        }
    }

    pub fn report_mut(&mut self) -> Result<&mut ReportBundle, AppError> {
        match &mut self.phase {
            Phase::Report(bundle) => Ok(&mut **bundle),
            _ => Err(AppError::Conflict("The report is not ready yet".to_string())),
        }
    }

    pub fn begin_generation(&mut self) {
        self.phase = Phase::Generating;
    }

    pub fn finish_generation(&mut self, report: Report, answers: AnswerMap) {
        self.phase = Phase::Report(Box::new(ReportBundle {
            report,
            answers,
            chat: Vec::new(),
            chat_pending: false,
            lead_saved: false,
        }));
    }

    pub fn response(&self, session_id: Uuid) -> Result<SessionResponse, AppError> {
        let (phase, quiz) = match self.phase {
            Phase::Quiz => (PhaseName::Quiz, Some(self.flow.view()?)),
            Phase::Generating => (PhaseName::Generating, None),
            Phase::Report(_) => (PhaseName::Report, None),
        };
        Ok(SessionResponse { session_id, phase, quiz })
    }

    pub fn report_response(&self) -> Result<ReportResponse, AppError> {
        let bundle = self.report()?;
        Ok(ReportResponse {
            report: bundle.report.clone(),
            answers: bundle.answers.clone(),
            chat: bundle.chat.clone(),
            lead_saved: bundle.lead_saved,
        })
    }
}

struct Tracked {
    session: QuizSession,
    last_seen: Instant,
}

impl Tracked {
    /// A session waiting on the report generator never expires.
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        !matches!(self.session.phase, Phase::Generating)
            && now.duration_since(self.last_seen) > ttl
    }
}

/// In-memory sessions. Nothing is persisted; a restart starts everyone over.
///
/// Every lookup refreshes the idle clock. Expired sessions read as missing
/// right away and are dropped by [`SessionStore::purge_expired`].
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Tracked>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn create(&self) -> Result<SessionResponse, AppError> {
        let id = Uuid::new_v4();
        let session = QuizSession::default();
        let response = session.response(id)?;
        self.inner.write().await.insert(id, Tracked { session, last_seen: Instant::now() });
        tracing::info!("Quiz session {} started", id);
        Ok(response)
    }

    /// Runs `f` against the session under the write lock.
    pub async fn update<T, F>(&self, id: Uuid, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut QuizSession) -> Result<T, AppError>,
    {
        let mut sessions = self.inner.write().await;
        let tracked = self.live(&mut sessions, id)?;
        f(&mut tracked.session)
    }

    /// Same as [`SessionStore::update`] for read-only access. Still takes the
    /// write lock, since the lookup touches the idle clock.
    pub async fn read<T, F>(&self, id: Uuid, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&QuizSession) -> Result<T, AppError>,
    {
        let mut sessions = self.inner.write().await;
        let tracked = self.live(&mut sessions, id)?;
        f(&tracked.session)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drops every idle session and returns how many went.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, tracked| !tracked.is_expired(self.ttl, now));
        before - sessions.len()
    }

    /// Background sweep; runs until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    tracing::info!(
                        "Dropped {} idle quiz sessions, {} still active",
                        purged,
                        store.len().await
                    );
                }
            }
        })
    }

    fn live<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, Tracked>,
        id: Uuid,
    ) -> Result<&'a mut Tracked, AppError> {
        let now = Instant::now();
        if sessions.get(&id).is_some_and(|t| t.is_expired(self.ttl, now)) {
            sessions.remove(&id);
            tracing::debug!("Session {} expired", id);
        }
        let tracked = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
        tracked.last_seen = now;
        Ok(tracked)
    }
}
