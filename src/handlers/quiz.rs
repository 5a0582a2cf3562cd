// src/handlers/quiz.rs

use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    handlers::report,
    models::{
        answer::{AnswerRequest, MoveRankedRequest},
        question::PublicQuestion,
        session::SessionResponse,
    },
    quiz::{FlowError, QuizFlow, Step, catalog::QUESTIONS},
    state::AppState,
};

/// Lists the full question catalog (visibility predicates are applied per session).
pub async fn list_questions() -> Json<Vec<PublicQuestion>> {
    Json(QUESTIONS.iter().map(|q| q.to_public()).collect())
}

/// Starts a new quiz session positioned on the first question.
pub async fn start_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let response = state.sessions.create().await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    snapshot(&state, id).await
}

/// Records an answer for the current question.
///
/// Single-choice answers wait out the visual-feedback delay and then advance,
/// which may complete the quiz and generate the report. The response reflects
/// the state after the advance.
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let token = state
        .sessions
        .update(id, |session| {
            let flow = session.quiz_mut()?;
            let token = match &req {
                AnswerRequest::Single { option } => flow.select_option(option)?,
                AnswerRequest::Toggle { option } => {
                    flow.toggle_option(option)?;
                    None
                }
                AnswerRequest::Number { value } => {
                    flow.set_number(*value)?;
                    None
                }
                AnswerRequest::Text { value } => {
                    flow.set_text(value)?;
                    None
                }
            };
            Ok(token)
        })
        .await?;

    if let Some(token) = token {
        // Own task: a client that hangs up during the delay still gets moved on.
        let delay = Duration::from_millis(state.config.auto_advance_delay_ms);
        let task_state = state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            run_step(&task_state, id, move |flow| flow.auto_advance(token)).await
        })
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))??;
    }

    snapshot(&state, id).await
}

/// Moves to the next question; on the last one, completes the quiz.
pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    run_step(&state, id, |flow| flow.advance()).await?;
    snapshot(&state, id).await
}

pub async fn retreat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    state
        .sessions
        .update(id, |session| {
            session.quiz_mut()?.retreat()?;
            session.response(id)
        })
        .await
        .map(Json)
}

/// Closes the rest screen; the quiz stays on the same question.
pub async fn dismiss_rest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    state
        .sessions
        .update(id, |session| {
            session.quiz_mut()?.dismiss_rest();
            session.response(id)
        })
        .await
        .map(Json)
}

pub async fn move_ranked(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveRankedRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    state
        .sessions
        .update(id, |session| {
            session.quiz_mut()?.move_ranked(req.index, req.direction)?;
            session.response(id)
        })
        .await
        .map(Json)
}

/// Applies a forward move. Completion flips the session to generating under the
/// same lock, so a second submission sees the conflict.
async fn run_step<F>(state: &AppState, id: Uuid, action: F) -> Result<(), AppError>
where
    F: FnOnce(&mut QuizFlow) -> Result<Step, FlowError>,
{
    let step = state
        .sessions
        .update(id, |session| {
            let step = action(session.quiz_mut()?)?;
            if matches!(step, Step::Completed(_)) {
                session.begin_generation();
            }
            Ok(step)
        })
        .await?;

    if let Step::Completed(answers) = step {
        report::generate_report(state.clone(), id, answers).await?;
    }
    Ok(())
}

async fn snapshot(state: &AppState, id: Uuid) -> Result<Json<SessionResponse>, AppError> {
    state
        .sessions
        .read(id, |session| session.response(id))
        .await
        .map(Json)
}
