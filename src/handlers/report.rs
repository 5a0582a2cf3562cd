// src/handlers/report.rs

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{answer::AnswerMap, session::ReportResponse},
    services::LlmError,
    state::AppState,
};

pub const REPORTS_NOT_CONFIGURED: &str =
    "Report generation is not configured. Please set GEMINI_API_KEY in your environment.";

/// Returns the generated report together with the answers it was built from.
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    state
        .sessions
        .read(id, |session| session.report_response())
        .await
        .map(Json)
}

/// Sends the completed answers to the report generator.
///
/// Runs in its own task so a dropped connection cannot leave the session stuck
/// in the generating phase. On failure the session is discarded and the user
/// starts over from the entry point.
pub async fn generate_report(state: AppState, id: Uuid, answers: AnswerMap) -> Result<(), AppError> {
    let task = tokio::spawn(async move {
        match state.reports.generate(&answers).await {
            Ok(report) => {
                tracing::info!("Report '{}' generated for session {}", report.persona_name, id);
                state
                    .sessions
                    .update(id, |session| {
                        session.finish_generation(report, answers);
                        Ok(())
                    })
                    .await
            }
            Err(e) => {
                tracing::error!("Discarding session {} after failed generation: {}", id, e);
                state.sessions.remove(id).await;
                Err(match e {
                    LlmError::MissingApiKey => {
                        AppError::Configuration(REPORTS_NOT_CONFIGURED.to_string())
                    }
                    _ => AppError::GenerationFailed,
                })
            }
        }
    });

    task.await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
}
