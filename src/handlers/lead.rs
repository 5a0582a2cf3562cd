// src/handlers/lead.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::lead::{CreateLeadRequest, NewLead},
    state::AppState,
};

/// Saves the visitor's email with their persona and full report.
/// The configuration check happens before any network call; store failures
/// are surfaced as-is so the form can be resubmitted.
pub async fn capture_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateLeadRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let store = state.leads.store()?;

    let lead = state
        .sessions
        .read(id, |session| {
            let bundle = session.report()?;
            Ok(NewLead {
                email: payload.email.trim().to_string(),
                persona: bundle.report.persona_name.clone(),
                report: bundle.report.clone(),
            })
        })
        .await?;

    let receipt = store.save(&lead).await?;
    tracing::info!("Lead {} captured for session {}", receipt.id, id);

    state
        .sessions
        .update(id, |session| {
            session.report_mut()?.lead_saved = true;
            Ok(())
        })
        .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}
