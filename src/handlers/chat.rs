// src/handlers/chat.rs

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::chat::{ChatRequest, ChatResponse, ChatTurn},
    state::AppState,
};

/// Sends a message to the report assistant.
///
/// * Only available once the report exists.
/// * One outstanding request per session; a second one gets 409.
/// * Assistant failures come back as a fallback reply, never as an error.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let (history, report) = state
        .sessions
        .update(id, |session| {
            let bundle = session.report_mut()?;
            if bundle.chat_pending {
                return Err(AppError::Conflict(
                    "Please wait for the assistant to reply".to_string(),
                ));
            }
            bundle.chat_pending = true;
            Ok((bundle.chat.clone(), bundle.report.clone()))
        })
        .await?;

    let task = tokio::spawn(async move {
        let reply = state.assistant.reply(&history, &message, &report).await;

        state
            .sessions
            .update(id, |session| {
                let bundle = session.report_mut()?;
                bundle.chat_pending = false;
                bundle.chat.push(ChatTurn::user(message));
                bundle.chat.push(ChatTurn::assistant(reply.clone()));
                Ok(ChatResponse {
                    reply,
                    history: bundle.chat.clone(),
                })
            })
            .await
    });

    let response = task
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))??;

    Ok(Json(response))
}
