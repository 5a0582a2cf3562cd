// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{chat, lead, quiz, report},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Nests the catalog and session sub-routers under `/api`.
/// * Serves the front end from `static_dir` for everything else.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let quiz_routes = Router::new().route("/questions", get(quiz::list_questions));

    let session_routes = Router::new()
        .route("/", post(quiz::start_session))
        .route("/{id}", get(quiz::get_session))
        .route("/{id}/answer", post(quiz::submit_answer))
        .route("/{id}/next", post(quiz::advance))
        .route("/{id}/back", post(quiz::retreat))
        .route("/{id}/rest/dismiss", post(quiz::dismiss_rest))
        .route("/{id}/ranking", post(quiz::move_ranked))
        // Available once the report exists
        .route("/{id}/report", get(report::get_report))
        .route("/{id}/chat", post(chat::send_message))
        .route("/{id}/lead", post(lead::capture_lead));

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .nest("/api/quiz", quiz_routes)
        .nest("/api/sessions", session_routes)
        .fallback_service(static_files)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
