// src/main.rs

use std::net::SocketAddr;
use std::time::Duration;

use dotenvy::dotenv;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use timeback::config::Config;
use timeback::routes;
use timeback::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(Config::log_filter());
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Load configuration from environment
    let config = Config::from_env();

    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set: report generation and chat will be unavailable");
    }

    // The lead store is optional; without it lead capture answers with a configuration error
    let pool = match &config.database_url {
        Some(url) => connect_lead_store(url).await,
        None => {
            tracing::warn!("DATABASE_URL not set: lead capture is disabled");
            None
        }
    };

    let state = AppState::new(config.clone(), pool);
    state.sessions.spawn_sweeper(SESSION_SWEEP_INTERVAL);

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}

/// Connects with retry and applies migrations. Any failure leaves lead capture disabled.
async fn connect_lead_store(database_url: &str) -> Option<PgPool> {
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Giving up on the lead store after 5 retries: {}", e);
                    return None;
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
        return None;
    }
    tracing::info!("Migrations applied successfully.");

    Some(pool)
}
