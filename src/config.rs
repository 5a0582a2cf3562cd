// src/config.rs

use std::env;
use dotenvy::dotenv;
use url::Url;

/// Free-text answers are cut to this many characters.
pub const MAX_FREE_TEXT_CHARS: usize = 500;

/// Upper bound for a single chat message.
pub const MAX_CHAT_MESSAGE_CHARS: u64 = 2000;

/// Timeout applied to every call to the language-model service.
pub const LLM_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_AUTO_ADVANCE_DELAY_MS: u64 = 200;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Lead store connection. Lead capture is unavailable without it.
    pub database_url: Option<String>,
    /// Report generation and chat degrade to error/fallback states without it.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub rust_log: String,
    pub port: u16,
    /// Directory holding the browser front end.
    pub static_dir: String,
    /// Visual-feedback pause before a single-choice answer advances the quiz.
    pub auto_advance_delay_ms: u64,
    /// Quiz sessions idle for longer than this are dropped.
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = non_empty_var("DATABASE_URL");
        let gemini_api_key = non_empty_var("GEMINI_API_KEY");

        let gemini_model = env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

        let gemini_base_url = gemini_base_url_or_default(env::var("GEMINI_BASE_URL").ok());

        let rust_log = Self::log_filter();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let static_dir = env::var("STATIC_DIR")
            .unwrap_or_else(|_| "public".to_string());

        let auto_advance_delay_ms = env::var("AUTO_ADVANCE_DELAY_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
            .unwrap_or(DEFAULT_AUTO_ADVANCE_DELAY_MS);

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Self {
            database_url,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            rust_log,
            port,
            static_dir,
            auto_advance_delay_ms,
            session_ttl_secs,
        }
    }

    /// Log filter directive. Read on its own so tracing can be installed
    /// before the rest of the configuration is parsed.
    pub fn log_filter() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    }
}

/// Validates an override of the Gemini base URL, falling back to the default.
pub fn gemini_base_url_or_default(raw: Option<String>) -> String {
    match raw {
        Some(raw) if Url::parse(&raw).is_ok() => raw.trim_end_matches('/').to_string(),
        Some(raw) => {
            tracing::warn!("Ignoring invalid GEMINI_BASE_URL '{}'", raw);
            DEFAULT_GEMINI_BASE_URL.to_string()
        }
        None => DEFAULT_GEMINI_BASE_URL.to_string(),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_override_is_validated() {
        assert_eq!(gemini_base_url_or_default(None), DEFAULT_GEMINI_BASE_URL);
        assert_eq!(
            gemini_base_url_or_default(Some("not a url".to_string())),
            DEFAULT_GEMINI_BASE_URL
        );
        assert_eq!(
            gemini_base_url_or_default(Some("http://localhost:8080/".to_string())),
            "http://localhost:8080"
        );
    }
}
