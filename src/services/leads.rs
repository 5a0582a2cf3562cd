// src/services/leads.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use crate::{
    error::AppError,
    models::lead::{LeadReceipt, NewLead},
    services::LeadStore,
};

/// Inserts captured leads into the 'leads' table.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn save(&self, lead: &NewLead) -> Result<LeadReceipt, AppError> {
        sqlx::query_as::<_, LeadReceipt>(
            r#"
            INSERT INTO leads (email, persona, report_data)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(&lead.email)
        .bind(&lead.persona)
        .bind(Json(&lead.report))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save lead: {:?}", e);
            AppError::SubmissionFailed(e.to_string())
        })
    }
}
