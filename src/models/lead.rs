// src/models/lead.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::report::Report;

/// DTO for the email-capture form.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeadRequest {
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
}

/// Row to insert into the 'leads' table.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub email: String,
    pub persona: String,
    pub report: Report,
}

/// What the store hands back after a successful insert.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LeadReceipt {
    pub id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
