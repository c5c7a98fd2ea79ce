//! Project and phase entity models and DTOs.

use agora_core::multiloc::Multiloc;
use agora_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub slug: String,
    pub title_multiloc: Json<Multiloc>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `phases` table. Dates are tenant-local calendar days.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Phase {
    pub id: DbId,
    pub project_id: DbId,
    pub title_multiloc: Json<Multiloc>,
    pub start_at: NaiveDate,
    pub end_at: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreatePhase {
    pub project_id: DbId,
    pub title_multiloc: Multiloc,
    pub start_at: NaiveDate,
    pub end_at: NaiveDate,
}
