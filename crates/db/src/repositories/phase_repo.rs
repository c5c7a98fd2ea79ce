//! Repository for the `phases` table.

use agora_core::types::DbId;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::{CreatePhase, Phase};

const COLUMNS: &str =
    "id, project_id, title_multiloc, start_at, end_at, created_at, updated_at";

pub struct PhaseRepo;

impl PhaseRepo {
    pub async fn create(pool: &PgPool, input: &CreatePhase) -> Result<Phase, sqlx::Error> {
        let query = format!(
            "INSERT INTO phases (project_id, title_multiloc, start_at, end_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Phase>(&query)
            .bind(input.project_id)
            .bind(Json(&input.title_multiloc))
            .bind(input.start_at)
            .bind(input.end_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Phase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM phases WHERE id = $1");
        sqlx::query_as::<_, Phase>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Phases whose first day is `date`.
    pub async fn list_starting_on(
        pool: &PgPool,
        date: NaiveDate,
    ) -> Result<Vec<Phase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM phases WHERE start_at = $1 ORDER BY id");
        sqlx::query_as::<_, Phase>(&query)
            .bind(date)
            .fetch_all(pool)
            .await
    }
}
