//! Repository for the `projects` table.

use agora_core::multiloc::Multiloc;
use agora_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::Project;

const COLUMNS: &str = "id, slug, title_multiloc, created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn create(
        pool: &PgPool,
        slug: &str,
        title_multiloc: &Multiloc,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (slug, title_multiloc) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(slug)
            .bind(Json(title_multiloc))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
