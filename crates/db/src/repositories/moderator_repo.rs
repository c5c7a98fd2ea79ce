//! Repository for the `project_moderators` table.

use agora_core::types::DbId;
use sqlx::PgPool;

pub struct ModeratorRepo;

impl ModeratorRepo {
    /// Make a user moderator of a project. Idempotent.
    pub async fn add(pool: &PgPool, project_id: DbId, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO project_moderators (project_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (project_id, user_id) DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Projects the user moderates.
    pub async fn project_ids_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT project_id FROM project_moderators WHERE user_id = $1 ORDER BY project_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Moderators of a project.
    pub async fn user_ids_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT user_id FROM project_moderators WHERE project_id = $1 ORDER BY user_id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
