//! Repositories for the `ideas` and `initiatives` tables.

use agora_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::idea::{CreateIdea, CreateInitiative, Idea, Initiative};

const IDEA_COLUMNS: &str = "\
    id, project_id, author_id, slug, title_multiloc, body_multiloc, \
    published_at, created_at, updated_at";

const INITIATIVE_COLUMNS: &str = "\
    id, author_id, slug, title_multiloc, body_multiloc, \
    published_at, created_at, updated_at";

pub struct IdeaRepo;

impl IdeaRepo {
    pub async fn create(pool: &PgPool, input: &CreateIdea) -> Result<Idea, sqlx::Error> {
        let query = format!(
            "INSERT INTO ideas (project_id, author_id, slug, title_multiloc, body_multiloc, published_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             RETURNING {IDEA_COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(input.project_id)
            .bind(input.author_id)
            .bind(&input.slug)
            .bind(Json(&input.title_multiloc))
            .bind(Json(&input.body_multiloc))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!("SELECT {IDEA_COLUMNS} FROM ideas WHERE id = $1");
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Distinct authors of ideas in a project.
    pub async fn author_ids_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT author_id FROM ideas \
             WHERE project_id = $1 AND author_id IS NOT NULL \
             ORDER BY author_id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}

pub struct InitiativeRepo;

impl InitiativeRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateInitiative,
    ) -> Result<Initiative, sqlx::Error> {
        let query = format!(
            "INSERT INTO initiatives (author_id, slug, title_multiloc, body_multiloc, published_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             RETURNING {INITIATIVE_COLUMNS}"
        );
        sqlx::query_as::<_, Initiative>(&query)
            .bind(input.author_id)
            .bind(&input.slug)
            .bind(Json(&input.title_multiloc))
            .bind(Json(&input.body_multiloc))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Initiative>, sqlx::Error> {
        let query = format!("SELECT {INITIATIVE_COLUMNS} FROM initiatives WHERE id = $1");
        sqlx::query_as::<_, Initiative>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
