//! Repository for the `comments` table.

use agora_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::models::comment::{Comment, CreateComment};

/// Column list for `comments` queries.
const COLUMNS: &str = "\
    id, post_id, post_type, author_id, parent_id, body_multiloc, created_at, updated_at";

pub struct CommentRepo;

impl CommentRepo {
    pub async fn create<'e, E>(executor: E, input: &CreateComment) -> Result<Comment, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO comments (post_id, post_type, author_id, parent_id, body_multiloc) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.post_id)
            .bind(&input.post_type)
            .bind(input.author_id)
            .bind(input.parent_id)
            .bind(Json(&input.body_multiloc))
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment together with every reply below it.
    ///
    /// Returns the ids of all removed rows, the comment itself first. Empty
    /// when the comment does not exist.
    pub async fn delete_thread<'e, E>(executor: E, id: DbId) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut ids: Vec<DbId> = sqlx::query_scalar(
            "WITH RECURSIVE thread AS ( \
                 SELECT id FROM comments WHERE id = $1 \
                 UNION ALL \
                 SELECT c.id FROM comments c JOIN thread t ON c.parent_id = t.id \
             ) \
             DELETE FROM comments WHERE id IN (SELECT id FROM thread) \
             RETURNING id",
        )
        .bind(id)
        .fetch_all(executor)
        .await?;
        ids.sort_unstable_by_key(|&removed| (removed != id, removed));
        Ok(ids)
    }

    /// Author of the idea or initiative a comment was written on.
    pub async fn post_author_id(
        pool: &PgPool,
        comment_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let author: Option<Option<DbId>> = sqlx::query_scalar(
            "SELECT COALESCE(i.author_id, ini.author_id) \
             FROM comments c \
             LEFT JOIN ideas i ON c.post_type = 'Idea' AND i.id = c.post_id \
             LEFT JOIN initiatives ini ON c.post_type = 'Initiative' AND ini.id = c.post_id \
             WHERE c.id = $1",
        )
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;
        Ok(author.flatten())
    }
}
