//! Repository for the `activities` table.

use agora_core::content::ContentType;
use agora_core::pagination::{Page, Paged};
use agora_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::activity::{Activity, NewActivity};

/// Column list for `activities` queries.
const COLUMNS: &str = "\
    id, item_type, item_id, item_deleted, action, user_id, acted_at, \
    payload, dedup_key, created_at";

/// Activities are append-only; there is no update or delete.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert an activity.
    ///
    /// Returns `None` when `dedup_key` is set and an activity with the same
    /// key already exists. Activities without a key never conflict. Accepts a
    /// transaction so the follow-up job can be enqueued atomically.
    pub async fn create<'e, E>(
        executor: E,
        input: &NewActivity,
    ) -> Result<Option<Activity>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO activities \
                 (item_type, item_id, item_deleted, action, user_id, acted_at, payload, dedup_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT uq_activities_dedup_key DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(input.subject.content_type().as_str())
            .bind(input.subject.id())
            .bind(input.subject.is_deleted())
            .bind(input.action.as_str())
            .bind(input.user_id)
            .bind(input.acted_at)
            .bind(&input.payload)
            .bind(input.dedup_key.as_deref())
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE id = $1");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Activities about one subject, newest first. Includes activities
    /// recorded under the subject's composed identifier.
    pub async fn list_for_subject(
        pool: &PgPool,
        content_type: ContentType,
        item_id: DbId,
        page: Page,
    ) -> Result<Paged<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities \
             WHERE item_type = $1 AND item_id = $2 \
             ORDER BY acted_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        let items = sqlx::query_as::<_, Activity>(&query)
            .bind(content_type.as_str())
            .bind(item_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM activities WHERE item_type = $1 AND item_id = $2",
        )
        .bind(content_type.as_str())
        .bind(item_id)
        .fetch_one(pool)
        .await?;

        Ok(Paged { items, total })
    }
}
