//! Queries over the `moderations` view and the `moderation_statuses` side
//! table.

use agora_core::moderation::{ModeratableType, ModerationFilter, ModerationScope, ModerationStatus};
use agora_core::pagination::{Page, Paged};
use agora_core::types::DbId;
use sqlx::PgPool;

use crate::models::moderation::ModerationRow;

/// View columns plus the resolved status. Expects `moderations m` left-joined
/// with `moderation_statuses ms`.
const COLUMNS: &str = "\
    m.id, m.moderatable_type, m.content_title_multiloc, m.content_body_multiloc, \
    m.content_slug, m.created_at, m.project_id, m.project_slug, m.project_title_multiloc, \
    m.post_id, m.post_type, m.post_slug, m.post_title_multiloc, \
    COALESCE(ms.status, 'unread') AS moderation_status";

const FROM: &str = "\
    FROM moderations m \
    LEFT JOIN moderation_statuses ms \
        ON ms.moderatable_id = m.id AND ms.moderatable_type = m.moderatable_type";

/// Scope and filter predicates. `$1` project ids (NULL = every project),
/// `$2` types (empty = every type), `$3` status (NULL = any).
const WHERE: &str = "\
    WHERE ($1::bigint[] IS NULL \
           OR (m.moderatable_type IN ('Idea', 'Comment') AND m.project_id = ANY($1))) \
      AND (cardinality($2::text[]) = 0 OR m.moderatable_type = ANY($2)) \
      AND ($3::text IS NULL OR COALESCE(ms.status, 'unread') = $3)";

pub struct ModerationRepo;

impl ModerationRepo {
    /// One page of moderation items visible in `scope`, newest first.
    pub async fn list(
        pool: &PgPool,
        scope: &ModerationScope,
        filter: &ModerationFilter,
        page: Page,
    ) -> Result<Paged<ModerationRow>, sqlx::Error> {
        let project_ids: Option<Vec<DbId>> = match scope {
            ModerationScope::All => None,
            ModerationScope::Projects(ids) => Some(ids.clone()),
        };
        let types: Vec<String> = filter
            .moderatable_types
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        let status = filter.status.map(ModerationStatus::as_str);

        let query = format!(
            "SELECT {COLUMNS} {FROM} {WHERE} \
             ORDER BY m.created_at DESC, m.id DESC \
             LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, ModerationRow>(&query)
            .bind(&project_ids)
            .bind(&types)
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) {FROM} {WHERE}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&project_ids)
            .bind(&types)
            .bind(status)
            .fetch_one(pool)
            .await?;

        Ok(Paged { items, total })
    }

    /// A single item with its resolved status.
    pub async fn find(
        pool: &PgPool,
        moderatable_type: ModeratableType,
        id: DbId,
    ) -> Result<Option<ModerationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} {FROM} WHERE m.id = $1 AND m.moderatable_type = $2"
        );
        sqlx::query_as::<_, ModerationRow>(&query)
            .bind(id)
            .bind(moderatable_type.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Stored status of an item. A missing side row reads as `unread`.
    pub async fn status_for(
        pool: &PgPool,
        moderatable_type: ModeratableType,
        id: DbId,
    ) -> Result<ModerationStatus, sqlx::Error> {
        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM moderation_statuses \
             WHERE moderatable_id = $1 AND moderatable_type = $2",
        )
        .bind(id)
        .bind(moderatable_type.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(match status.as_deref() {
            Some("read") => ModerationStatus::Read,
            _ => ModerationStatus::Unread,
        })
    }

    /// Upsert the status of an existing item.
    ///
    /// Returns `false` without writing when no moderatable item matches
    /// `(moderatable_type, id)`.
    pub async fn set_status(
        pool: &PgPool,
        moderatable_type: ModeratableType,
        id: DbId,
        status: ModerationStatus,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM moderations WHERE id = $1 AND moderatable_type = $2)",
        )
        .bind(id)
        .bind(moderatable_type.as_str())
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO moderation_statuses (moderatable_id, moderatable_type, status) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_moderation_statuses_moderatable \
             DO UPDATE SET status = EXCLUDED.status, updated_at = NOW()",
        )
        .bind(id)
        .bind(moderatable_type.as_str())
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}
