//! Repository for the `invites` table.

use agora_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::invite::Invite;

const COLUMNS: &str =
    "id, inviter_id, invitee_id, token, accepted_at, created_at, updated_at";

pub struct InviteRepo;

impl InviteRepo {
    /// Create an invite. `created_at` is explicit so callers can backdate it.
    pub async fn create(
        pool: &PgPool,
        inviter_id: Option<DbId>,
        invitee_id: DbId,
        token: &str,
        created_at: Timestamp,
    ) -> Result<Invite, sqlx::Error> {
        let query = format!(
            "INSERT INTO invites (inviter_id, invitee_id, token, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(inviter_id)
            .bind(invitee_id)
            .bind(token)
            .bind(created_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invites WHERE id = $1");
        sqlx::query_as::<_, Invite>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark an invite accepted. Returns `false` if it was already accepted.
    pub async fn accept(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invites SET accepted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND accepted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unaccepted invites created in `[from, to]`.
    pub async fn list_pending_created_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Invite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invites \
             WHERE accepted_at IS NULL AND created_at >= $1 AND created_at <= $2 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Invite>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }
}
