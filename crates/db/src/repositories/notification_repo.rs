//! Repository for the `notifications` table.

use agora_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str =
    "id, recipient_id, activity_id, notification_type, read_at, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification, returning the generated ID.
    ///
    /// Returns `None` if the recipient already has this notification for the
    /// activity, which makes redelivered jobs harmless.
    pub async fn create(
        pool: &PgPool,
        recipient_id: DbId,
        activity_id: DbId,
        notification_type: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (recipient_id, activity_id, notification_type) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_notifications_recipient_activity_type DO NOTHING \
             RETURNING id",
        )
        .bind(recipient_id)
        .bind(activity_id)
        .bind(notification_type)
        .fetch_optional(pool)
        .await
    }

    /// List notifications for a user, newest first.
    ///
    /// When `unread_only` is `true`, read notifications are skipped.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND read_at IS NULL"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE recipient_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification was found unread for the given
    /// user and updated.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = NOW() \
             WHERE id = $1 AND recipient_id = $2 AND read_at IS NULL",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
