//! Repository for the `email_deliveries` table.

use agora_core::types::DbId;
use sqlx::PgPool;

use crate::models::email_delivery::EmailDelivery;

const COLUMNS: &str =
    "id, campaign_name, user_id, activity_id, send_key, delivery_status, error_message, sent_at";

pub struct EmailDeliveryRepo;

impl EmailDeliveryRepo {
    /// Reserve a `pending` delivery before mailing one recipient.
    ///
    /// Returns `None` when a pending or sent row already exists for the same
    /// campaign, user and send key.
    pub async fn reserve(
        pool: &PgPool,
        campaign_name: &str,
        user_id: DbId,
        activity_id: Option<DbId>,
        send_key: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO email_deliveries \
                 (campaign_name, user_id, activity_id, send_key, delivery_status) \
             VALUES ($1, $2, $3, $4, 'pending') \
             ON CONFLICT (campaign_name, user_id, send_key) \
                 WHERE delivery_status <> 'failed' DO NOTHING \
             RETURNING id",
        )
        .bind(campaign_name)
        .bind(user_id)
        .bind(activity_id)
        .bind(send_key)
        .fetch_optional(pool)
        .await
    }

    /// Settle a reserved delivery as sent or failed.
    pub async fn settle(
        pool: &PgPool,
        id: DbId,
        delivery_status: &str,
        error_message: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE email_deliveries \
             SET delivery_status = $2, error_message = $3, sent_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(delivery_status)
        .bind(error_message)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// All deliveries of one logical send, oldest first.
    pub async fn list_for_send(
        pool: &PgPool,
        campaign_name: &str,
        send_key: &str,
    ) -> Result<Vec<EmailDelivery>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_deliveries \
             WHERE campaign_name = $1 AND send_key = $2 \
             ORDER BY id"
        );
        sqlx::query_as::<_, EmailDelivery>(&query)
            .bind(campaign_name)
            .bind(send_key)
            .fetch_all(pool)
            .await
    }
}
