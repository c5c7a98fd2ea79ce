//! Campaign email delivery log.

use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Reserved before the mail is handed to the mailer.
pub const DELIVERY_PENDING: &str = "pending";
pub const DELIVERY_SENT: &str = "sent";
pub const DELIVERY_FAILED: &str = "failed";

/// A row from the `email_deliveries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailDelivery {
    pub id: DbId,
    pub campaign_name: String,
    pub user_id: Option<DbId>,
    pub activity_id: Option<DbId>,
    pub send_key: String,
    pub delivery_status: String,
    pub error_message: Option<String>,
    pub sent_at: Timestamp,
}
