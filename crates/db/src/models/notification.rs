//! Notification entity model.

use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_id: DbId,
    pub activity_id: DbId,
    pub notification_type: String,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
