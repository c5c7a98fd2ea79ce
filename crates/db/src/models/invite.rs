//! Invite entity model.

use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `invites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invite {
    pub id: DbId,
    pub inviter_id: Option<DbId>,
    pub invitee_id: DbId,
    #[serde(skip_serializing)]
    pub token: String,
    pub accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
