//! Activity rows and their conversion into domain events.

use agora_core::activity::{ActivityAction, ActivityEvent};
use agora_core::content::{ContentType, SubjectRef};
use agora_core::error::CoreError;
use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub item_type: String,
    pub item_id: DbId,
    pub item_deleted: bool,
    pub action: String,
    pub user_id: Option<DbId>,
    pub acted_at: Timestamp,
    pub payload: serde_json::Value,
    pub dedup_key: Option<String>,
    pub created_at: Timestamp,
}

impl Activity {
    /// The subject as stored, in live or composed form.
    pub fn subject(&self) -> Result<SubjectRef, CoreError> {
        let content_type: ContentType = self.item_type.parse()?;
        Ok(if self.item_deleted {
            SubjectRef::deleted(content_type, self.item_id)
        } else {
            SubjectRef::content(content_type, self.item_id)
        })
    }
}

impl TryFrom<Activity> for ActivityEvent {
    type Error = CoreError;

    fn try_from(row: Activity) -> Result<Self, Self::Error> {
        Ok(ActivityEvent {
            id: row.id,
            subject: row.subject()?,
            action: row.action.parse::<ActivityAction>()?,
            user_id: row.user_id,
            acted_at: row.acted_at,
            payload: row.payload,
        })
    }
}

/// Insert DTO for an activity.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub subject: SubjectRef,
    pub action: ActivityAction,
    pub user_id: Option<DbId>,
    pub acted_at: Timestamp,
    pub payload: serde_json::Value,
    pub dedup_key: Option<String>,
}
