//! Activity actions and the in-memory activity shape.
//!
//! An activity is an immutable record that "something happened" to a
//! subject. Rows live in the `activities` table; [`ActivityEvent`] is the
//! form handed to notification targeting and campaign hooks.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::content::SubjectRef;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// What happened to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
    Published,
    ChangedTitle,
    ChangedBody,
    ChangedStatus,
    Started,
    Upcoming,
    #[serde(rename = "not_accepted_since_3_days")]
    NotAcceptedSince3Days,
}

impl ActivityAction {
    pub const ALL: [ActivityAction; 10] = [
        ActivityAction::Created,
        ActivityAction::Updated,
        ActivityAction::Deleted,
        ActivityAction::Published,
        ActivityAction::ChangedTitle,
        ActivityAction::ChangedBody,
        ActivityAction::ChangedStatus,
        ActivityAction::Started,
        ActivityAction::Upcoming,
        ActivityAction::NotAcceptedSince3Days,
    ];

    /// The label stored in `activities.action`.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::Updated => "updated",
            ActivityAction::Deleted => "deleted",
            ActivityAction::Published => "published",
            ActivityAction::ChangedTitle => "changed_title",
            ActivityAction::ChangedBody => "changed_body",
            ActivityAction::ChangedStatus => "changed_status",
            ActivityAction::Started => "started",
            ActivityAction::Upcoming => "upcoming",
            ActivityAction::NotAcceptedSince3Days => "not_accepted_since_3_days",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown activity action '{s}'")))
    }
}

/// A persisted activity as seen by downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEvent {
    pub id: DbId,
    pub subject: SubjectRef,
    pub action: ActivityAction,
    pub user_id: Option<DbId>,
    pub acted_at: Timestamp,
    pub payload: serde_json::Value,
}

impl ActivityEvent {
    /// Read an integer id out of the payload, e.g. `invitee_id`.
    pub fn payload_id(&self, key: &str) -> Option<DbId> {
        self.payload.get(key).and_then(serde_json::Value::as_i64)
    }
}

/// Deduplication key for an activity emitted by the scheduler.
///
/// Date-bound events (phase started/upcoming) include the date so that the
/// same phase may legitimately emit again if its start date moves.
pub fn dedup_key(subject: &SubjectRef, action: ActivityAction, on: Option<NaiveDate>) -> String {
    match on {
        Some(date) => format!("{}:{}:{}", subject.composed_identifier(), action, date),
        None => format!("{}:{}", subject.composed_identifier(), action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentType;

    #[test]
    fn action_labels_round_trip() {
        for action in ActivityAction::ALL {
            assert_eq!(action.as_str().parse::<ActivityAction>().unwrap(), action);
        }
    }

    #[test]
    fn serde_label_matches_storage_label() {
        let json = serde_json::to_value(ActivityAction::NotAcceptedSince3Days).unwrap();
        assert_eq!(json, serde_json::json!("not_accepted_since_3_days"));
        let json = serde_json::to_value(ActivityAction::ChangedTitle).unwrap();
        assert_eq!(json, serde_json::json!("changed_title"));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!("exploded".parse::<ActivityAction>().is_err());
    }

    #[test]
    fn dedup_key_includes_date_when_given() {
        let subject = SubjectRef::content(ContentType::Phase, 12);
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            dedup_key(&subject, ActivityAction::Started, Some(date)),
            "Phase/12:started:2026-10-19"
        );

        let invite = SubjectRef::content(ContentType::Invite, 5);
        assert_eq!(
            dedup_key(&invite, ActivityAction::NotAcceptedSince3Days, None),
            "Invite/5:not_accepted_since_3_days"
        );
    }

    #[test]
    fn payload_id_reads_integers_only() {
        let event = ActivityEvent {
            id: 1,
            subject: SubjectRef::content(ContentType::Invite, 5),
            action: ActivityAction::NotAcceptedSince3Days,
            user_id: None,
            acted_at: chrono::Utc::now(),
            payload: serde_json::json!({"invitee_id": 8, "note": "x"}),
        };
        assert_eq!(event.payload_id("invitee_id"), Some(8));
        assert_eq!(event.payload_id("note"), None);
        assert_eq!(event.payload_id("missing"), None);
    }
}
