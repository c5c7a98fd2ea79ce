//! Which notification an activity produces.
//!
//! Mapping is pure; resolving the actual audience (user ids) needs the
//! database and happens in the notification job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::activity::ActivityAction;
use crate::content::{ContentType, SubjectRef};

/// Notification types stored in `notifications.notification_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone commented on a post you wrote.
    CommentOnYourPost,
    /// A new idea is waiting for moderation.
    IdeaForModeration,
    /// A phase of a project you contributed to has started.
    ProjectPhaseStarted,
    /// A phase of a project you moderate starts in a week.
    ProjectPhaseUpcoming,
    /// Someone you invited has not accepted yet.
    InviteNotAccepted,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::CommentOnYourPost => "comment_on_your_post",
            NotificationKind::IdeaForModeration => "idea_for_moderation",
            NotificationKind::ProjectPhaseStarted => "project_phase_started",
            NotificationKind::ProjectPhaseUpcoming => "project_phase_upcoming",
            NotificationKind::InviteNotAccepted => "invite_not_accepted",
        }
    }

    /// The notification kind triggered by an activity, if any.
    ///
    /// Deleted subjects never notify anyone.
    pub fn for_activity(subject: &SubjectRef, action: ActivityAction) -> Option<Self> {
        if subject.is_deleted() {
            return None;
        }
        match (subject.content_type(), action) {
            (ContentType::Comment, ActivityAction::Created) => {
                Some(NotificationKind::CommentOnYourPost)
            }
            (ContentType::Idea, ActivityAction::Created | ActivityAction::Published) => {
                Some(NotificationKind::IdeaForModeration)
            }
            (ContentType::Phase, ActivityAction::Started) => {
                Some(NotificationKind::ProjectPhaseStarted)
            }
            (ContentType::Phase, ActivityAction::Upcoming) => {
                Some(NotificationKind::ProjectPhaseUpcoming)
            }
            (ContentType::Invite, ActivityAction::NotAcceptedSince3Days) => {
                Some(NotificationKind::InviteNotAccepted)
            }
            _ => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
