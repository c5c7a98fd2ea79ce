//! The notification job.
//!
//! Turns one activity into notification rows for its audience and enqueues
//! the campaigns the activity triggers.

use std::collections::BTreeSet;

use agora_core::activity::ActivityEvent;
use agora_core::content::SubjectRef;
use agora_core::error::CoreError;
use agora_core::notifications::NotificationKind;
use agora_core::types::DbId;
use agora_db::repositories::{
    ActivityRepo, CommentRepo, IdeaRepo, InviteRepo, ModeratorRepo, NotificationRepo,
    PhaseRepo, UserRepo,
};
use agora_db::DbPool;

use crate::campaigns::CampaignKind;
use crate::error::JobError;
use crate::payload::JobPayload;

/// What one `make_notifications` run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationSummary {
    pub notifications: usize,
    pub campaigns: Vec<CampaignKind>,
}

pub struct MakeNotifications;

impl MakeNotifications {
    pub async fn perform(
        pool: &DbPool,
        activity_id: DbId,
    ) -> Result<NotificationSummary, JobError> {
        let row = ActivityRepo::find_by_id(pool, activity_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Activity",
                id: activity_id,
            })?;
        let event = ActivityEvent::try_from(row)?;

        let mut summary = NotificationSummary::default();

        if let Some(kind) = NotificationKind::for_activity(&event.subject, event.action) {
            let recipients = audience(pool, kind, &event).await?;
            for recipient_id in recipients {
                if NotificationRepo::create(pool, recipient_id, event.id, kind.as_str())
                    .await?
                    .is_some()
                {
                    summary.notifications += 1;
                }
            }
            tracing::debug!(
                activity_id = event.id,
                kind = %kind,
                count = summary.notifications,
                "Notifications created"
            );
        }

        for campaign in CampaignKind::triggered_by(&event.subject, event.action) {
            JobPayload::SendCampaign {
                campaign,
                activity_id: Some(event.id),
            }
            .enqueue(pool)
            .await?;
            summary.campaigns.push(campaign);
        }

        Ok(summary)
    }
}

/// Users who receive `kind` for `event`, never including the actor.
async fn audience(
    pool: &DbPool,
    kind: NotificationKind,
    event: &ActivityEvent,
) -> Result<BTreeSet<DbId>, JobError> {
    let SubjectRef::Content { id, .. } = event.subject else {
        return Ok(BTreeSet::new());
    };

    let mut users = BTreeSet::new();
    match kind {
        NotificationKind::CommentOnYourPost => {
            users.extend(CommentRepo::post_author_id(pool, id).await?);
        }
        NotificationKind::IdeaForModeration => {
            if let Some(idea) = IdeaRepo::find_by_id(pool, id).await? {
                users.extend(UserRepo::admin_ids(pool).await?);
                users.extend(ModeratorRepo::user_ids_for_project(pool, idea.project_id).await?);
            }
        }
        NotificationKind::ProjectPhaseStarted => {
            if let Some(phase) = PhaseRepo::find_by_id(pool, id).await? {
                users.extend(IdeaRepo::author_ids_for_project(pool, phase.project_id).await?);
            }
        }
        NotificationKind::ProjectPhaseUpcoming => {
            if let Some(phase) = PhaseRepo::find_by_id(pool, id).await? {
                users.extend(ModeratorRepo::user_ids_for_project(pool, phase.project_id).await?);
            }
        }
        NotificationKind::InviteNotAccepted => {
            let inviter = match event.payload_id("inviter_id") {
                Some(inviter) => Some(inviter),
                None => InviteRepo::find_by_id(pool, id)
                    .await?
                    .and_then(|invite| invite.inviter_id),
            };
            users.extend(inviter);
        }
    }

    if let Some(actor) = event.user_id {
        users.remove(&actor);
    }
    Ok(users)
}
