//! Built-in email campaigns.
//!
//! Each [`CampaignKind`] has one [`CampaignDefinition`] over the list of
//! [`Recipient`]s. Definitions are built once by [`Campaigns::new`] and
//! shared read-only by the sender.

mod sender;

pub use sender::{CampaignSender, SendOutcome};

use std::fmt;

use agora_core::activity::ActivityAction;
use agora_core::campaign::{campaign_name, CampaignDefinition, SendContext, SendReport};
use agora_core::content::{ContentType, SubjectRef};
use agora_db::models::user::Recipient;
use serde::{Deserialize, Serialize};

/// Candidate set the recipient filters fold over.
pub type Recipients = Vec<Recipient>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignKind {
    /// Scheduled summary for admins and project moderators.
    AssigneeDigest,
    /// Nudges an invitee who has not accepted after three days.
    InviteReminder,
    /// Announces a started phase to opted-in users.
    ProjectPhaseStarted,
}

impl CampaignKind {
    pub const ALL: [CampaignKind; 3] = [
        CampaignKind::AssigneeDigest,
        CampaignKind::InviteReminder,
        CampaignKind::ProjectPhaseStarted,
    ];

    pub fn name(self) -> String {
        campaign_name(&format!("{self:?}"))
    }

    /// Campaigns an activity triggers. Scheduled campaigns never appear.
    pub fn triggered_by(subject: &SubjectRef, action: ActivityAction) -> Vec<CampaignKind> {
        if subject.is_deleted() {
            return Vec::new();
        }
        match (subject.content_type(), action) {
            (ContentType::Invite, ActivityAction::NotAcceptedSince3Days) => {
                vec![CampaignKind::InviteReminder]
            }
            (ContentType::Phase, ActivityAction::Started) => {
                vec![CampaignKind::ProjectPhaseStarted]
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for CampaignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The definitions of every built-in campaign.
#[derive(Debug)]
pub struct Campaigns {
    assignee_digest: CampaignDefinition<Recipients>,
    invite_reminder: CampaignDefinition<Recipients>,
    project_phase_started: CampaignDefinition<Recipients>,
}

impl Campaigns {
    pub fn new() -> Self {
        Self {
            assignee_digest: assignee_digest(),
            invite_reminder: invite_reminder(),
            project_phase_started: project_phase_started(),
        }
    }

    pub fn get(&self, kind: CampaignKind) -> &CampaignDefinition<Recipients> {
        match kind {
            CampaignKind::AssigneeDigest => &self.assignee_digest,
            CampaignKind::InviteReminder => &self.invite_reminder,
            CampaignKind::ProjectPhaseStarted => &self.project_phase_started,
        }
    }
}

impl Default for Campaigns {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Shared filters and hooks
// ---------------------------------------------------------------------------

fn without_invitees(recipients: Recipients, _: &SendContext<'_>) -> Recipients {
    recipients.into_iter().filter(|r| !r.invite_pending).collect()
}

fn only_active(recipients: Recipients, _: &SendContext<'_>) -> Recipients {
    recipients.into_iter().filter(|r| r.is_active).collect()
}

fn triggering_activity(
    ctx: &SendContext<'_>,
    content_type: ContentType,
    action: ActivityAction,
) -> bool {
    ctx.activity.is_some_and(|a| {
        !a.subject.is_deleted() && a.subject.content_type() == content_type && a.action == action
    })
}

fn log_report(report: &SendReport) {
    tracing::info!(
        campaign = %report.campaign,
        recipients = report.recipients,
        delivered = report.delivered,
        failed = report.failed,
        "Campaign sent"
    );
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

fn assignee_digest() -> CampaignDefinition<Recipients> {
    CampaignDefinition::new(CampaignKind::AssigneeDigest.name())
        .before_send(|ctx| ctx.activity.is_none())
        .recipient_filter(|recipients: Recipients, _| {
            recipients
                .into_iter()
                .filter(|r| r.is_admin() || r.is_moderator)
                .collect()
        })
        .recipient_filter(without_invitees)
        .recipient_filter(only_active)
        .after_send(log_report)
}

fn invite_reminder() -> CampaignDefinition<Recipients> {
    CampaignDefinition::new(CampaignKind::InviteReminder.name())
        .before_send(|ctx| {
            triggering_activity(ctx, ContentType::Invite, ActivityAction::NotAcceptedSince3Days)
        })
        .recipient_filter(|recipients: Recipients, ctx| {
            let invitee = ctx.activity.and_then(|a| a.payload_id("invitee_id"));
            recipients
                .into_iter()
                .filter(|r| Some(r.id) == invitee)
                .collect()
        })
        .recipient_filter(|recipients: Recipients, _| {
            recipients.into_iter().filter(|r| r.invite_pending).collect()
        })
        .after_send(log_report)
}

fn project_phase_started() -> CampaignDefinition<Recipients> {
    CampaignDefinition::new(CampaignKind::ProjectPhaseStarted.name())
        .before_send(|ctx| triggering_activity(ctx, ContentType::Phase, ActivityAction::Started))
        .recipient_filter(only_active)
        .recipient_filter(without_invitees)
        .recipient_filter(|recipients: Recipients, _| {
            recipients.into_iter().filter(|r| r.email_opt_in).collect()
        })
        .after_send(log_report)
}
