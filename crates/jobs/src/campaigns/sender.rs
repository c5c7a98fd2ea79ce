//! Drives one campaign send attempt.

use std::collections::HashSet;
use std::sync::Arc;

use agora_core::activity::ActivityEvent;
use agora_core::campaign::{SendContext, SendReport};
use agora_core::error::CoreError;
use agora_core::types::{DbId, Timestamp};
use agora_db::models::email_delivery::{DELIVERY_FAILED, DELIVERY_SENT};
use agora_db::models::user::Recipient;
use agora_db::repositories::{ActivityRepo, EmailDeliveryRepo, UserRepo};
use agora_db::DbPool;

use super::{CampaignKind, Campaigns};
use crate::delivery::email::{Mailer, OutgoingEmail};
use crate::error::JobError;

/// Result of [`CampaignSender::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// A before-send hook rejected the attempt. Nothing was delivered.
    Skipped,
    Sent(SendReport),
}

pub struct CampaignSender {
    pool: DbPool,
    mailer: Arc<dyn Mailer>,
    campaigns: Campaigns,
}

impl CampaignSender {
    pub fn new(pool: DbPool, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            pool,
            mailer,
            campaigns: Campaigns::new(),
        }
    }

    /// Run one send attempt of `kind`.
    ///
    /// Before-send hooks gate the attempt. Each filtered recipient then gets a
    /// `pending` row in `email_deliveries` before the mail goes out, and the
    /// row is settled as sent or failed afterwards. Recipients already
    /// reserved for the same send are skipped, so a redelivered job never
    /// mails anyone twice. Bookkeeping errors count as per-recipient failures
    /// and the after-send hooks always see the final report.
    pub async fn send(
        &self,
        kind: CampaignKind,
        ctx: &SendContext<'_>,
    ) -> Result<SendOutcome, JobError> {
        let campaign = self.campaigns.get(kind);
        if !campaign.run_before_send_hooks(ctx) {
            tracing::debug!(campaign = %kind, "Campaign skipped by before-send hook");
            return Ok(SendOutcome::Skipped);
        }

        let key = send_key(ctx);
        let candidates = UserRepo::list_recipients(&self.pool).await?;
        let reserved: HashSet<DbId> =
            EmailDeliveryRepo::list_for_send(&self.pool, campaign.name(), &key)
                .await?
                .into_iter()
                .filter(|d| d.delivery_status != DELIVERY_FAILED)
                .filter_map(|d| d.user_id)
                .collect();
        let recipients: Vec<Recipient> = campaign
            .apply_recipient_filters(candidates, ctx)
            .into_iter()
            .filter(|r| !reserved.contains(&r.id))
            .collect();
        if !reserved.is_empty() {
            tracing::info!(
                campaign = %kind,
                send_key = %key,
                skipped = reserved.len(),
                "Skipping recipients already mailed for this send"
            );
        }

        let mut report = SendReport {
            campaign: campaign.name().to_string(),
            recipients: recipients.len(),
            delivered: 0,
            failed: 0,
        };

        for recipient in &recipients {
            if self.deliver(kind, &key, recipient, ctx).await {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        campaign.run_after_send_hooks(&report);
        Ok(SendOutcome::Sent(report))
    }

    /// Reserve, mail and settle one recipient. Returns whether the mail went out.
    async fn deliver(
        &self,
        kind: CampaignKind,
        key: &str,
        recipient: &Recipient,
        ctx: &SendContext<'_>,
    ) -> bool {
        let name = self.campaigns.get(kind).name();
        let activity_id = ctx.activity.map(|a| a.id);

        let delivery_id =
            match EmailDeliveryRepo::reserve(&self.pool, name, recipient.id, activity_id, key)
                .await
            {
                Ok(Some(id)) => id,
                Ok(None) => {
                    tracing::debug!(
                        campaign = %kind,
                        user_id = recipient.id,
                        "Delivery already reserved by a concurrent send"
                    );
                    return false;
                }
                Err(e) => {
                    tracing::error!(
                        campaign = %kind,
                        user_id = recipient.id,
                        error = %e,
                        "Failed to reserve campaign delivery, not mailing"
                    );
                    return false;
                }
            };

        let email = compose(kind, recipient);
        let (delivered, status, message) = match self.mailer.send(&email).await {
            Ok(()) => (true, DELIVERY_SENT, None),
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(
                    campaign = %kind,
                    user_id = recipient.id,
                    error = %message,
                    "Campaign delivery failed"
                );
                (false, DELIVERY_FAILED, Some(message))
            }
        };

        // A row left pending still blocks a second mail on redelivery.
        if let Err(e) =
            EmailDeliveryRepo::settle(&self.pool, delivery_id, status, message.as_deref()).await
        {
            tracing::error!(
                campaign = %kind,
                delivery_id,
                status,
                error = %e,
                "Failed to settle campaign delivery"
            );
        }
        delivered
    }

    /// Perform a `send_campaign` job enqueued at `requested_at`.
    ///
    /// Campaigns without a triggering activity are keyed on the request
    /// date, so retries of the same job share one send.
    pub async fn perform(
        &self,
        kind: CampaignKind,
        activity_id: Option<DbId>,
        requested_at: Timestamp,
    ) -> Result<SendOutcome, JobError> {
        let activity = match activity_id {
            Some(id) => {
                let row = ActivityRepo::find_by_id(&self.pool, id)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "Activity",
                        id,
                    })?;
                Some(ActivityEvent::try_from(row)?)
            }
            None => None,
        };

        let ctx = SendContext {
            activity: activity.as_ref(),
            time: requested_at,
        };
        self.send(kind, &ctx).await
    }
}

/// Identifies one logical send of a campaign.
fn send_key(ctx: &SendContext<'_>) -> String {
    match ctx.activity {
        Some(activity) => format!("Activity/{}", activity.id),
        None => ctx.time.date_naive().to_string(),
    }
}

fn compose(kind: CampaignKind, recipient: &Recipient) -> OutgoingEmail {
    let greeting = match &recipient.first_name {
        Some(name) => format!("Hi {name},"),
        None => "Hi,".to_string(),
    };
    let (subject, text) = match kind {
        CampaignKind::AssigneeDigest => (
            "Your moderation digest",
            "New ideas and comments are waiting in the moderation queue.",
        ),
        CampaignKind::InviteReminder => (
            "Your invitation is still waiting",
            "You were invited to join the platform three days ago. Accept your invitation to take part.",
        ),
        CampaignKind::ProjectPhaseStarted => (
            "A new project phase has started",
            "A project you follow has entered a new phase. Have a look and share your ideas.",
        ),
    };
    OutgoingEmail {
        to: recipient.email.clone(),
        subject: subject.to_string(),
        body: format!("{greeting}\n\n{text}\n"),
    }
}
