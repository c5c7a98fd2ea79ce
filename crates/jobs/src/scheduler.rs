//! The periodic activity scheduler.
//!
//! Every tick scans the window `[now - since, now]` in the tenant timezone
//! and enqueues `log_activity` jobs for phases starting today, phases
//! starting in a week, and invites left unaccepted for three days. Each
//! scheduled activity carries a dedup key, so overlapping runs and job
//! redelivery still log it once.

use std::time::Duration;

use agora_core::activity::{dedup_key, ActivityAction};
use agora_core::content::{ContentType, SubjectRef};
use agora_core::scheduling::ScanWindow;
use agora_core::types::Timestamp;
use agora_db::repositories::{InviteRepo, PhaseRepo};
use agora_db::DbPool;
use chrono::{Datelike, Utc, Weekday};
use chrono_tz::Tz;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::campaigns::CampaignKind;
use crate::error::JobError;
use crate::log_activity::{LogActivity, LogActivityArgs};
use crate::payload::JobPayload;

/// Tenant-local weekday on which the assignee digest goes out.
pub const DIGEST_WEEKDAY: Weekday = Weekday::Mon;

pub struct ActivityScheduler {
    pool: DbPool,
    tz: Tz,
    interval: Duration,
}

impl ActivityScheduler {
    pub fn new(pool: DbPool, tz: Tz, interval: Duration) -> Self {
        Self { pool, tz, interval }
    }

    /// Run the scheduler loop until `cancel` fires.
    ///
    /// Each tick scans back over one interval.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        let since = chrono::Duration::from_std(self.interval)
            .unwrap_or_else(|_| chrono::Duration::hours(1));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Activity scheduler cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick(Utc::now(), since).await {
                        tracing::error!(error = %e, "Scheduler run failed");
                    }
                }
            }
        }
    }

    /// One scheduler run: periodic activities plus scheduled campaigns.
    pub async fn tick(&self, now: Timestamp, since: chrono::Duration) -> Result<usize, JobError> {
        let count = self.create_periodic_activities(now, since).await?;
        self.schedule_campaigns(now, since).await?;
        Ok(count)
    }

    /// Enqueue `log_activity` jobs for everything due in the window.
    ///
    /// Returns the number of jobs enqueued.
    pub async fn create_periodic_activities(
        &self,
        now: Timestamp,
        since: chrono::Duration,
    ) -> Result<usize, JobError> {
        let window = ScanWindow::new(now, since, self.tz);
        let mut count = 0;

        if window.crosses_day_boundary() {
            count += self.phases_started(&window).await?;
            count += self.phases_upcoming(&window).await?;
        }
        count += self.invites_not_accepted(&window).await?;

        tracing::info!(count, today = %window.today(), "Periodic activities enqueued");
        Ok(count)
    }

    async fn phases_started(&self, window: &ScanWindow) -> Result<usize, JobError> {
        let today = window.today();
        let phases = PhaseRepo::list_starting_on(&self.pool, today).await?;
        for phase in &phases {
            let subject = SubjectRef::content(ContentType::Phase, phase.id);
            let args = LogActivityArgs::new(
                subject,
                ActivityAction::Started,
                None,
                window.start_of_day(today),
            )
            .with_payload(json!({ "project_id": phase.project_id }))
            .with_dedup_key(dedup_key(&subject, ActivityAction::Started, Some(today)));
            LogActivity::enqueue(&self.pool, args).await?;
        }
        Ok(phases.len())
    }

    async fn phases_upcoming(&self, window: &ScanWindow) -> Result<usize, JobError> {
        let date = window.upcoming_date();
        let phases = PhaseRepo::list_starting_on(&self.pool, date).await?;
        for phase in &phases {
            let subject = SubjectRef::content(ContentType::Phase, phase.id);
            let args = LogActivityArgs::new(subject, ActivityAction::Upcoming, None, window.now_utc())
                .with_payload(json!({ "project_id": phase.project_id, "start_at": date }))
                .with_dedup_key(dedup_key(&subject, ActivityAction::Upcoming, Some(date)));
            LogActivity::enqueue(&self.pool, args).await?;
        }
        Ok(phases.len())
    }

    async fn invites_not_accepted(&self, window: &ScanWindow) -> Result<usize, JobError> {
        let (from, to) = window.invite_window();
        let invites = InviteRepo::list_pending_created_between(&self.pool, from, to).await?;
        for invite in &invites {
            let subject = SubjectRef::content(ContentType::Invite, invite.id);
            let action = ActivityAction::NotAcceptedSince3Days;
            let args = LogActivityArgs::new(subject, action, None, window.now_utc())
                .with_payload(json!({
                    "invitee_id": invite.invitee_id,
                    "inviter_id": invite.inviter_id,
                }))
                .with_dedup_key(dedup_key(&subject, action, None));
            LogActivity::enqueue(&self.pool, args).await?;
        }
        Ok(invites.len())
    }

    /// Enqueue campaigns sent on a calendar rather than by an activity.
    async fn schedule_campaigns(
        &self,
        now: Timestamp,
        since: chrono::Duration,
    ) -> Result<(), JobError> {
        let window = ScanWindow::new(now, since, self.tz);
        if window.crosses_day_boundary() && window.today().weekday() == DIGEST_WEEKDAY {
            JobPayload::SendCampaign {
                campaign: CampaignKind::AssigneeDigest,
                activity_id: None,
            }
            .enqueue(&self.pool)
            .await?;
            tracing::info!(campaign = %CampaignKind::AssigneeDigest, "Scheduled campaign enqueued");
        }
        Ok(())
    }
}
