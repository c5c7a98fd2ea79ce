//! The job runner.
//!
//! Polls the `jobs` table, claims due jobs one at a time and dispatches them
//! by payload type. Failures go through the retry policy in
//! [`agora_core::retry`].

use std::sync::Arc;
use std::time::Duration;

use agora_core::retry::{decide, RetryDecision, DEFAULT_MAX_ATTEMPTS};
use agora_db::models::job::Job;
use agora_db::repositories::JobRepo;
use agora_db::DbPool;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::campaigns::CampaignSender;
use crate::error::JobError;
use crate::log_activity::LogActivity;
use crate::notifications::MakeNotifications;
use crate::payload::JobPayload;

/// Default delay between queue polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default age after which a claimed job's lock is considered abandoned.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(900);

#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    pub poll_interval: Duration,
    /// Upper bound on attempts, applied on top of each job's own limit.
    pub max_attempts: i32,
    pub lock_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

pub struct JobRunner {
    pool: DbPool,
    sender: Arc<CampaignSender>,
    config: RunnerConfig,
}

impl JobRunner {
    pub fn new(pool: DbPool, sender: Arc<CampaignSender>, config: RunnerConfig) -> Self {
        Self {
            pool,
            sender,
            config,
        }
    }

    /// Run the polling loop until `cancel` fires.
    ///
    /// A job already being processed when cancellation arrives is finished
    /// first. Jobs interrupted any other way are redelivered once their lock
    /// goes stale.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job runner cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.release_stale_locks().await {
                        tracing::error!(error = %e, "Failed to release stale job locks");
                    }
                    if let Err(e) = self.drain(&cancel).await {
                        tracing::error!(error = %e, "Job queue poll failed");
                    }
                }
            }
        }
    }

    /// Process every due job, returning how many were handled.
    pub async fn run_pending(&self) -> Result<usize, sqlx::Error> {
        self.drain(&CancellationToken::new()).await
    }

    async fn drain(&self, cancel: &CancellationToken) -> Result<usize, sqlx::Error> {
        let mut processed = 0;
        while !cancel.is_cancelled() {
            let Some(job) = JobRepo::claim_next(&self.pool).await? else {
                break;
            };
            self.process(job).await?;
            processed += 1;
        }
        Ok(processed)
    }

    async fn release_stale_locks(&self) -> Result<(), sqlx::Error> {
        let timeout = chrono::Duration::from_std(self.config.lock_timeout)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_LOCK_TIMEOUT.as_secs() as i64));
        let released = JobRepo::release_stale(&self.pool, Utc::now() - timeout).await?;
        if released > 0 {
            tracing::warn!(count = released, "Released stale job locks");
        }
        Ok(())
    }

    async fn process(&self, job: Job) -> Result<(), sqlx::Error> {
        let span = tracing::info_span!(
            "job",
            job_id = job.id,
            job_type = %job.job_type,
            attempt = job.attempts
        );
        async {
            let result = self.dispatch(&job).await;
            self.settle(&job, result).await
        }
        .instrument(span)
        .await
    }

    /// Record the outcome of one attempt.
    async fn settle(&self, job: &Job, result: Result<(), JobError>) -> Result<(), sqlx::Error> {
        let err = match result {
            Ok(()) => {
                tracing::debug!("Job completed");
                return JobRepo::complete(&self.pool, job.id).await;
            }
            Err(err) => err,
        };

        let max_attempts = job.max_attempts.min(self.config.max_attempts);
        match decide(job.attempts, max_attempts, err.is_permanent()) {
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(error = %err, retry_in_secs = delay.as_secs(), "Job failed, retrying");
                let delay = chrono::Duration::from_std(delay)
                    .unwrap_or_else(|_| chrono::Duration::hours(1));
                JobRepo::reschedule(&self.pool, job.id, Utc::now() + delay, &err.to_string()).await
            }
            RetryDecision::DeadLetter => {
                tracing::error!(
                    error = %err,
                    permanent = err.is_permanent(),
                    "Job dead-lettered"
                );
                JobRepo::dead_letter(&self.pool, job.id, &err.to_string()).await
            }
        }
    }

    async fn dispatch(&self, job: &Job) -> Result<(), JobError> {
        match JobPayload::from_job(job)? {
            JobPayload::LogActivity(args) => {
                LogActivity::perform(&self.pool, &args).await?;
            }
            JobPayload::MakeNotifications { activity_id } => {
                MakeNotifications::perform(&self.pool, activity_id).await?;
            }
            JobPayload::SendCampaign {
                campaign,
                activity_id,
            } => {
                self.sender
                    .perform(campaign, activity_id, job.created_at)
                    .await?;
            }
        }
        Ok(())
    }
}
