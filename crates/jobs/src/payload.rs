//! Job payloads.
//!
//! A job row stores its type in `job_type` and the serialized
//! [`JobPayload`] (tag included) in `payload`.

use agora_core::retry::DEFAULT_MAX_ATTEMPTS;
use agora_core::types::{DbId, Timestamp};
use agora_db::models::job::Job;
use agora_db::repositories::JobRepo;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use crate::campaigns::CampaignKind;
use crate::error::JobError;
use crate::log_activity::LogActivityArgs;

pub const JOB_LOG_ACTIVITY: &str = "log_activity";
pub const JOB_MAKE_NOTIFICATIONS: &str = "make_notifications";
pub const JOB_SEND_CAMPAIGN: &str = "send_campaign";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "job_type", rename_all = "snake_case")]
pub enum JobPayload {
    LogActivity(LogActivityArgs),
    MakeNotifications {
        activity_id: DbId,
    },
    SendCampaign {
        campaign: CampaignKind,
        activity_id: Option<DbId>,
    },
}

impl JobPayload {
    pub fn job_type(&self) -> &'static str {
        match self {
            JobPayload::LogActivity(_) => JOB_LOG_ACTIVITY,
            JobPayload::MakeNotifications { .. } => JOB_MAKE_NOTIFICATIONS,
            JobPayload::SendCampaign { .. } => JOB_SEND_CAMPAIGN,
        }
    }

    /// Decode the payload of a claimed job.
    pub fn from_job(job: &Job) -> Result<Self, JobError> {
        let payload: JobPayload = serde_json::from_value(job.payload.clone())?;
        if payload.job_type() != job.job_type {
            return Err(JobError::Permanent(format!(
                "Job {} has type '{}' but carries a '{}' payload",
                job.id,
                job.job_type,
                payload.job_type()
            )));
        }
        Ok(payload)
    }

    /// Enqueue to run as soon as a worker is free.
    pub async fn enqueue<'e, E>(&self, executor: E) -> Result<Job, JobError>
    where
        E: PgExecutor<'e>,
    {
        self.enqueue_at(executor, None).await
    }

    /// Enqueue to run no earlier than `run_at`.
    pub async fn enqueue_at<'e, E>(
        &self,
        executor: E,
        run_at: Option<Timestamp>,
    ) -> Result<Job, JobError>
    where
        E: PgExecutor<'e>,
    {
        let payload = serde_json::to_value(self)?;
        let job = JobRepo::enqueue(
            executor,
            self.job_type(),
            &payload,
            run_at,
            DEFAULT_MAX_ATTEMPTS,
        )
        .await?;
        tracing::debug!(job_id = job.id, job_type = %job.job_type, "Job enqueued");
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use agora_core::activity::ActivityAction;
    use agora_core::content::{ContentType, SubjectRef};
    use serde_json::json;

    use super::*;

    #[test]
    fn log_activity_payload_accepts_composed_subject() {
        let payload: JobPayload = serde_json::from_value(json!({
            "job_type": "log_activity",
            "subject": "Idea/42",
            "action": "deleted",
            "user_id": 3,
            "acted_at": "2026-10-19T08:00:00Z"
        }))
        .unwrap();

        let JobPayload::LogActivity(args) = payload else {
            panic!("expected a log_activity payload");
        };
        assert_eq!(args.subject, SubjectRef::deleted(ContentType::Idea, 42));
        assert_eq!(args.action, ActivityAction::Deleted);
        assert_eq!(args.payload, json!({}));
        assert!(args.dedup_key.is_none());
    }

    #[test]
    fn unknown_subject_type_fails_to_decode() {
        let result = serde_json::from_value::<JobPayload>(json!({
            "job_type": "log_activity",
            "subject": "Vote/1",
            "action": "created",
            "acted_at": "2026-10-19T08:00:00Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn send_campaign_round_trips_through_json() {
        let payload = JobPayload::SendCampaign {
            campaign: CampaignKind::InviteReminder,
            activity_id: Some(9),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"job_type": "send_campaign", "campaign": "invite_reminder", "activity_id": 9})
        );
        assert_eq!(serde_json::from_value::<JobPayload>(value).unwrap(), payload);
    }
}
