//! The activity-logging job.
//!
//! Domain code never writes activities directly. It enqueues a
//! `log_activity` job, and the job persists exactly one row and hands the
//! activity on to the notification job.

use agora_core::activity::ActivityAction;
use agora_core::content::SubjectRef;
use agora_core::types::{DbId, Timestamp};
use agora_db::models::activity::{Activity, NewActivity};
use agora_db::models::job::Job;
use agora_db::repositories::{ActivityRepo, ContentRepo};
use agora_db::DbPool;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use crate::error::JobError;
use crate::payload::JobPayload;

/// Arguments of a `log_activity` job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogActivityArgs {
    /// Live `{content_type, id}` or composed `"Type/id"`.
    pub subject: SubjectRef,
    pub action: ActivityAction,
    pub user_id: Option<DbId>,
    /// When the domain event happened, not when the job runs.
    pub acted_at: Timestamp,
    #[serde(default = "empty_payload")]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedup_key: Option<String>,
}

fn empty_payload() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl LogActivityArgs {
    pub fn new(
        subject: SubjectRef,
        action: ActivityAction,
        user_id: Option<DbId>,
        acted_at: Timestamp,
    ) -> Self {
        Self {
            subject,
            action,
            user_id,
            acted_at,
            payload: empty_payload(),
            dedup_key: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_dedup_key(mut self, key: impl Into<String>) -> Self {
        self.dedup_key = Some(key.into());
        self
    }
}

pub struct LogActivity;

impl LogActivity {
    pub async fn enqueue<'e, E>(executor: E, args: LogActivityArgs) -> Result<Job, JobError>
    where
        E: PgExecutor<'e>,
    {
        JobPayload::LogActivity(args).enqueue(executor).await
    }

    /// Persist the activity and enqueue `make_notifications` for it.
    ///
    /// Returns `None` when the dedup key was already taken; nothing is
    /// enqueued in that case.
    pub async fn perform(
        pool: &DbPool,
        args: &LogActivityArgs,
    ) -> Result<Option<Activity>, JobError> {
        let subject = Self::resolve_subject(pool, args.subject).await?;

        let input = NewActivity {
            subject,
            action: args.action,
            user_id: args.user_id,
            acted_at: args.acted_at,
            payload: args.payload.clone(),
            dedup_key: args.dedup_key.clone(),
        };

        let mut tx = pool.begin().await?;
        let Some(activity) = ActivityRepo::create(&mut *tx, &input).await? else {
            tracing::info!(
                subject = %subject,
                action = %args.action,
                dedup_key = ?args.dedup_key,
                "Activity already logged, skipping"
            );
            return Ok(None);
        };
        JobPayload::MakeNotifications {
            activity_id: activity.id,
        }
        .enqueue(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::debug!(
            activity_id = activity.id,
            subject = %subject,
            action = %args.action,
            "Activity logged"
        );
        Ok(Some(activity))
    }

    /// Downgrade a live reference whose row is gone to its composed form.
    async fn resolve_subject(pool: &DbPool, subject: SubjectRef) -> Result<SubjectRef, JobError> {
        match subject {
            SubjectRef::Deleted { .. } => Ok(subject),
            SubjectRef::Content { content_type, id } => {
                if ContentRepo::exists(pool, content_type, id).await? {
                    Ok(subject)
                } else {
                    tracing::warn!(
                        subject = %subject,
                        "Activity subject no longer exists, logging composed identifier"
                    );
                    Ok(subject.into_deleted())
                }
            }
        }
    }
}

/// Enqueue a `log_activity` job for a domain event.
///
/// Pass the transaction that wrote the domain change so the event and its
/// activity commit together.
pub async fn enqueue_activity_job<'e, E>(
    executor: E,
    subject: SubjectRef,
    action: ActivityAction,
    acting_user: Option<DbId>,
    event_time: Timestamp,
) -> Result<Job, JobError>
where
    E: PgExecutor<'e>,
{
    LogActivity::enqueue(
        executor,
        LogActivityArgs::new(subject, action, acting_user, event_time),
    )
    .await
}
