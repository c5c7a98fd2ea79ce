//! Shared fixtures for job integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use agora_core::content::ContentType;
use agora_core::multiloc::Multiloc;
use agora_core::types::DbId;
use agora_db::models::idea::CreateIdea;
use agora_db::models::job::Job;
use agora_db::models::notification::Notification;
use agora_db::models::project::{CreatePhase, Phase};
use agora_db::models::user::{CreateUser, INVITE_STATUS_PENDING};
use agora_db::repositories::{IdeaRepo, PhaseRepo, ProjectRepo, UserRepo};
use agora_jobs::{CampaignSender, EmailError, JobRunner, Mailer, OutgoingEmail, RunnerConfig};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub fn ml(en: &str) -> Multiloc {
    Multiloc::from([("en".to_string(), en.to_string())])
}

/// Captures emails instead of sending them. Addresses in `fail_for` error.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail_for: Vec<String>,
}

impl RecordingMailer {
    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|e| e.to.clone()).collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        if self.fail_for.contains(&email.to) {
            return Err(EmailError::Build(format!("refusing {}", email.to)));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub fn runner(pool: &PgPool, mailer: Arc<RecordingMailer>) -> JobRunner {
    let sender = Arc::new(CampaignSender::new(pool.clone(), mailer));
    JobRunner::new(pool.clone(), sender, RunnerConfig::default())
}

pub async fn user(pool: &PgPool, email: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            first_name: Some("Test".to_string()),
            last_name: None,
            role: role.to_string(),
            invite_status: None,
            email_opt_in: true,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn invitee(pool: &PgPool, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            first_name: None,
            last_name: None,
            role: "user".to_string(),
            invite_status: Some(INVITE_STATUS_PENDING.to_string()),
            email_opt_in: true,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn project(pool: &PgPool, slug: &str) -> DbId {
    ProjectRepo::create(pool, slug, &ml(slug)).await.unwrap().id
}

pub async fn phase(pool: &PgPool, project_id: DbId, start_at: NaiveDate) -> Phase {
    PhaseRepo::create(
        pool,
        &CreatePhase {
            project_id,
            title_multiloc: ml("Phase"),
            start_at,
            end_at: start_at + chrono::Duration::days(30),
        },
    )
    .await
    .unwrap()
}

pub async fn idea(pool: &PgPool, project_id: DbId, author_id: DbId, slug: &str) -> DbId {
    IdeaRepo::create(
        pool,
        &CreateIdea {
            project_id,
            author_id: Some(author_id),
            slug: slug.to_string(),
            title_multiloc: ml(slug),
            body_multiloc: ml("<p>Body</p>"),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn jobs_of_type(pool: &PgPool, job_type: &str) -> Vec<Job> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE job_type = $1 ORDER BY id")
        .bind(job_type)
        .fetch_all(pool)
        .await
        .unwrap()
}

pub async fn activity_count(
    pool: &PgPool,
    content_type: ContentType,
    item_id: DbId,
    action: &str,
) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM activities WHERE item_type = $1 AND item_id = $2 AND action = $3",
    )
    .bind(content_type.as_str())
    .bind(item_id)
    .bind(action)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn notifications_for(pool: &PgPool, activity_id: DbId) -> Vec<Notification> {
    sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE activity_id = $1 ORDER BY recipient_id",
    )
    .bind(activity_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

pub async fn deactivate(pool: &PgPool, user_id: DbId) {
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}
