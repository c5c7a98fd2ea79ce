//! Integration tests for notification generation and campaign delivery.

mod common;

use std::sync::Arc;

use agora_core::activity::ActivityAction;
use agora_core::campaign::SendContext;
use agora_core::content::{ContentType, SubjectRef};
use agora_db::models::comment::CreateComment;
use agora_db::models::email_delivery::{DELIVERY_FAILED, DELIVERY_PENDING, DELIVERY_SENT};
use agora_db::repositories::{CommentRepo, EmailDeliveryRepo, InviteRepo, ModeratorRepo};
use agora_jobs::payload::JOB_SEND_CAMPAIGN;
use agora_jobs::{
    CampaignKind, CampaignSender, EmailError, LogActivity, LogActivityArgs, MakeNotifications,
    Mailer, OutgoingEmail, SendOutcome,
};
use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use common::{
    deactivate, idea, invitee, jobs_of_type, ml, notifications_for, phase, project, runner, user,
    RecordingMailer,
};

async fn log(pool: &PgPool, args: LogActivityArgs) -> i64 {
    LogActivity::perform(pool, &args).await.unwrap().unwrap().id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_notifies_post_author_but_not_commenter(pool: PgPool) {
    let author = user(&pool, "author@example.com", "user").await;
    let commenter = user(&pool, "commenter@example.com", "user").await;
    let p = project(&pool, "parks").await;
    let idea_id = idea(&pool, p, author, "more-trees").await;
    let comment = CommentRepo::create(
        &pool,
        &CreateComment {
            post_id: idea_id,
            post_type: "Idea".to_string(),
            author_id: commenter,
            parent_id: None,
            body_multiloc: ml("<p>Nice</p>"),
        },
    )
    .await
    .unwrap();

    let activity_id = log(
        &pool,
        LogActivityArgs::new(
            SubjectRef::content(ContentType::Comment, comment.id),
            ActivityAction::Created,
            Some(commenter),
            Utc::now(),
        ),
    )
    .await;

    let summary = MakeNotifications::perform(&pool, activity_id).await.unwrap();
    assert_eq!(summary.notifications, 1);
    assert!(summary.campaigns.is_empty());

    let rows = notifications_for(&pool, activity_id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].recipient_id, author);
    assert_eq!(rows[0].notification_type, "comment_on_your_post");

    // Redelivery does not duplicate notifications.
    let again = MakeNotifications::perform(&pool, activity_id).await.unwrap();
    assert_eq!(again.notifications, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_idea_notifies_admins_and_project_moderators(pool: PgPool) {
    let admin = user(&pool, "admin@example.com", "admin").await;
    let moderator = user(&pool, "mod@example.com", "user").await;
    let other_moderator = user(&pool, "other-mod@example.com", "user").await;
    let author = user(&pool, "author@example.com", "user").await;
    let parks = project(&pool, "parks").await;
    let roads = project(&pool, "roads").await;
    ModeratorRepo::add(&pool, parks, moderator).await.unwrap();
    ModeratorRepo::add(&pool, roads, other_moderator).await.unwrap();
    let idea_id = idea(&pool, parks, author, "more-trees").await;

    let activity_id = log(
        &pool,
        LogActivityArgs::new(
            SubjectRef::content(ContentType::Idea, idea_id),
            ActivityAction::Published,
            Some(author),
            Utc::now(),
        ),
    )
    .await;
    MakeNotifications::perform(&pool, activity_id).await.unwrap();

    let recipients: Vec<i64> = notifications_for(&pool, activity_id)
        .await
        .into_iter()
        .map(|n| n.recipient_id)
        .collect();
    assert_eq!(recipients, vec![admin, moderator]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_subjects_produce_nothing(pool: PgPool) {
    user(&pool, "admin@example.com", "admin").await;
    let activity_id = log(
        &pool,
        LogActivityArgs::new(
            SubjectRef::deleted(ContentType::Idea, 42),
            ActivityAction::Published,
            None,
            Utc::now(),
        ),
    )
    .await;

    let summary = MakeNotifications::perform(&pool, activity_id).await.unwrap();
    assert_eq!(summary.notifications, 0);
    assert!(summary.campaigns.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_phase_started_notifies_contributors_and_mails_opted_in_users(pool: PgPool) {
    let author = user(&pool, "author@example.com", "user").await;
    let admin = user(&pool, "admin@example.com", "admin").await;
    invitee(&pool, "invitee@example.com").await;
    sqlx::query("INSERT INTO users (role_id, email, email_opt_in) SELECT id, 'quiet@example.com', FALSE FROM roles WHERE name = 'user'")
        .execute(&pool)
        .await
        .unwrap();
    let p = project(&pool, "parks").await;
    idea(&pool, p, author, "more-trees").await;
    let ph = phase(&pool, p, Utc::now().date_naive()).await;

    let activity_id = log(
        &pool,
        LogActivityArgs::new(
            SubjectRef::content(ContentType::Phase, ph.id),
            ActivityAction::Started,
            None,
            Utc::now(),
        ),
    )
    .await;

    let mailer = Arc::new(RecordingMailer::default());
    runner(&pool, mailer.clone()).run_pending().await.unwrap();

    let notified: Vec<i64> = sqlx::query_scalar(
        "SELECT recipient_id FROM notifications WHERE notification_type = 'project_phase_started'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(notified, vec![author]);

    let mut mailed = mailer.recipients();
    mailed.sort();
    assert_eq!(
        mailed,
        vec!["admin@example.com".to_string(), "author@example.com".to_string()]
    );
    let deliveries = EmailDeliveryRepo::list_for_send(
        &pool,
        "project_phase_started",
        &format!("Activity/{activity_id}"),
    )
    .await
    .unwrap();
    assert_eq!(deliveries.len(), 2);
    assert!(deliveries.iter().all(|d| d.delivery_status == DELIVERY_SENT));
    assert!(deliveries.iter().any(|d| d.user_id == Some(admin)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invite_reminder_mails_the_invitee_and_notifies_the_inviter(pool: PgPool) {
    let inviter = user(&pool, "inviter@example.com", "admin").await;
    let invited = invitee(&pool, "new@example.com").await;
    let invite = InviteRepo::create(&pool, Some(inviter), invited, "tok", Utc::now())
        .await
        .unwrap();

    log(
        &pool,
        LogActivityArgs::new(
            SubjectRef::content(ContentType::Invite, invite.id),
            ActivityAction::NotAcceptedSince3Days,
            None,
            Utc::now(),
        )
        .with_payload(json!({"invitee_id": invited, "inviter_id": inviter})),
    )
    .await;

    let mailer = Arc::new(RecordingMailer::default());
    runner(&pool, mailer.clone()).run_pending().await.unwrap();

    assert_eq!(mailer.recipients(), vec!["new@example.com".to_string()]);
    let notified: Vec<i64> = sqlx::query_scalar(
        "SELECT recipient_id FROM notifications WHERE notification_type = 'invite_not_accepted'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(notified, vec![inviter]);

    let campaign_jobs = jobs_of_type(&pool, JOB_SEND_CAMPAIGN).await;
    assert_eq!(campaign_jobs.len(), 1);
    assert!(campaign_jobs[0].completed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_deliveries_are_recorded_and_reported(pool: PgPool) {
    user(&pool, "admin@example.com", "admin").await;
    user(&pool, "broken@example.com", "admin").await;
    user(&pool, "plain@example.com", "user").await;
    let retired = user(&pool, "retired@example.com", "admin").await;
    deactivate(&pool, retired).await;

    let mailer = Arc::new(RecordingMailer {
        fail_for: vec!["broken@example.com".to_string()],
        ..RecordingMailer::default()
    });
    let sender = CampaignSender::new(pool.clone(), mailer.clone());
    let ctx = SendContext {
        activity: None,
        time: Utc::now(),
    };

    let outcome = sender.send(CampaignKind::AssigneeDigest, &ctx).await.unwrap();
    assert_matches!(
        outcome,
        SendOutcome::Sent(ref report) if report.recipients == 2 && report.delivered == 1 && report.failed == 1
    );

    let send_key = ctx.time.date_naive().to_string();
    let deliveries = EmailDeliveryRepo::list_for_send(&pool, "assignee_digest", &send_key)
        .await
        .unwrap();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(
        deliveries
            .iter()
            .filter(|d| d.delivery_status == DELIVERY_FAILED)
            .count(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rejected_before_send_skips_everything(pool: PgPool) {
    user(&pool, "admin@example.com", "admin").await;
    let mailer = Arc::new(RecordingMailer::default());
    let sender = CampaignSender::new(pool.clone(), mailer.clone());

    // Invite reminders need a triggering activity.
    let ctx = SendContext {
        activity: None,
        time: Utc::now(),
    };
    let outcome = sender.send(CampaignKind::InviteReminder, &ctx).await.unwrap();

    assert_eq!(outcome, SendOutcome::Skipped);
    assert!(mailer.recipients().is_empty());
    let deliveries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_deliveries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(deliveries, 0);
}

/// Mails like [`RecordingMailer`] but moves `email_deliveries` out of the way
/// after the first mail, so every later bookkeeping write fails.
struct TableParkingMailer {
    pool: PgPool,
    inner: RecordingMailer,
}

#[async_trait]
impl Mailer for TableParkingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let first = self.inner.recipients().is_empty();
        self.inner.send(email).await?;
        if first {
            sqlx::query("ALTER TABLE email_deliveries RENAME TO email_deliveries_parked")
                .execute(&self.pool)
                .await
                .unwrap();
        }
        Ok(())
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resending_after_bookkeeping_failure_mails_each_recipient_once(pool: PgPool) {
    user(&pool, "a@example.com", "admin").await;
    user(&pool, "b@example.com", "admin").await;
    let mailer = Arc::new(TableParkingMailer {
        pool: pool.clone(),
        inner: RecordingMailer::default(),
    });
    let sender = CampaignSender::new(pool.clone(), mailer.clone());
    let ctx = SendContext {
        activity: None,
        time: Utc::now(),
    };

    let first = sender.send(CampaignKind::AssigneeDigest, &ctx).await.unwrap();
    assert_matches!(
        first,
        SendOutcome::Sent(ref report) if report.recipients == 2 && report.delivered == 1 && report.failed == 1
    );
    assert_eq!(mailer.inner.recipients().len(), 1);

    sqlx::query("ALTER TABLE email_deliveries_parked RENAME TO email_deliveries")
        .execute(&pool)
        .await
        .unwrap();

    let retry = sender.send(CampaignKind::AssigneeDigest, &ctx).await.unwrap();
    assert_matches!(
        retry,
        SendOutcome::Sent(ref report) if report.recipients == 1 && report.delivered == 1
    );

    let mut mailed = mailer.inner.recipients();
    mailed.sort();
    assert_eq!(
        mailed,
        vec!["a@example.com".to_string(), "b@example.com".to_string()]
    );

    // The first recipient's row never settled, and still blocks a third send.
    let send_key = ctx.time.date_naive().to_string();
    let deliveries = EmailDeliveryRepo::list_for_send(&pool, "assignee_digest", &send_key)
        .await
        .unwrap();
    let mut statuses: Vec<&str> = deliveries.iter().map(|d| d.delivery_status.as_str()).collect();
    statuses.sort();
    assert_eq!(statuses, vec![DELIVERY_PENDING, DELIVERY_SENT]);

    let third = sender.send(CampaignKind::AssigneeDigest, &ctx).await.unwrap();
    assert_matches!(third, SendOutcome::Sent(ref report) if report.recipients == 0);
    assert_eq!(mailer.inner.recipients().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_recipients_are_retried_on_the_next_send(pool: PgPool) {
    user(&pool, "ok@example.com", "admin").await;
    user(&pool, "flaky@example.com", "admin").await;
    let ctx = SendContext {
        activity: None,
        time: Utc::now(),
    };

    let flaky = Arc::new(RecordingMailer {
        fail_for: vec!["flaky@example.com".to_string()],
        ..RecordingMailer::default()
    });
    CampaignSender::new(pool.clone(), flaky)
        .send(CampaignKind::AssigneeDigest, &ctx)
        .await
        .unwrap();

    let healthy = Arc::new(RecordingMailer::default());
    let outcome = CampaignSender::new(pool.clone(), healthy.clone())
        .send(CampaignKind::AssigneeDigest, &ctx)
        .await
        .unwrap();

    assert_matches!(outcome, SendOutcome::Sent(ref report) if report.delivered == 1);
    assert_eq!(healthy.recipients(), vec!["flaky@example.com".to_string()]);
}
