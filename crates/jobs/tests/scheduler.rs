//! Integration tests for the periodic activity scheduler.
//!
//! Times are chosen in Europe/Brussels summer time (UTC+2): 22:30 UTC is
//! 00:30 local on the next calendar day.

mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use agora_core::content::ContentType;
use agora_db::repositories::InviteRepo;
use agora_jobs::payload::JOB_SEND_CAMPAIGN;
use agora_jobs::ActivityScheduler;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;

use common::{activity_count, invitee, jobs_of_type, phase, project, runner, user};

fn scheduler(pool: &PgPool) -> ActivityScheduler {
    ActivityScheduler::new(
        pool.clone(),
        chrono_tz::Europe::Brussels,
        StdDuration::from_secs(3600),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

async fn started_count(pool: &PgPool, phase_id: i64) -> i64 {
    activity_count(pool, ContentType::Phase, phase_id, "started").await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_started_is_logged_once_per_day(pool: PgPool) {
    let p = project(&pool, "parks").await;
    let today_phase = phase(&pool, p, date(2026, 10, 20)).await;
    let tomorrow_phase = phase(&pool, p, date(2026, 10, 21)).await;
    let scheduler = scheduler(&pool);
    let runner = runner(&pool, Arc::default());

    // First run after local midnight of 2026-10-20.
    let enqueued = scheduler
        .create_periodic_activities(utc(2026, 10, 19, 22, 30), Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(enqueued, 1);
    runner.run_pending().await.unwrap();
    assert_eq!(started_count(&pool, today_phase.id).await, 1);

    // A later run the same day does not cross midnight.
    let enqueued = scheduler
        .create_periodic_activities(utc(2026, 10, 19, 23, 30), Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(enqueued, 0);

    // An overlapping rerun of the midnight window is absorbed by the dedup key.
    scheduler
        .create_periodic_activities(utc(2026, 10, 19, 22, 45), Duration::hours(1))
        .await
        .unwrap();
    runner.run_pending().await.unwrap();
    assert_eq!(started_count(&pool, today_phase.id).await, 1);
    assert_eq!(started_count(&pool, tomorrow_phase.id).await, 0);

    // Next calendar day: exactly one for the phase starting then.
    scheduler
        .create_periodic_activities(utc(2026, 10, 20, 22, 30), Duration::hours(1))
        .await
        .unwrap();
    runner.run_pending().await.unwrap();
    assert_eq!(started_count(&pool, tomorrow_phase.id).await, 1);
    assert_eq!(started_count(&pool, today_phase.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_started_acted_at_is_local_midnight(pool: PgPool) {
    let p = project(&pool, "parks").await;
    let ph = phase(&pool, p, date(2026, 10, 20)).await;

    scheduler(&pool)
        .create_periodic_activities(utc(2026, 10, 19, 22, 30), Duration::hours(1))
        .await
        .unwrap();
    runner(&pool, Arc::default()).run_pending().await.unwrap();

    let acted_at: chrono::DateTime<Utc> = sqlx::query_scalar(
        "SELECT acted_at FROM activities WHERE item_type = 'Phase' AND item_id = $1",
    )
    .bind(ph.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(acted_at, utc(2026, 10, 19, 22, 0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upcoming_phases_are_announced_a_week_ahead(pool: PgPool) {
    let p = project(&pool, "parks").await;
    let ph = phase(&pool, p, date(2026, 10, 27)).await;

    let enqueued = scheduler(&pool)
        .create_periodic_activities(utc(2026, 10, 19, 22, 30), Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(enqueued, 1);
    runner(&pool, Arc::default()).run_pending().await.unwrap();

    assert_eq!(
        activity_count(&pool, ContentType::Phase, ph.id, "upcoming").await,
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invites_pending_for_three_days_are_reported(pool: PgPool) {
    let inviter = user(&pool, "inviter@example.com", "admin").await;
    let due = invitee(&pool, "due@example.com").await;
    let accepted = invitee(&pool, "accepted@example.com").await;
    let fresh = invitee(&pool, "fresh@example.com").await;

    let now = utc(2026, 10, 19, 12, 0);
    let due_invite = InviteRepo::create(&pool, Some(inviter), due, "t1", now - Duration::days(3) - Duration::minutes(30))
        .await
        .unwrap();
    let accepted_invite = InviteRepo::create(&pool, Some(inviter), accepted, "t2", now - Duration::days(3) - Duration::minutes(10))
        .await
        .unwrap();
    InviteRepo::accept(&pool, accepted_invite.id).await.unwrap();
    InviteRepo::create(&pool, Some(inviter), fresh, "t3", now - Duration::days(1))
        .await
        .unwrap();

    let enqueued = scheduler(&pool)
        .create_periodic_activities(now, Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(enqueued, 1);
    runner(&pool, Arc::default()).run_pending().await.unwrap();

    let (item_id, payload): (i64, serde_json::Value) = sqlx::query_as(
        "SELECT item_id, payload FROM activities WHERE action = 'not_accepted_since_3_days'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(item_id, due_invite.id);
    assert_eq!(payload["invitee_id"], serde_json::json!(due));
    assert_eq!(payload["inviter_id"], serde_json::json!(inviter));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_digest_is_scheduled_on_monday_only(pool: PgPool) {
    let scheduler = scheduler(&pool);

    // 2026-10-19 is a Monday; 22:30 UTC on the 18th is 00:30 local on the 19th.
    scheduler
        .tick(utc(2026, 10, 18, 22, 30), Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(jobs_of_type(&pool, JOB_SEND_CAMPAIGN).await.len(), 1);

    scheduler
        .tick(utc(2026, 10, 19, 22, 30), Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(jobs_of_type(&pool, JOB_SEND_CAMPAIGN).await.len(), 1);
}

#[test]
fn brussels_is_utc_plus_two_in_october() {
    let local = utc(2026, 10, 19, 22, 30).with_timezone(&Tz::Europe__Brussels);
    assert_eq!(local.date_naive(), date(2026, 10, 20));
}
