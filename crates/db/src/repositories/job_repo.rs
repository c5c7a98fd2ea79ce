//! Repository for the `jobs` queue table.
//!
//! Delivery is at-least-once: a claimed job that is neither completed nor
//! failed before its lock goes stale is released and claimed again.

use agora_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::job::Job;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, job_type, payload, attempts, max_attempts, run_at, locked_at, \
    completed_at, failed_at, last_error, created_at, updated_at";

pub struct JobRepo;

impl JobRepo {
    /// Enqueue a job to run at `run_at` (or immediately when `None`).
    pub async fn enqueue<'e, E>(
        executor: E,
        job_type: &str,
        payload: &serde_json::Value,
        run_at: Option<Timestamp>,
        max_attempts: i32,
    ) -> Result<Job, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO jobs (job_type, payload, run_at, max_attempts) \
             VALUES ($1, $2, COALESCE($3, NOW()), $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_type)
            .bind(payload)
            .bind(run_at)
            .bind(max_attempts)
            .fetch_one(executor)
            .await
    }

    /// Atomically claim the oldest due job and count the attempt.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so that concurrent workers never
    /// claim the same row.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET locked_at = NOW(), attempts = attempts + 1, updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE completed_at IS NULL AND failed_at IS NULL \
                   AND locked_at IS NULL AND run_at <= NOW() \
                 ORDER BY run_at ASC, id ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query).fetch_optional(pool).await
    }

    pub async fn complete(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET completed_at = NOW(), locked_at = NULL, last_error = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Unlock a failed job so it runs again at `run_at`.
    pub async fn reschedule(
        pool: &PgPool,
        job_id: DbId,
        run_at: Timestamp,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET locked_at = NULL, run_at = $2, last_error = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(run_at)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Move a job to the dead-letter state. It is never claimed again.
    pub async fn dead_letter(pool: &PgPool, job_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET failed_at = NOW(), locked_at = NULL, last_error = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Release locks taken before `locked_before` on unfinished jobs.
    ///
    /// Returns the number of jobs made claimable again.
    pub async fn release_stale(
        pool: &PgPool,
        locked_before: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET locked_at = NULL, updated_at = NOW() \
             WHERE locked_at < $1 AND completed_at IS NULL AND failed_at IS NULL",
        )
        .bind(locked_before)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
