//! Repository for the `users` table.

use agora_core::roles::ROLE_ADMIN;
use agora_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, Recipient, User};

/// Column list for `users` queries, joined with `roles r`.
const COLUMNS: &str = "\
    u.id, r.name AS role, u.email, u.first_name, u.last_name, u.locale, \
    u.invite_status, u.email_opt_in, u.is_active, u.created_at, u.updated_at";

const RECIPIENT_COLUMNS: &str = "\
    u.id, u.email, u.first_name, u.locale, r.name AS role, \
    EXISTS (SELECT 1 FROM project_moderators pm WHERE pm.user_id = u.id) AS is_moderator, \
    COALESCE(u.invite_status = 'pending', FALSE) AS invite_pending, \
    u.email_opt_in, u.is_active";

pub struct UserRepo;

impl UserRepo {
    /// Create a user with the named role.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO users (role_id, email, first_name, last_name, invite_status, email_opt_in) \
             VALUES ((SELECT id FROM roles WHERE name = $1), $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(&input.role)
        .bind(&input.email)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.invite_status)
        .bind(input.email_opt_in)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Ids of active administrators.
    pub async fn admin_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT u.id FROM users u JOIN roles r ON r.id = u.role_id \
             WHERE r.name = $1 AND u.is_active \
             ORDER BY u.id",
        )
        .bind(ROLE_ADMIN)
        .fetch_all(pool)
        .await
    }

    /// Every user as a campaign candidate. Campaign filters narrow this down.
    pub async fn list_recipients(pool: &PgPool) -> Result<Vec<Recipient>, sqlx::Error> {
        let query = format!(
            "SELECT {RECIPIENT_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id \
             ORDER BY u.id"
        );
        sqlx::query_as::<_, Recipient>(&query).fetch_all(pool).await
    }
}
