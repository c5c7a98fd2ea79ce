//! User entity model, DTOs and the campaign recipient projection.

use agora_core::roles::ROLE_ADMIN;
use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub const INVITE_STATUS_PENDING: &str = "pending";
pub const INVITE_STATUS_ACCEPTED: &str = "accepted";

/// A row from the `users` table joined with its role name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub role: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub locale: String,
    pub invite_status: Option<String>,
    pub email_opt_in: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Role name, e.g. `admin` or `user`.
    pub role: String,
    pub invite_status: Option<String>,
    pub email_opt_in: bool,
}

/// Everything a campaign recipient filter may look at.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Recipient {
    pub id: DbId,
    pub email: String,
    pub first_name: Option<String>,
    pub locale: String,
    pub role: String,
    pub is_moderator: bool,
    pub invite_pending: bool,
    pub email_opt_in: bool,
    pub is_active: bool,
}

impl Recipient {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
