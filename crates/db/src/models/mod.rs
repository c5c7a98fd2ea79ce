//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts where the API or jobs write the table

pub mod activity;
pub mod comment;
pub mod email_delivery;
pub mod idea;
pub mod invite;
pub mod job;
pub mod moderation;
pub mod notification;
pub mod project;
pub mod user;
