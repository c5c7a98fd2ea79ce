//! Agora domain core.
//!
//! Pure logic with zero internal dependencies: shared types, the error
//! taxonomy, polymorphic subject references, activity actions, the
//! moderation read-model shape, scheduler scan windows, the email campaign
//! pipeline, and multiloc validation. The `db`, `jobs`, and `api` crates
//! build on top of these.

pub mod activity;
pub mod campaign;
pub mod content;
pub mod error;
pub mod moderation;
pub mod multiloc;
pub mod notifications;
pub mod pagination;
pub mod retry;
pub mod roles;
pub mod scheduling;
pub mod types;
