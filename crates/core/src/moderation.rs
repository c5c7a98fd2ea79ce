//! Moderation read-model.
//!
//! A moderation item is one piece of user content (idea, initiative, or
//! comment) shown in the admin moderation queue. Items are never stored as
//! such; the `db` crate builds them from the `moderations` view and hands
//! them over as [`ModerationItem`]s, whose [`ModerationContext`] carries the
//! parent hierarchy as a tagged union.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::multiloc::Multiloc;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Discriminators
// ---------------------------------------------------------------------------

/// Content kinds that appear in the moderation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeratableType {
    Idea,
    Initiative,
    Comment,
}

impl ModeratableType {
    pub const ALL: [ModeratableType; 3] = [
        ModeratableType::Idea,
        ModeratableType::Initiative,
        ModeratableType::Comment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModeratableType::Idea => "Idea",
            ModeratableType::Initiative => "Initiative",
            ModeratableType::Comment => "Comment",
        }
    }
}

impl fmt::Display for ModeratableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeratableType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModeratableType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown moderatable type '{s}'")))
    }
}

/// Review state of a moderation item. A missing status row means `Unread`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Unread,
    Read,
}

impl ModerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationStatus::Unread => "unread",
            ModerationStatus::Read => "read",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unread" => Ok(ModerationStatus::Unread),
            "read" => Ok(ModerationStatus::Read),
            other => Err(CoreError::Validation(format!(
                "Unknown moderation status '{other}', expected 'read' or 'unread'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Query inputs
// ---------------------------------------------------------------------------

/// Which items the caller is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationScope {
    /// Administrators see everything.
    All,
    /// Project moderators see ideas of these projects and comments on them.
    Projects(Vec<DbId>),
}

/// Optional narrowing applied on top of the scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModerationFilter {
    /// Empty means every type.
    pub moderatable_types: Vec<ModeratableType>,
    pub status: Option<ModerationStatus>,
}

// ---------------------------------------------------------------------------
// Item and ownership chain
// ---------------------------------------------------------------------------

/// A parent entity shown next to an item (project, idea, initiative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextRef {
    pub id: DbId,
    pub slug: String,
    pub title_multiloc: Multiloc,
}

/// The post a comment was written on.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentPost {
    Idea { project: ContextRef, idea: ContextRef },
    Initiative { initiative: ContextRef },
}

/// Where an item sits in the content hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum ModerationContext {
    Idea { project: ContextRef },
    Initiative,
    Comment(CommentPost),
}

/// One resolved entry in the moderation queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "ModerationView")]
pub struct ModerationItem {
    pub id: DbId,
    pub context: ModerationContext,
    pub content_title_multiloc: Option<Multiloc>,
    pub content_body_multiloc: Multiloc,
    pub content_slug: Option<String>,
    pub created_at: Timestamp,
    pub moderation_status: ModerationStatus,
}

impl ModerationItem {
    pub fn moderatable_type(&self) -> ModeratableType {
        match self.context {
            ModerationContext::Idea { .. } => ModeratableType::Idea,
            ModerationContext::Initiative => ModeratableType::Initiative,
            ModerationContext::Comment(_) => ModeratableType::Comment,
        }
    }
}

/// Display-only ownership map: `{project?, idea?, initiative?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BelongsTo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ContextRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idea: Option<ContextRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiative: Option<ContextRef>,
}

/// Build the ownership map for an item.
///
/// For a comment on an initiative the initiative title is the post's own
/// title.
pub fn resolve_belongs_to(item: &ModerationItem) -> BelongsTo {
    match &item.context {
        ModerationContext::Idea { project } => BelongsTo {
            project: Some(project.clone()),
            ..BelongsTo::default()
        },
        ModerationContext::Initiative => BelongsTo::default(),
        ModerationContext::Comment(CommentPost::Idea { project, idea }) => BelongsTo {
            project: Some(project.clone()),
            idea: Some(idea.clone()),
            ..BelongsTo::default()
        },
        ModerationContext::Comment(CommentPost::Initiative { initiative }) => BelongsTo {
            initiative: Some(initiative.clone()),
            ..BelongsTo::default()
        },
    }
}

/// Serialized shape of a [`ModerationItem`].
#[derive(Debug, Serialize)]
pub struct ModerationView {
    pub id: DbId,
    pub moderatable_type: ModeratableType,
    pub content_title_multiloc: Option<Multiloc>,
    pub content_body_multiloc: Multiloc,
    pub content_slug: Option<String>,
    pub created_at: Timestamp,
    pub belongs_to: BelongsTo,
    pub moderation_status: ModerationStatus,
}

impl From<ModerationItem> for ModerationView {
    fn from(item: ModerationItem) -> Self {
        let belongs_to = resolve_belongs_to(&item);
        let moderatable_type = item.moderatable_type();
        Self {
            id: item.id,
            moderatable_type,
            content_title_multiloc: item.content_title_multiloc,
            content_body_multiloc: item.content_body_multiloc,
            content_slug: item.content_slug,
            created_at: item.created_at,
            belongs_to,
            moderation_status: item.moderation_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multiloc(en: &str) -> Multiloc {
        Multiloc::from([("en".to_string(), en.to_string())])
    }

    fn context_ref(id: DbId, slug: &str, title: &str) -> ContextRef {
        ContextRef {
            id,
            slug: slug.to_string(),
            title_multiloc: multiloc(title),
        }
    }

    fn item(context: ModerationContext) -> ModerationItem {
        ModerationItem {
            id: 1,
            context,
            content_title_multiloc: None,
            content_body_multiloc: multiloc("body"),
            content_slug: None,
            created_at: chrono::Utc::now(),
            moderation_status: ModerationStatus::default(),
        }
    }

    #[test]
    fn default_status_is_unread() {
        assert_eq!(ModerationStatus::default(), ModerationStatus::Unread);
    }

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("read".parse::<ModerationStatus>().unwrap(), ModerationStatus::Read);
        assert_eq!("unread".parse::<ModerationStatus>().unwrap(), ModerationStatus::Unread);
        assert!("archived".parse::<ModerationStatus>().is_err());
    }

    #[test]
    fn idea_belongs_to_its_project() {
        let belongs_to = resolve_belongs_to(&item(ModerationContext::Idea {
            project: context_ref(5, "parks", "Parks"),
        }));
        assert_eq!(belongs_to.project.unwrap().id, 5);
        assert!(belongs_to.idea.is_none());
        assert!(belongs_to.initiative.is_none());
    }

    #[test]
    fn initiative_belongs_to_nothing() {
        let json = serde_json::to_value(resolve_belongs_to(&item(ModerationContext::Initiative)))
            .unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn comment_on_idea_carries_project_and_idea() {
        let belongs_to = resolve_belongs_to(&item(ModerationContext::Comment(CommentPost::Idea {
            project: context_ref(5, "parks", "Parks"),
            idea: context_ref(9, "more-trees", "More trees"),
        })));
        assert_eq!(belongs_to.project.unwrap().slug, "parks");
        assert_eq!(belongs_to.idea.unwrap().slug, "more-trees");
        assert!(belongs_to.initiative.is_none());
    }

    #[test]
    fn comment_on_initiative_reads_title_from_the_post() {
        let belongs_to = resolve_belongs_to(&item(ModerationContext::Comment(
            CommentPost::Initiative {
                initiative: context_ref(3, "bike-lanes", "Bike lanes"),
            },
        )));
        let initiative = belongs_to.initiative.unwrap();
        assert_eq!(initiative.id, 3);
        assert_eq!(initiative.title_multiloc, multiloc("Bike lanes"));
        assert!(belongs_to.project.is_none());
    }

    #[test]
    fn item_serializes_with_type_and_belongs_to() {
        let json = serde_json::to_value(item(ModerationContext::Comment(CommentPost::Idea {
            project: context_ref(5, "parks", "Parks"),
            idea: context_ref(9, "more-trees", "More trees"),
        })))
        .unwrap();

        assert_eq!(json["moderatable_type"], "Comment");
        assert_eq!(json["moderation_status"], "unread");
        assert_eq!(json["belongs_to"]["project"]["id"], 5);
        assert_eq!(json["belongs_to"]["idea"]["slug"], "more-trees");
        assert!(json["belongs_to"].get("initiative").is_none());
    }
}
