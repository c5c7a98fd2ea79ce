//! Polymorphic content references.
//!
//! Activities point at many kinds of content. Instead of a free-form
//! `(type, id)` string pair, a subject is a [`SubjectRef`]: either a live
//! reference to a row, or the durable composed identifier (`"Idea/42"`) of a
//! row that may no longer exist.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// Every content kind an activity may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Idea,
    Initiative,
    Comment,
    Project,
    Phase,
    Invite,
    User,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Idea,
        ContentType::Initiative,
        ContentType::Comment,
        ContentType::Project,
        ContentType::Phase,
        ContentType::Invite,
        ContentType::User,
    ];

    /// The type discriminator stored in `activities.item_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Idea => "Idea",
            ContentType::Initiative => "Initiative",
            ContentType::Comment => "Comment",
            ContentType::Project => "Project",
            ContentType::Phase => "Phase",
            ContentType::Invite => "Invite",
            ContentType::User => "User",
        }
    }

    /// The backing table for rows of this type.
    pub fn table(self) -> &'static str {
        match self {
            ContentType::Idea => "ideas",
            ContentType::Initiative => "initiatives",
            ContentType::Comment => "comments",
            ContentType::Project => "projects",
            ContentType::Phase => "phases",
            ContentType::Invite => "invites",
            ContentType::User => "users",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown content type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// SubjectRef
// ---------------------------------------------------------------------------

/// The subject of an activity.
///
/// Serialized either as `{"content_type": "Idea", "id": 42}` (live) or as
/// the composed identifier string `"Idea/42"` (possibly deleted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SubjectRepr", into = "SubjectRepr")]
pub enum SubjectRef {
    /// A row that existed when the reference was taken.
    Content { content_type: ContentType, id: DbId },
    /// A composed identifier. Never dereferenced.
    Deleted { content_type: ContentType, id: DbId },
}

impl SubjectRef {
    pub fn content(content_type: ContentType, id: DbId) -> Self {
        SubjectRef::Content { content_type, id }
    }

    pub fn deleted(content_type: ContentType, id: DbId) -> Self {
        SubjectRef::Deleted { content_type, id }
    }

    /// Parse a composed identifier of the form `"<Type>/<id>"`.
    ///
    /// The type must be a known [`ContentType`]. The result is always the
    /// [`SubjectRef::Deleted`] form.
    pub fn parse_composed(s: &str) -> Result<Self, CoreError> {
        let (type_name, id) = s.split_once('/').ok_or_else(|| {
            CoreError::Validation(format!("Composed identifier '{s}' must look like Type/id"))
        })?;
        let content_type: ContentType = type_name.parse()?;
        let id: DbId = id.parse().map_err(|_| {
            CoreError::Validation(format!("Composed identifier '{s}' has a non-numeric id"))
        })?;
        Ok(SubjectRef::deleted(content_type, id))
    }

    pub fn content_type(&self) -> ContentType {
        match *self {
            SubjectRef::Content { content_type, .. } | SubjectRef::Deleted { content_type, .. } => {
                content_type
            }
        }
    }

    pub fn id(&self) -> DbId {
        match *self {
            SubjectRef::Content { id, .. } | SubjectRef::Deleted { id, .. } => id,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, SubjectRef::Deleted { .. })
    }

    /// Downgrade to the composed-identifier form.
    pub fn into_deleted(self) -> Self {
        SubjectRef::deleted(self.content_type(), self.id())
    }

    /// The durable `"<Type>/<id>"` string.
    pub fn composed_identifier(&self) -> String {
        format!("{}/{}", self.content_type(), self.id())
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.content_type(), self.id())
    }
}

/// Wire representation backing the serde impls of [`SubjectRef`].
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SubjectRepr {
    Composed(String),
    Content {
        content_type: ContentType,
        id: DbId,
    },
}

impl TryFrom<SubjectRepr> for SubjectRef {
    type Error = CoreError;

    fn try_from(repr: SubjectRepr) -> Result<Self, Self::Error> {
        match repr {
            SubjectRepr::Composed(s) => SubjectRef::parse_composed(&s),
            SubjectRepr::Content { content_type, id } => Ok(SubjectRef::content(content_type, id)),
        }
    }
}

impl From<SubjectRef> for SubjectRepr {
    fn from(subject: SubjectRef) -> Self {
        match subject {
            SubjectRef::Content { content_type, id } => SubjectRepr::Content { content_type, id },
            SubjectRef::Deleted { .. } => SubjectRepr::Composed(subject.composed_identifier()),
        }
    }
}
