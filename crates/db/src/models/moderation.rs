//! Rows of the `moderations` view and their conversion into
//! [`ModerationItem`]s.

use agora_core::error::CoreError;
use agora_core::moderation::{
    CommentPost, ContextRef, ModeratableType, ModerationContext, ModerationItem,
};
use agora_core::multiloc::Multiloc;
use agora_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `moderations` view with its resolved status.
///
/// Parent columns are NULL where they do not apply to the item's type.
#[derive(Debug, Clone, FromRow)]
pub struct ModerationRow {
    pub id: DbId,
    pub moderatable_type: String,
    pub content_title_multiloc: Option<Json<Multiloc>>,
    pub content_body_multiloc: Json<Multiloc>,
    pub content_slug: Option<String>,
    pub created_at: Timestamp,
    pub project_id: Option<DbId>,
    pub project_slug: Option<String>,
    pub project_title_multiloc: Option<Json<Multiloc>>,
    pub post_id: Option<DbId>,
    pub post_type: Option<String>,
    pub post_slug: Option<String>,
    pub post_title_multiloc: Option<Json<Multiloc>>,
    /// `COALESCE`d to `unread` by the query.
    pub moderation_status: String,
}

impl ModerationRow {
    fn project(&self) -> Result<ContextRef, CoreError> {
        context_ref(
            self.project_id,
            &self.project_slug,
            &self.project_title_multiloc,
        )
        .ok_or_else(|| self.missing("project"))
    }

    fn post(&self) -> Result<ContextRef, CoreError> {
        context_ref(self.post_id, &self.post_slug, &self.post_title_multiloc)
            .ok_or_else(|| self.missing("post"))
    }

    fn missing(&self, what: &str) -> CoreError {
        CoreError::Internal(format!(
            "{} {} has no {what} in the moderations view",
            self.moderatable_type, self.id
        ))
    }

    fn context(&self) -> Result<ModerationContext, CoreError> {
        let context = match self.moderatable_type.parse::<ModeratableType>()? {
            ModeratableType::Idea => ModerationContext::Idea {
                project: self.project()?,
            },
            ModeratableType::Initiative => ModerationContext::Initiative,
            ModeratableType::Comment => match self.post_type.as_deref() {
                Some("Idea") => ModerationContext::Comment(CommentPost::Idea {
                    project: self.project()?,
                    idea: self.post()?,
                }),
                Some("Initiative") => ModerationContext::Comment(CommentPost::Initiative {
                    initiative: self.post()?,
                }),
                _ => return Err(self.missing("post type")),
            },
        };
        Ok(context)
    }
}

fn context_ref(
    id: Option<DbId>,
    slug: &Option<String>,
    title: &Option<Json<Multiloc>>,
) -> Option<ContextRef> {
    Some(ContextRef {
        id: id?,
        slug: slug.clone()?,
        title_multiloc: title.as_ref().map(|t| t.0.clone()).unwrap_or_default(),
    })
}

impl TryFrom<ModerationRow> for ModerationItem {
    type Error = CoreError;

    fn try_from(row: ModerationRow) -> Result<Self, Self::Error> {
        let context = row.context()?;
        Ok(ModerationItem {
            id: row.id,
            context,
            content_title_multiloc: row.content_title_multiloc.map(|t| t.0),
            content_body_multiloc: row.content_body_multiloc.0,
            content_slug: row.content_slug,
            created_at: row.created_at,
            moderation_status: row.moderation_status.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use agora_core::moderation::ModerationStatus;

    use super::*;

    fn title(en: &str) -> Json<Multiloc> {
        Json(Multiloc::from([("en".to_string(), en.to_string())]))
    }

    fn row(moderatable_type: &str) -> ModerationRow {
        ModerationRow {
            id: 7,
            moderatable_type: moderatable_type.to_string(),
            content_title_multiloc: None,
            content_body_multiloc: title("body"),
            content_slug: None,
            created_at: chrono::Utc::now(),
            project_id: None,
            project_slug: None,
            project_title_multiloc: None,
            post_id: None,
            post_type: None,
            post_slug: None,
            post_title_multiloc: None,
            moderation_status: "unread".to_string(),
        }
    }

    #[test]
    fn comment_on_initiative_takes_title_from_post() {
        let mut r = row("Comment");
        r.post_id = Some(3);
        r.post_type = Some("Initiative".to_string());
        r.post_slug = Some("cleaner-parks".to_string());
        r.post_title_multiloc = Some(title("Cleaner parks"));

        let item = ModerationItem::try_from(r).unwrap();
        assert_matches!(
            item.context,
            ModerationContext::Comment(CommentPost::Initiative { ref initiative })
                if initiative.id == 3 && initiative.title_multiloc["en"] == "Cleaner parks"
        );
        assert_eq!(item.moderation_status, ModerationStatus::Unread);
    }

    #[test]
    fn idea_without_project_is_an_internal_error() {
        assert_matches!(
            ModerationItem::try_from(row("Idea")),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert_matches!(
            ModerationItem::try_from(row("Vote")),
            Err(CoreError::Validation(_))
        );
    }
}
