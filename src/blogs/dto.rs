use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::{Validate, ValidationError};

use crate::{
    auth::{dto::not_blank, repo_types::UserId},
    blogs::repo_types::{BlogChanges, BlogId, BlogRecord},
};

const TITLE_MAX_CHARS: usize = 200;

/// Non-blank, and at most 200 characters once trimmed (titles are stored trimmed).
fn valid_title(title: &str) -> Result<(), ValidationError> {
    not_blank(title)?;
    if title.trim().chars().count() <= TITLE_MAX_CHARS {
        return Ok(());
    }
    let mut err = ValidationError::new("max_length");
    err.message = Some(Cow::Borrowed(
        "Ensure this field has no more than 200 characters.",
    ));
    Err(err)
}

/// Body for `POST /blogs/` and `PUT /blogs/{id}/`. Server-owned fields
/// (`author`, timestamps, ...) are not declared and therefore ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct BlogInput {
    #[validate(
        required(message = "This field is required."),
        custom(function = "valid_title")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub content: Option<String>,
}

/// Body for `PATCH /blogs/{id}/`.
#[derive(Debug, Deserialize, Validate)]
pub struct BlogPatch {
    #[validate(custom(function = "valid_title"))]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub content: Option<String>,
}

impl From<BlogInput> for BlogChanges {
    fn from(input: BlogInput) -> Self {
        Self {
            title: input.title.map(|t| t.trim().to_owned()),
            content: input.content.map(|c| c.trim().to_owned()),
        }
    }
}

impl From<BlogPatch> for BlogChanges {
    fn from(patch: BlogPatch) -> Self {
        Self {
            title: patch.title.map(|t| t.trim().to_owned()),
            content: patch.content.map(|c| c.trim().to_owned()),
        }
    }
}

/// Wire shape of a blog.
#[derive(Debug, Serialize)]
pub struct BlogResponse {
    pub id: BlogId,
    pub title: String,
    pub content: String,
    pub author: UserId,
    pub author_username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<BlogRecord> for BlogResponse {
    fn from(r: BlogRecord) -> Self {
        Self {
            id: r.id,
            title: r.title,
            content: r.content,
            author: r.author_id,
            author_username: r.author_username,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
