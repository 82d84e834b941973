use sqlx::FromRow;
use time::OffsetDateTime;

use crate::auth::repo_types::UserId;

pub type BlogId = i64;

/// Blog row joined with its author's username.
#[derive(Debug, Clone, FromRow)]
pub struct BlogRecord {
    pub id: BlogId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub author_username: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewBlog {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}
