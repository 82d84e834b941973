use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User, UserId},
    },
    blogs::{
        repo::BlogRepo,
        repo_types::{BlogChanges, BlogId, BlogRecord, NewBlog},
    },
    store::StoreError,
};

#[derive(Debug, Clone)]
struct BlogRow {
    id: BlogId,
    author_id: UserId,
    title: String,
    content: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    blogs: Vec<BlogRow>,
    next_user_id: UserId,
    next_blog_id: BlogId,
}

impl Tables {
    fn join(&self, row: &BlogRow) -> BlogRecord {
        let author_username = self
            .users
            .iter()
            .find(|u| u.id == row.author_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        BlogRecord {
            id: row.id,
            title: row.title.clone(),
            content: row.content.clone(),
            author_id: row.author_id,
            author_username,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Process-local store with the same contract as [`super::PgStore`].
/// Used by `AppState::fake()` so handler tests run without a database.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate { field: "username" });
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BlogRepo for MemoryStore {
    async fn list(&self) -> Result<Vec<BlogRecord>, StoreError> {
        let tables = self.lock();
        let mut rows: Vec<&BlogRow> = tables.blogs.iter().collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows.into_iter().map(|row| tables.join(row)).collect())
    }

    async fn find(&self, id: BlogId) -> Result<Option<BlogRecord>, StoreError> {
        let tables = self.lock();
        Ok(tables.blogs.iter().find(|b| b.id == id).map(|row| tables.join(row)))
    }

    async fn insert(&self, blog: NewBlog) -> Result<BlogRecord, StoreError> {
        let mut tables = self.lock();
        tables.next_blog_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = BlogRow {
            id: tables.next_blog_id,
            author_id: blog.author_id,
            title: blog.title,
            content: blog.content,
            created_at: now,
            updated_at: now,
        };
        let record = tables.join(&row);
        tables.blogs.push(row);
        Ok(record)
    }

    async fn update(
        &self,
        id: BlogId,
        changes: BlogChanges,
    ) -> Result<Option<BlogRecord>, StoreError> {
        let mut tables = self.lock();
        let Some(row) = tables.blogs.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(content) = changes.content {
            row.content = content;
        }
        row.updated_at = OffsetDateTime::now_utc();
        let row = row.clone();
        Ok(Some(tables.join(&row)))
    }

    async fn delete(&self, id: BlogId) -> Result<bool, StoreError> {
        let mut tables = self.lock();
        let before = tables.blogs.len();
        tables.blogs.retain(|b| b.id != id);
        Ok(tables.blogs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: username.into(),
            password_hash: "hash".into(),
        }
    }

    fn new_blog(author_id: UserId, title: &str) -> NewBlog {
        NewBlog {
            author_id,
            title: title.into(),
            content: "C".into(),
        }
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = MemoryStore::new();
        let first = store.create(new_user("a@x.com")).await.unwrap();
        assert_eq!(first.id, 1);

        let err = store.create(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "username" }));

        let second = store.create(new_user("b@x.com")).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn blogs_carry_author_username() {
        let store = MemoryStore::new();
        let user = store.create(new_user("a@x.com")).await.unwrap();
        let blog = store.insert(new_blog(user.id, "T")).await.unwrap();

        assert_eq!(blog.author_id, user.id);
        assert_eq!(blog.author_username, "a@x.com");
        assert_eq!(blog.created_at, blog.updated_at);
        let found = store.find(blog.id).await.unwrap().unwrap();
        assert_eq!(found.title, "T");
    }

    #[tokio::test]
    async fn list_orders_newest_first_with_id_tiebreak() {
        let store = MemoryStore::new();
        let user = store.create(new_user("a@x.com")).await.unwrap();
        for title in ["one", "two", "three"] {
            store.insert(new_blog(user.id, title)).await.unwrap();
        }

        let titles: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["three", "two", "one"]);
    }

    #[tokio::test]
    async fn update_applies_only_given_fields() {
        let store = MemoryStore::new();
        let user = store.create(new_user("a@x.com")).await.unwrap();
        let blog = store.insert(new_blog(user.id, "T")).await.unwrap();

        let changes = BlogChanges {
            title: Some("T2".into()),
            content: None,
        };
        let updated = store.update(blog.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.title, "T2");
        assert_eq!(updated.content, "C");
        assert_eq!(updated.created_at, blog.created_at);
        assert!(updated.updated_at >= blog.updated_at);

        assert!(store.update(999, BlogChanges::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let store = MemoryStore::new();
        let user = store.create(new_user("a@x.com")).await.unwrap();
        let blog = store.insert(new_blog(user.id, "T")).await.unwrap();

        assert!(store.delete(blog.id).await.unwrap());
        assert!(!store.delete(blog.id).await.unwrap());
        assert!(store.find(blog.id).await.unwrap().is_none());
    }
}
