use axum::async_trait;

use crate::blogs::repo_types::{BlogChanges, BlogId, BlogRecord, NewBlog};
use crate::store::{PgStore, StoreError};

#[async_trait]
pub trait BlogRepo: Send + Sync {
    /// All blogs, newest first.
    async fn list(&self) -> Result<Vec<BlogRecord>, StoreError>;
    async fn find(&self, id: BlogId) -> Result<Option<BlogRecord>, StoreError>;
    async fn insert(&self, blog: NewBlog) -> Result<BlogRecord, StoreError>;
    /// Applies `changes` and refreshes `updated_at`. `None` if the blog is gone.
    async fn update(&self, id: BlogId, changes: BlogChanges)
        -> Result<Option<BlogRecord>, StoreError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: BlogId) -> Result<bool, StoreError>;
}

#[async_trait]
impl BlogRepo for PgStore {
    async fn list(&self) -> Result<Vec<BlogRecord>, StoreError> {
        let rows = sqlx::query_as::<_, BlogRecord>(
            r#"
            SELECT b.id, b.title, b.content, b.author_id, u.username AS author_username,
                   b.created_at, b.updated_at
            FROM blogs b
            JOIN users u ON u.id = b.author_id
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: BlogId) -> Result<Option<BlogRecord>, StoreError> {
        let row = sqlx::query_as::<_, BlogRecord>(
            r#"
            SELECT b.id, b.title, b.content, b.author_id, u.username AS author_username,
                   b.created_at, b.updated_at
            FROM blogs b
            JOIN users u ON u.id = b.author_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert(&self, blog: NewBlog) -> Result<BlogRecord, StoreError> {
        let row = sqlx::query_as::<_, BlogRecord>(
            r#"
            WITH inserted AS (
                INSERT INTO blogs (author_id, title, content)
                VALUES ($1, $2, $3)
                RETURNING id, title, content, author_id, created_at, updated_at
            )
            SELECT i.id, i.title, i.content, i.author_id, u.username AS author_username,
                   i.created_at, i.updated_at
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(blog.author_id)
        .bind(&blog.title)
        .bind(&blog.content)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: BlogId,
        changes: BlogChanges,
    ) -> Result<Option<BlogRecord>, StoreError> {
        let row = sqlx::query_as::<_, BlogRecord>(
            r#"
            WITH updated AS (
                UPDATE blogs
                SET title = COALESCE($2, title),
                    content = COALESCE($3, content),
                    updated_at = now()
                WHERE id = $1
                RETURNING id, title, content, author_id, created_at, updated_at
            )
            SELECT d.id, d.title, d.content, d.author_id, u.username AS author_username,
                   d.created_at, d.updated_at
            FROM updated d
            JOIN users u ON u.id = d.author_id
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: BlogId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
