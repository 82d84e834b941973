use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

pub type UserId = i64;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: UserId,                 // server-generated
    pub username: String,           // normalized email
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 PHC string, never exposed
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Values needed to insert a user; the hash is computed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
