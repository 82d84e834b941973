//! Persistence backends behind the `UserRepo` and `BlogRepo` traits.

#[cfg(test)]
mod memory;
mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub(crate) use postgres::map_unique_violation;

/// Errors surfaced by any repository implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value for unique field {field}")]
    Duplicate { field: &'static str },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
