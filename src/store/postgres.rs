use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::StoreError;
use crate::config::AppConfig;

/// Postgres-backed store. Repository impls live next to their domain
/// (`auth::repo`, `blogs::repo`).
#[derive(Clone)]
pub struct PgStore {
    pub db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

/// Maps a unique-constraint violation to [`StoreError::Duplicate`] using a
/// `(constraint, field)` table; everything else stays a database error.
pub(crate) fn map_unique_violation(
    e: sqlx::Error,
    constraints: &[(&str, &'static str)],
) -> StoreError {
    if let sqlx::Error::Database(ref d) = e {
        if let Some(constraint) = d.constraint() {
            if let Some((_, field)) = constraints.iter().find(|(c, _)| *c == constraint) {
                return StoreError::Duplicate { field: *field };
            }
        }
    }
    StoreError::Database(e)
}
