//! Profile store adapter — read-only lookup of psychometric profiles.
//!
//! Trait-based so pipeline code and tests never need a live database; the
//! production backend is the `psychometry_data` PostgreSQL table.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::profile::PsychometricProfile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns the profile for `user_id`, or `ProfileNotFound`.
    async fn lookup(&self, user_id: i32) -> Result<PsychometricProfile, AppError>;
}

/// PostgreSQL-backed profile store.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        PgProfileStore { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn lookup(&self, user_id: i32) -> Result<PsychometricProfile, AppError> {
        let profile: Option<PsychometricProfile> =
            sqlx::query_as("SELECT * FROM psychometry_data WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        profile.ok_or(AppError::ProfileNotFound(user_id))
    }
}

/// In-memory store for tests.
#[cfg(test)]
pub(crate) struct StaticProfileStore(pub Vec<PsychometricProfile>);

#[cfg(test)]
#[async_trait]
impl ProfileStore for StaticProfileStore {
    async fn lookup(&self, user_id: i32) -> Result<PsychometricProfile, AppError> {
        self.0
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or(AppError::ProfileNotFound(user_id))
    }
}
