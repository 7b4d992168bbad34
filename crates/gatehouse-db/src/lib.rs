//! # Gatehouse DB
//!
//! User persistence for the Gatehouse API.
//!
//! - [`UserRepository`]: the async trait the session layer talks to
//! - [`PgUserRepository`]: SQLx/PostgreSQL implementation
//! - [`InMemoryUserRepository`]: process-local implementation for development
//!   and tests
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_db::{PgUserRepository, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&database_url).await?;
//! run_migrations(&pool).await?;
//! let users = PgUserRepository::new(pool);
//! ```

use sqlx::migrate::Migrate;
use tracing::info;

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;
pub use repository::{RepositoryError, UserRepository};

// Re-export PgPool for convenience
pub use sqlx::PgPool;
pub use sqlx::migrate::MigrateError;

/// Connects a PostgreSQL pool.
///
/// The returned pool is cheaply cloneable; create it once at startup.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Applies the embedded migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!().run(pool).await
}

/// Reverts the most recently applied migration.
///
/// Returns the reverted version, or `None` when nothing was applied.
pub async fn revert_last_migration(pool: &PgPool) -> Result<Option<i64>, MigrateError> {
    let applied: Vec<i64> = {
        let mut conn = pool.acquire().await?;
        conn.ensure_migrations_table().await?;
        conn.list_applied_migrations()
            .await?
            .into_iter()
            .map(|migration| migration.version)
            .collect()
    };

    let Some((latest, target)) = revert_target(&applied) else {
        return Ok(None);
    };

    sqlx::migrate!().undo(pool, target).await?;
    info!(version = latest, "Reverted migration");
    Ok(Some(latest))
}

/// For a set of applied versions, the latest one and the version to undo
/// down to so that only the latest is reverted.
fn revert_target(applied: &[i64]) -> Option<(i64, i64)> {
    let latest = applied.iter().copied().max()?;
    let target = applied
        .iter()
        .copied()
        .filter(|version| *version < latest)
        .max()
        .unwrap_or(0);
    Some((latest, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_target_with_nothing_applied() {
        assert_eq!(revert_target(&[]), None);
    }

    #[test]
    fn test_revert_target_single_migration() {
        assert_eq!(revert_target(&[20250101000000]), Some((20250101000000, 0)));
    }

    #[test]
    fn test_revert_target_only_latest() {
        let applied = [20250101000000, 20250301000000, 20250201000000];
        assert_eq!(
            revert_target(&applied),
            Some((20250301000000, 20250201000000))
        );
    }
}
