//! PostgreSQL-backed store implementation.
//!
//! Atomicity comes from the database: the reservation guard is a single
//! conditional `UPDATE`, and every multi-row write runs in a transaction.
//! Money is stored as `BIGINT` paise; status enums as `TEXT` in their
//! snake_case form, rejected as [`StoreError::Corrupt`] when a stored
//! string no longer parses.

mod cart;
mod catalog;
mod custom_orders;
mod inventory;
mod ledger;
mod orders;

use sqlx::PgPool;

use crate::{Result, StoreError};

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

/// Maps a stored enum string through its domain parser, surfacing unknown
/// values as corruption rather than panicking.
pub(crate) fn parse_stored<T>(
    what: &str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T> {
    parse(value).ok_or_else(|| StoreError::Corrupt(format!("unknown {what}: {value:?}")))
}

/// Maps a stored quantity column into `u32`, rejecting negatives.
pub(crate) fn parse_quantity(what: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {what}: {value}")))
}
