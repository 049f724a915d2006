//! SQLite connection pooling.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::time::Duration;
use tracing::info;

use super::error::CourseError;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_courses.sql");
const SEED_SQL: &str = include_str!("../../../../sql/seed_courses.sql");

/// Path that selects a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;

/// Settings used to build the pool.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Database file, or `:memory:`
    pub db_path: String,
    pub max_size: u32,
    /// How long a request waits for a free connection
    pub acquire_timeout: Duration,
}

impl PoolSettings {
    /// Settings for a throwaway in-memory database.
    pub fn in_memory() -> Self {
        Self {
            db_path: MEMORY_PATH.to_string(),
            max_size: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path == MEMORY_PATH
    }
}

/// Creates the pool and makes sure every connection sees the course schema.
///
/// Each in-memory connection is its own database, so an in-memory pool is
/// capped at a single connection that is never recycled.
pub fn create_pool(settings: &PoolSettings) -> Result<DbPool, CourseError> {
    let manager = if settings.is_in_memory() {
        SqliteConnectionManager::memory()
    } else {
        SqliteConnectionManager::file(&settings.db_path)
    };
    let manager = manager.with_init(|conn| conn.execute_batch(SCHEMA_SQL));

    let builder = Pool::builder().connection_timeout(settings.acquire_timeout);
    let builder = if settings.is_in_memory() {
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder.max_size(settings.max_size.max(1))
    };

    let pool = builder.build(manager)?;
    info!(
        "Opened course database at {} (pool size {})",
        settings.db_path,
        pool.max_size()
    );

    Ok(pool)
}

/// Loads the reference courses. Existing IDs are left untouched.
pub fn seed(pool: &DbPool) -> Result<(), CourseError> {
    let conn = pool.get()?;
    conn.execute_batch(SEED_SQL)?;
    Ok(())
}
