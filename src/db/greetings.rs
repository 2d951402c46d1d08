//! Greeting counter repository.
//!
//! Tracks how many times each name has hit `/v1/hello`. The increment is a
//! single atomic upsert so concurrent greetings for the same name never lose
//! updates.

use super::DbError;
use sqlx::SqlitePool;

/// Repository for greeting counter operations.
pub struct GreetingRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> GreetingRepository<'a> {
    /// Create a new greeting repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a visit for `name` and return the updated count.
    ///
    /// First visit creates the row with count=1; later visits increment it.
    /// The upsert runs as one statement, so the read-increment-write sequence
    /// cannot interleave with a concurrent caller.
    pub async fn record_visit(&self, name: &str) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO greetings (name, count)
            VALUES (?, 1)
            ON CONFLICT(name) DO UPDATE SET count = count + 1
            RETURNING count
            "#,
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Number of recorded visits for `name`, 0 if never greeted.
    pub async fn visit_count(&self, name: &str) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT count FROM greetings WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(count.unwrap_or(0))
    }
}
