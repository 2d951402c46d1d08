//! User repository.
//!
//! Handles user registration, lookup, and deletion. Email uniqueness is
//! enforced by the store's UNIQUE constraint, so concurrent duplicate
//! registrations resolve to exactly one winner without application locking.

use super::DbError;
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

/// A registered user. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Registration request data.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new user.
    ///
    /// The password is stored as an Argon2 hash. Duplicate emails surface as
    /// [`DbError::UserExists`] via the UNIQUE constraint.
    pub async fn create(&self, new_user: &NewUser<'_>) -> Result<User, DbError> {
        let password_hash = hash_password(new_user.password)?;
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, registered_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(&password_hash)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            // Convert UNIQUE constraint violation to UserExists error
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::UserExists(new_user.email.to_string());
            }
            DbError::from(e)
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: new_user.username.to_string(),
            first_name: new_user.first_name.to_string(),
            last_name: new_user.last_name.to_string(),
            email: new_user.email.to_string(),
        })
    }

    /// Look up a user by id.
    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        let row = sqlx::query_as::<_, (i64, String, String, String, String)>(
            r#"
            SELECT id, username, first_name, last_name, email
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|(id, username, first_name, last_name, email)| User {
            id,
            username,
            first_name,
            last_name,
            email,
        })
        .ok_or(DbError::UserNotFound(id))
    }

    /// Look up a user by email, returning `None` if not registered.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, (i64, String, String, String, String)>(
            r#"
            SELECT id, username, first_name, last_name, email
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(
            row.map(|(id, username, first_name, last_name, email)| User {
                id,
                username,
                first_name,
                last_name,
                email,
            }),
        )
    }

    /// Delete a user by id.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::UserNotFound(id));
        }

        Ok(())
    }
}

/// Hash a password using Argon2 with a random salt.
fn hash_password(password: &str) -> Result<String, DbError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbError::Internal(format!("password hashing failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn sample_user<'a>() -> NewUser<'a> {
        NewUser {
            email: "unique@email.com",
            password: "pass",
            username: "unique",
            first_name: "fff",
            last_name: "lll",
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let db = Database::new(":memory:").await.unwrap();

        let created = db.users().create(&sample_user()).await.unwrap();
        assert!(created.id > 0);

        let fetched = db.users().get(created.id).await.unwrap();
        assert_eq!(fetched.email, "unique@email.com");
        assert_eq!(fetched.username, "unique");
        assert_eq!(fetched.first_name, "fff");
        assert_eq!(fetched.last_name, "lll");
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let db = Database::new(":memory:").await.unwrap();

        db.users().create(&sample_user()).await.unwrap();
        let err = db.users().create(&sample_user()).await.unwrap_err();

        assert!(matches!(err, DbError::UserExists(ref email) if email == "unique@email.com"));
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let db = Database::new(":memory:").await.unwrap();

        let err = db.users().get(42).await.unwrap_err();
        assert!(matches!(err, DbError::UserNotFound(42)));
    }

    #[tokio::test]
    async fn delete_removes_user() {
        let db = Database::new(":memory:").await.unwrap();

        let created = db.users().create(&sample_user()).await.unwrap();
        db.users().delete(created.id).await.unwrap();

        let err = db.users().delete(created.id).await.unwrap_err();
        assert!(matches!(err, DbError::UserNotFound(_)));
        assert!(
            db.users()
                .find_by_email("unique@email.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn password_is_stored_hashed() {
        let db = Database::new(":memory:").await.unwrap();

        db.users().create(&sample_user()).await.unwrap();

        let stored: String =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE email = ?")
                .bind("unique@email.com")
                .fetch_one(db.pool())
                .await
                .unwrap();

        assert_ne!(stored, "pass");
        assert!(stored.starts_with("$argon2"));
    }
}
