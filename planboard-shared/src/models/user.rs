/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     first_name VARCHAR(255) NOT NULL,
///     last_name VARCHAR(255) NOT NULL,
///     username VARCHAR(255) NOT NULL,    -- unique on LOWER(username)
///     email VARCHAR(255) NOT NULL,       -- unique on LOWER(email)
///     password_hash VARCHAR(255) NOT NULL,
///     project_count INTEGER NOT NULL DEFAULT 0,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Serializing a [`User`] produces the account view returned by the API:
/// camelCase fields without `passwordHash` or `isActive`.
///
/// # Example
///
/// ```no_run
/// use planboard_shared::models::user::{NewUser, User};
/// use planboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, NewUser {
///     first_name: "Dan".to_string(),
///     last_name: "Neri".to_string(),
///     username: "dneri".to_string(),
///     email: "dan@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_username(&pool, "DNeri").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, first_name, last_name, username, email, password_hash, \
                       project_count, is_active, created_at, updated_at";

/// User account
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    pub first_name: String,

    pub last_name: String,

    /// Lower-cased username, unique across all users
    pub username: String,

    /// Lower-cased email address, unique across all users
    pub email: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Number of projects owned by the user
    pub project_count: i32,

    #[serde(skip_serializing)]
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// `username` and `email` are expected to be lower-cased by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_username_key` or
    /// `users_email_key` when the username or email is taken.
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (first_name, last_name, username, email, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by username (case-insensitive)
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)");

        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Writes the profile, credential and status columns of `user` back to
    /// its row
    ///
    /// `project_count` is left alone; it only moves through
    /// [`User::adjust_project_count`]. Returns the stored row with a fresh
    /// `updated_at`, or `None` if the user no longer exists.
    pub async fn save(pool: &PgPool, user: &User) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE users
             SET first_name = $2, last_name = $3, username = $4, email = $5,
                 password_hash = $6, is_active = $7,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Adds `delta` to `project_count`, never going below zero
    ///
    /// Touches no other column, so it cannot undo a concurrent password
    /// change.
    pub async fn adjust_project_count(
        pool: &PgPool,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE users
             SET project_count = GREATEST(project_count + $2, 0), updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(delta)
            .fetch_optional(pool)
            .await
    }

    /// Display name used in greetings ("Dan Neri")
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            first_name: "Dan".to_string(),
            last_name: "Neri".to_string(),
            username: "dneri".to_string(),
            email: "dan@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            project_count: 2,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_account_view_hides_credentials() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["firstName"], "Dan");
        assert_eq!(json["lastName"], "Neri");
        assert_eq!(json["projectCount"], 2);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("isActive").is_none());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample().full_name(), "Dan Neri");
    }
}
