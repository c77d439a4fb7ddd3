/// Project model and database operations
///
/// A project is the root of a planning board and is owned by exactly one
/// user. Every query that reads a project by id also filters by owner, so a
/// project belonging to someone else is indistinguishable from a missing
/// one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, user_id, title, description, created_at, updated_at";

/// Project owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,

    /// Owning user
    #[serde(rename = "userID")]
    pub user_id: Uuid,

    pub title: String,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

impl Project {
    /// Inserts a new project
    pub async fn create(pool: &PgPool, data: NewProject) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (user_id, title, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(data.user_id)
            .bind(data.title)
            .bind(data.description)
            .fetch_one(pool)
            .await
    }

    /// Finds a project by ID, scoped to its owner
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND user_id = $2");

        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a user's projects, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Persists title and description
    pub async fn save(pool: &PgPool, project: &Project) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET title = $2, description = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Project>(&query)
            .bind(project.id)
            .bind(&project.title)
            .bind(&project.description)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a project and, through `ON DELETE CASCADE`, its whole board
    ///
    /// Returns true if a row was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_wire_shape() {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Trip Plan".to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["userID"], project.user_id.to_string());
        assert_eq!(json["title"], "Trip Plan");
        assert!(json["description"].is_null());
        assert!(json.get("createdAt").is_some());
    }
}
