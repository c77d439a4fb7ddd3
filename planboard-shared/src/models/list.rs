/// List model and database operations
///
/// Lists are the columns of a project board. Each list has a `position`
/// among its project's lists; the default "To Do" list created with every
/// project sits at position 0.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, project_id, title, description, position, created_at, updated_at";

/// Column of a project board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: Uuid,

    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    pub title: String,

    pub description: Option<String>,

    /// Zero-based index among the project's lists
    pub position: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new list
#[derive(Debug, Clone)]
pub struct NewList {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
}

impl List {
    /// Inserts a new list
    pub async fn create(pool: &PgPool, data: NewList) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO lists (project_id, title, description, position)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, List>(&query)
            .bind(data.project_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.position)
            .fetch_one(pool)
            .await
    }

    /// Loads every list of a project, in board order
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lists WHERE project_id = $1 ORDER BY position, created_at"
        );

        sqlx::query_as::<_, List>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Persists title and description; `position` is written by reorder
    pub async fn save(pool: &PgPool, list: &List) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE lists SET title = $2, description = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, List>(&query)
            .bind(list.id)
            .bind(&list.title)
            .bind(&list.description)
            .fetch_optional(pool)
            .await
    }
}
