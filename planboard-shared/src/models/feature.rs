/// Feature model and database operations
///
/// Features are the cards inside a list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Card inside a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,

    pub title: String,

    pub description: Option<String>,

    /// Zero-based index among the list's features
    pub position: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new feature
#[derive(Debug, Clone)]
pub struct NewFeature {
    pub list_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
}

impl Feature {
    /// Inserts a new feature
    pub async fn create(pool: &PgPool, data: NewFeature) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Feature>(
            r#"
            INSERT INTO features (list_id, title, description, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, list_id, title, description, position, created_at, updated_at
            "#,
        )
        .bind(data.list_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    /// Loads every feature on a project's board
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Feature>(
            r#"
            SELECT f.id, f.list_id, f.title, f.description, f.position, f.created_at, f.updated_at
            FROM features f
            JOIN lists l ON l.id = f.list_id
            WHERE l.project_id = $1
            ORDER BY f.list_id, f.position, f.created_at
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Persists title and description
    pub async fn save(pool: &PgPool, feature: &Feature) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Feature>(
            r#"
            UPDATE features SET title = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, list_id, title, description, position, created_at, updated_at
            "#,
        )
        .bind(feature.id)
        .bind(&feature.title)
        .bind(&feature.description)
        .fetch_optional(pool)
        .await
    }
}
