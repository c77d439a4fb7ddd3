/// User story model and database operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User story belonging to a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: Uuid,

    #[serde(rename = "featureID")]
    pub feature_id: Uuid,

    pub title: String,

    pub description: Option<String>,

    pub position: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user story
#[derive(Debug, Clone)]
pub struct NewUserStory {
    pub feature_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
}

impl UserStory {
    /// Inserts a new user story
    pub async fn create(pool: &PgPool, data: NewUserStory) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, UserStory>(
            r#"
            INSERT INTO user_stories (feature_id, title, description, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, feature_id, title, description, position, created_at, updated_at
            "#,
        )
        .bind(data.feature_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    /// Loads every user story on a project's board
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserStory>(
            r#"
            SELECT s.id, s.feature_id, s.title, s.description, s.position,
                   s.created_at, s.updated_at
            FROM user_stories s
            JOIN features f ON f.id = s.feature_id
            JOIN lists l ON l.id = f.list_id
            WHERE l.project_id = $1
            ORDER BY s.feature_id, s.position, s.created_at
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Persists title and description
    pub async fn save(pool: &PgPool, story: &UserStory) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserStory>(
            r#"
            UPDATE user_stories SET title = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, feature_id, title, description, position, created_at, updated_at
            "#,
        )
        .bind(story.id)
        .bind(&story.title)
        .bind(&story.description)
        .fetch_optional(pool)
        .await
    }
}
