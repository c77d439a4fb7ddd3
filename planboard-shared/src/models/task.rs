/// Task model and database operations
///
/// Tasks are the checklist items of a user story: free-text `content` plus a
/// `completed` flag.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_story_id UUID NOT NULL REFERENCES user_stories(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     position INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Checklist item of a user story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,

    #[serde(rename = "userStoryID")]
    pub user_story_id: Uuid,

    pub content: String,

    pub completed: bool,

    pub position: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_story_id: Uuid,
    pub content: String,
    pub completed: bool,
    pub position: i32,
}

impl Task {
    /// Inserts a new task
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_story_id, content, completed, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_story_id, content, completed, position, created_at, updated_at
            "#,
        )
        .bind(data.user_story_id)
        .bind(data.content)
        .bind(data.completed)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    /// Loads every task on a project's board
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.user_story_id, t.content, t.completed, t.position,
                   t.created_at, t.updated_at
            FROM tasks t
            JOIN user_stories s ON s.id = t.user_story_id
            JOIN features f ON f.id = s.feature_id
            JOIN lists l ON l.id = f.list_id
            WHERE l.project_id = $1
            ORDER BY t.user_story_id, t.position, t.created_at
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Persists content and completion state
    pub async fn save(pool: &PgPool, task: &Task) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET content = $2, completed = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_story_id, content, completed, position, created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(&task.content)
        .bind(task.completed)
        .fetch_optional(pool)
        .await
    }
}
