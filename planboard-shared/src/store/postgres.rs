//! Postgres implementation of [`PlannerStore`]

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{PlannerStore, StoreError, StoreResult, EMAIL_TAKEN, USERNAME_TAKEN};
use crate::db::pool::health_check;
use crate::models::{
    Feature, List, NewFeature, NewList, NewProject, NewTask, NewUser, NewUserStory, Project,
    ProjectTree, Task, User, UserStory,
};
use crate::ordering::{PositionUpdate, SiblingLevel};

/// Store backed by a sqlx Postgres pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique-index violations on `users` to `Conflict`
fn user_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some("users_username_key") => USERNAME_TAKEN,
                Some("users_email_key") => EMAIL_TAKEN,
                other => {
                    warn!(constraint = ?other, "Unexpected unique violation on users");
                    "Account already exists"
                }
            };
            return StoreError::Conflict(message.to_string());
        }
    }
    StoreError::Database(e)
}

fn position_query(level: SiblingLevel) -> String {
    format!(
        "UPDATE {} SET position = $2, updated_at = NOW() WHERE id = $1",
        level.table()
    )
}

#[async_trait]
impl PlannerStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        User::create(&self.pool, user).await.map_err(user_write_error)
    }

    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn save_user(&self, user: &User) -> StoreResult<User> {
        User::save(&self.pool, user)
            .await
            .map_err(user_write_error)?
            .ok_or(StoreError::NotFound("User"))
    }

    async fn adjust_project_count(&self, user_id: Uuid, delta: i32) -> StoreResult<User> {
        User::adjust_project_count(&self.pool, user_id, delta)
            .await?
            .ok_or(StoreError::NotFound("User"))
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, project).await?)
    }

    async fn projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        Ok(Project::list_by_user(&self.pool, user_id).await?)
    }

    async fn project_tree(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> StoreResult<Option<ProjectTree>> {
        Ok(ProjectTree::load(&self.pool, user_id, project_id).await?)
    }

    async fn save_project(&self, project: &Project) -> StoreResult<Project> {
        Project::save(&self.pool, project)
            .await?
            .ok_or(StoreError::NotFound("Project"))
    }

    async fn delete_project(&self, project_id: Uuid) -> StoreResult<()> {
        if Project::delete(&self.pool, project_id).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound("Project"))
        }
    }

    async fn insert_list(&self, list: NewList) -> StoreResult<List> {
        Ok(List::create(&self.pool, list).await?)
    }

    async fn save_list(&self, list: &List) -> StoreResult<List> {
        List::save(&self.pool, list)
            .await?
            .ok_or(StoreError::NotFound("List"))
    }

    async fn insert_feature(&self, feature: NewFeature) -> StoreResult<Feature> {
        Ok(Feature::create(&self.pool, feature).await?)
    }

    async fn save_feature(&self, feature: &Feature) -> StoreResult<Feature> {
        Feature::save(&self.pool, feature)
            .await?
            .ok_or(StoreError::NotFound("Feature"))
    }

    async fn insert_user_story(&self, story: NewUserStory) -> StoreResult<UserStory> {
        Ok(UserStory::create(&self.pool, story).await?)
    }

    async fn save_user_story(&self, story: &UserStory) -> StoreResult<UserStory> {
        UserStory::save(&self.pool, story)
            .await?
            .ok_or(StoreError::NotFound("User story"))
    }

    async fn insert_task(&self, task: NewTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, task).await?)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Task> {
        Task::save(&self.pool, task)
            .await?
            .ok_or(StoreError::NotFound("Task"))
    }

    async fn reposition(&self, level: SiblingLevel, updates: &[PositionUpdate]) -> StoreResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let query = position_query(level);
        let mut tx = self.pool.begin().await?;

        for update in updates {
            let result = sqlx::query(&query)
                .bind(update.id)
                .bind(update.position)
                .execute(&mut *tx)
                .await?;

            // dropping the transaction rolls back earlier writes
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(level.entity()));
            }
        }

        tx.commit().await?;
        debug!(table = level.table(), writes = updates.len(), "Positions updated");
        Ok(())
    }

    async fn delete_node(
        &self,
        level: SiblingLevel,
        id: Uuid,
        compaction: &[PositionUpdate],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let delete = format!("DELETE FROM {} WHERE id = $1", level.table());
        let result = sqlx::query(&delete).bind(id).execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(level.entity()));
        }

        let query = position_query(level);
        for update in compaction {
            sqlx::query(&query)
                .bind(update.id)
                .bind(update.position)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(table = level.table(), %id, compacted = compaction.len(), "Row deleted");
        Ok(())
    }
}
