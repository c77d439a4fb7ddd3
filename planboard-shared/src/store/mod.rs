//! Persistence seam for the planning board
//!
//! Services never talk to sqlx directly; they hold an
//! `Arc<dyn PlannerStore>`. [`postgres::PgStore`] is the production
//! implementation and [`memory::InMemoryStore`] backs the API's tests.
//!
//! Multi-row writes ([`PlannerStore::reposition`] and
//! [`PlannerStore::delete_node`]) are atomic in both implementations: either
//! every position write lands or none does.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Feature, List, NewFeature, NewList, NewProject, NewTask, NewUser, NewUserStory, Project,
    ProjectTree, Task, User, UserStory,
};
use crate::ordering::{PositionUpdate, SiblingLevel};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Conflict message for a username already in use
pub const USERNAME_TAKEN: &str = "Username already taken";

/// Conflict message for an email address already in use
pub const EMAIL_TAKEN: &str = "Email address already in use";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Row to update or delete doesn't exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique constraint violated
    #[error("{0}")]
    Conflict(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations used by the API services
#[async_trait]
pub trait PlannerStore: Send + Sync {
    /// Checks the backing store is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a user; `Conflict` if the username or email is taken
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Case-insensitive lookup
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Case-insensitive lookup
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Persists the mutable fields of `user` except `project_count`
    async fn save_user(&self, user: &User) -> StoreResult<User>;

    /// Adds `delta` to the user's project count, clamped at zero
    async fn adjust_project_count(&self, user_id: Uuid, delta: i32) -> StoreResult<User>;

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project>;

    async fn projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>>;

    /// Loads a project owned by `user_id` with its whole board
    async fn project_tree(&self, user_id: Uuid, project_id: Uuid)
        -> StoreResult<Option<ProjectTree>>;

    async fn save_project(&self, project: &Project) -> StoreResult<Project>;

    /// Deletes a project and everything on its board
    async fn delete_project(&self, project_id: Uuid) -> StoreResult<()>;

    async fn insert_list(&self, list: NewList) -> StoreResult<List>;

    async fn save_list(&self, list: &List) -> StoreResult<List>;

    async fn insert_feature(&self, feature: NewFeature) -> StoreResult<Feature>;

    async fn save_feature(&self, feature: &Feature) -> StoreResult<Feature>;

    async fn insert_user_story(&self, story: NewUserStory) -> StoreResult<UserStory>;

    async fn save_user_story(&self, story: &UserStory) -> StoreResult<UserStory>;

    async fn insert_task(&self, task: NewTask) -> StoreResult<Task>;

    async fn save_task(&self, task: &Task) -> StoreResult<Task>;

    /// Writes new positions for rows of one level, in order, atomically
    async fn reposition(&self, level: SiblingLevel, updates: &[PositionUpdate]) -> StoreResult<()>;

    /// Deletes one row (and its descendants) and applies the sibling
    /// compaction writes, atomically
    async fn delete_node(
        &self,
        level: SiblingLevel,
        id: Uuid,
        compaction: &[PositionUpdate],
    ) -> StoreResult<()>;
}
