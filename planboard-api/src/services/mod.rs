//! Business logic behind the route handlers
//!
//! [`Services::new`] is the composition root: it wires every service to the
//! store, the mailer and the configuration. Child services of the board
//! (lists, features, user stories, tasks) reach projects only through the
//! narrow [`ProjectLookup`] capability.
//!
//! Every board service follows the same shape: load the caller's project
//! tree, walk down the parent chain named in the request, mutate, persist,
//! and return the affected sibling collection.

use std::sync::Arc;

use async_trait::async_trait;
use planboard_shared::{
    auth::password::{hash_password_with, verify_password, HashCost},
    models::ProjectTree,
    ordering::{self, Positioned, SiblingLevel},
    store::PlannerStore,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    mail::Mailer,
};

pub mod auth;
pub mod features;
pub mod lists;
pub mod projects;
pub mod tasks;
pub mod user_stories;
pub mod users;

pub use auth::AuthService;
pub use features::FeatureService;
pub use lists::ListService;
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use user_stories::UserStoryService;
pub use users::UserService;

pub const INVALID_LIST: &str = "Invalid list";
pub const INVALID_FEATURE: &str = "Invalid feature";
pub const INVALID_USER_STORY: &str = "Invalid user story";
pub const INVALID_TASK: &str = "Invalid task";

/// Resolves a project owned by the caller
#[async_trait]
pub trait ProjectLookup: Send + Sync {
    /// Loads the project's full board
    ///
    /// Fails with `BadRequest("Project not found")` when the project doesn't
    /// exist or belongs to someone else.
    async fn owned_tree(&self, user_id: Uuid, project_id: Uuid) -> ApiResult<ProjectTree>;
}

/// All services, built once at startup and shared through `AppState`
pub struct Services {
    pub auth: AuthService,
    pub users: UserService,
    pub projects: Arc<ProjectService>,
    pub lists: ListService,
    pub features: FeatureService,
    pub user_stories: UserStoryService,
    pub tasks: TaskService,
}

impl Services {
    pub fn new(store: Arc<dyn PlannerStore>, mailer: Arc<dyn Mailer>, config: &Config) -> Self {
        let users = UserService::new(store.clone(), config.password.cost());
        let projects = Arc::new(ProjectService::new(store.clone()));
        let lookup: Arc<dyn ProjectLookup> = projects.clone();

        Self {
            auth: AuthService::new(users.clone(), mailer, config),
            users,
            lists: ListService::new(store.clone(), lookup.clone()),
            features: FeatureService::new(store.clone(), lookup.clone()),
            user_stories: UserStoryService::new(store.clone(), lookup.clone()),
            tasks: TaskService::new(store, lookup),
            projects,
        }
    }
}

/// Hashes off the async runtime; Argon2id is deliberately slow
pub(crate) async fn hash(password: String, cost: HashCost) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password_with(&password, cost))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Verifies off the async runtime
pub(crate) async fn verify(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Moves `items[source]` into gap `gap` and persists the renumbered range
pub(crate) async fn reorder_siblings<T: Positioned>(
    store: &dyn PlannerStore,
    level: SiblingLevel,
    items: &mut Vec<T>,
    source: usize,
    gap: usize,
) -> ApiResult<()> {
    let updates = ordering::reorder(items, source, gap)?;
    if updates.is_empty() {
        debug!(table = level.table(), source, gap, "Drop onto own position ignored");
        return Ok(());
    }

    store.reposition(level, &updates).await?;
    Ok(())
}

/// Removes the sibling with `id`, deletes it and compacts the rest
pub(crate) async fn remove_sibling<T: Positioned>(
    store: &dyn PlannerStore,
    level: SiblingLevel,
    items: &mut Vec<T>,
    id: Uuid,
    invalid: &'static str,
) -> ApiResult<()> {
    let index = items
        .iter()
        .position(|item| item.id() == id)
        .ok_or_else(|| ApiError::bad_request(invalid))?;

    items.remove(index);
    let compaction = ordering::compact(items);
    store.delete_node(level, id, &compaction).await?;
    Ok(())
}

/// Position a new child gets: the end of its parent's collection
pub(crate) fn next_position<T>(siblings: &[T]) -> i32 {
    siblings.len() as i32
}

/// Applies an optional replacement to a field
pub(crate) fn patch<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}
