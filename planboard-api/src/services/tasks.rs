/// Tasks inside a user story
///
/// A task is a checklist line: `content` plus a `completed` flag. Both are
/// optional on create, defaulting to an empty, open task.

use std::sync::Arc;

use planboard_shared::{
    models::{NewTask, ProjectTree, Task, UserStoryNode},
    ordering::SiblingLevel,
    store::PlannerStore,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{
    next_position, patch, remove_sibling, reorder_siblings, ProjectLookup, INVALID_FEATURE,
    INVALID_LIST, INVALID_TASK, INVALID_USER_STORY,
};
use crate::{
    error::{ApiError, ApiResult},
    sanitize::{clean_opt, Sanitize},
};

/// Parent chain of a task
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StoryPath {
    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,

    #[serde(rename = "featureID")]
    pub feature_id: Uuid,

    #[serde(rename = "userStoryID")]
    pub user_story_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[serde(flatten)]
    pub path: StoryPath,

    pub content: Option<String>,

    pub completed: Option<bool>,
}

impl Sanitize for CreateTaskRequest {
    fn sanitize(&mut self) {
        clean_opt(&mut self.content);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub id: Uuid,

    #[serde(flatten)]
    pub path: StoryPath,

    pub content: Option<String>,

    pub completed: Option<bool>,
}

impl Sanitize for UpdateTaskRequest {
    fn sanitize(&mut self) {
        clean_opt(&mut self.content);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTasksRequest {
    #[serde(flatten)]
    pub path: StoryPath,

    pub source_index: usize,

    pub destination_index: usize,
}

impl Sanitize for ReorderTasksRequest {
    fn sanitize(&mut self) {}
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeleteTaskRequest {
    pub id: Uuid,

    #[serde(flatten)]
    pub path: StoryPath,
}

impl Sanitize for DeleteTaskRequest {
    fn sanitize(&mut self) {}
}

fn story_in(tree: &mut ProjectTree, path: StoryPath) -> ApiResult<&mut UserStoryNode> {
    tree.list_mut(path.list_id)
        .ok_or_else(|| ApiError::bad_request(INVALID_LIST))?
        .feature_mut(path.feature_id)
        .ok_or_else(|| ApiError::bad_request(INVALID_FEATURE))?
        .user_story_mut(path.user_story_id)
        .ok_or_else(|| ApiError::bad_request(INVALID_USER_STORY))
}

pub struct TaskService {
    store: Arc<dyn PlannerStore>,
    projects: Arc<dyn ProjectLookup>,
}

impl TaskService {
    pub fn new(store: Arc<dyn PlannerStore>, projects: Arc<dyn ProjectLookup>) -> Self {
        Self { store, projects }
    }

    async fn tree(&self, user_id: Uuid, path: StoryPath) -> ApiResult<ProjectTree> {
        self.projects.owned_tree(user_id, path.project_id).await
    }

    /// Appends a task to the user story and returns the story's tasks
    pub async fn create(&self, user_id: Uuid, request: CreateTaskRequest) -> ApiResult<Vec<Task>> {
        let mut tree = self.tree(user_id, request.path).await?;
        let story = story_in(&mut tree, request.path)?;

        let task = self
            .store
            .insert_task(NewTask {
                user_story_id: story.user_story.id,
                content: request.content.unwrap_or_default(),
                completed: request.completed.unwrap_or(false),
                position: next_position(&story.tasks),
            })
            .await?;

        info!(user_story_id = %story.user_story.id, task_id = %task.id, "Task created");
        story.tasks.push(task);
        Ok(std::mem::take(&mut story.tasks))
    }

    pub async fn update(&self, user_id: Uuid, request: UpdateTaskRequest) -> ApiResult<Task> {
        let mut tree = self.tree(user_id, request.path).await?;
        let mut task = story_in(&mut tree, request.path)?
            .task_mut(request.id)
            .ok_or_else(|| ApiError::bad_request(INVALID_TASK))?
            .clone();

        patch(&mut task.content, request.content);
        patch(&mut task.completed, request.completed);

        Ok(self.store.save_task(&task).await?)
    }

    pub async fn reorder(
        &self,
        user_id: Uuid,
        request: ReorderTasksRequest,
    ) -> ApiResult<Vec<Task>> {
        let mut tree = self.tree(user_id, request.path).await?;
        let story = story_in(&mut tree, request.path)?;

        reorder_siblings(
            self.store.as_ref(),
            SiblingLevel::Task,
            &mut story.tasks,
            request.source_index,
            request.destination_index,
        )
        .await?;

        Ok(std::mem::take(&mut story.tasks))
    }

    pub async fn delete(&self, user_id: Uuid, request: DeleteTaskRequest) -> ApiResult<Vec<Task>> {
        let mut tree = self.tree(user_id, request.path).await?;
        let story = story_in(&mut tree, request.path)?;

        remove_sibling(
            self.store.as_ref(),
            SiblingLevel::Task,
            &mut story.tasks,
            request.id,
            INVALID_TASK,
        )
        .await?;

        info!(user_story_id = %story.user_story.id, task_id = %request.id, "Task deleted");
        Ok(std::mem::take(&mut story.tasks))
    }
}
