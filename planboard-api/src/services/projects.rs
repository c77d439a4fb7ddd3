/// Projects and their boards
///
/// Every project starts with a "To Do" list. The owner's `projectCount`
/// follows creates and deletes.

use std::sync::Arc;

use async_trait::async_trait;
use planboard_shared::{
    models::{ListNode, NewList, NewProject, Project, ProjectTree},
    store::PlannerStore,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{patch, users::USER_NOT_FOUND, ProjectLookup};
use crate::{
    error::{ApiError, ApiResult},
    sanitize::{clean, clean_opt, Sanitize},
};

pub const PROJECT_NOT_FOUND: &str = "Project not found";
pub const DEFAULT_LIST_TITLE: &str = "To Do";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,
}

impl Sanitize for CreateProjectRequest {
    fn sanitize(&mut self) {
        clean(&mut self.title);
        clean_opt(&mut self.description);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    pub id: Uuid,

    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,
}

impl Sanitize for UpdateProjectRequest {
    fn sanitize(&mut self) {
        clean_opt(&mut self.title);
        clean_opt(&mut self.description);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeleteProjectRequest {
    pub id: Uuid,
}

impl Sanitize for DeleteProjectRequest {
    fn sanitize(&mut self) {}
}

pub struct ProjectService {
    store: Arc<dyn PlannerStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn PlannerStore>) -> Self {
        Self { store }
    }

    /// The caller's projects, without their boards
    pub async fn list(&self, user_id: Uuid) -> ApiResult<Vec<Project>> {
        Ok(self.store.projects_for_user(user_id).await?)
    }

    pub async fn get(&self, user_id: Uuid, project_id: Uuid) -> ApiResult<ProjectTree> {
        self.owned_tree(user_id, project_id).await
    }

    /// Creates a project with its default list
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateProjectRequest,
    ) -> ApiResult<ProjectTree> {
        self.store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::bad_request(USER_NOT_FOUND))?;

        let project = self
            .store
            .insert_project(NewProject {
                user_id,
                title: request.title,
                description: request.description,
            })
            .await?;

        let list = self
            .store
            .insert_list(NewList {
                project_id: project.id,
                title: DEFAULT_LIST_TITLE.to_string(),
                description: None,
                position: 0,
            })
            .await?;

        self.store.adjust_project_count(user_id, 1).await?;

        info!(user_id = %user_id, project_id = %project.id, "Project created");
        Ok(ProjectTree {
            project,
            lists: vec![ListNode::new(list)],
        })
    }

    pub async fn update(&self, user_id: Uuid, request: UpdateProjectRequest) -> ApiResult<Project> {
        let ProjectTree { mut project, .. } = self.owned_tree(user_id, request.id).await?;

        patch(&mut project.title, request.title);
        if request.description.is_some() {
            project.description = request.description;
        }

        let project = self.store.save_project(&project).await?;
        info!(project_id = %project.id, "Project updated");
        Ok(project)
    }

    /// Deletes a project with its board and returns the remaining projects
    pub async fn delete(
        &self,
        user_id: Uuid,
        request: DeleteProjectRequest,
    ) -> ApiResult<Vec<Project>> {
        let tree = self.owned_tree(user_id, request.id).await?;
        self.store.delete_project(tree.project.id).await?;

        self.store.adjust_project_count(user_id, -1).await?;

        info!(user_id = %user_id, project_id = %request.id, "Project deleted");
        self.list(user_id).await
    }
}

#[async_trait]
impl ProjectLookup for ProjectService {
    async fn owned_tree(&self, user_id: Uuid, project_id: Uuid) -> ApiResult<ProjectTree> {
        debug!(user_id = %user_id, project_id = %project_id, "Loading project tree");
        self.store
            .project_tree(user_id, project_id)
            .await?
            .ok_or_else(|| ApiError::bad_request(PROJECT_NOT_FOUND))
    }
}
