/// Lists on a project board

use std::sync::Arc;

use planboard_shared::{
    models::{List, ListNode, NewList},
    ordering::SiblingLevel,
    store::PlannerStore,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{next_position, patch, remove_sibling, reorder_siblings, ProjectLookup, INVALID_LIST};
use crate::{
    error::{ApiError, ApiResult},
    sanitize::{clean, clean_opt, Sanitize},
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListRequest {
    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,
}

impl Sanitize for CreateListRequest {
    fn sanitize(&mut self) {
        clean(&mut self.title);
        clean_opt(&mut self.description);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateListRequest {
    pub id: Uuid,

    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,
}

impl Sanitize for UpdateListRequest {
    fn sanitize(&mut self) {
        clean_opt(&mut self.title);
        clean_opt(&mut self.description);
    }
}

/// Drag-and-drop of a list within its project
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderListsRequest {
    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    pub source_index: usize,

    /// Gap the list was dropped into, `0..=len`
    pub destination_index: usize,
}

impl Sanitize for ReorderListsRequest {
    fn sanitize(&mut self) {}
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeleteListRequest {
    pub id: Uuid,

    #[serde(rename = "projectID")]
    pub project_id: Uuid,
}

impl Sanitize for DeleteListRequest {
    fn sanitize(&mut self) {}
}

pub struct ListService {
    store: Arc<dyn PlannerStore>,
    projects: Arc<dyn ProjectLookup>,
}

impl ListService {
    pub fn new(store: Arc<dyn PlannerStore>, projects: Arc<dyn ProjectLookup>) -> Self {
        Self { store, projects }
    }

    /// Appends a list to the project and returns all of its lists
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateListRequest,
    ) -> ApiResult<Vec<ListNode>> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;

        let list = self
            .store
            .insert_list(NewList {
                project_id: tree.project.id,
                title: request.title,
                description: request.description,
                position: next_position(&tree.lists),
            })
            .await?;

        info!(project_id = %tree.project.id, list_id = %list.id, "List created");
        tree.lists.push(ListNode::new(list));
        Ok(tree.lists)
    }

    pub async fn update(&self, user_id: Uuid, request: UpdateListRequest) -> ApiResult<List> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;
        let node = tree
            .list_mut(request.id)
            .ok_or_else(|| ApiError::bad_request(INVALID_LIST))?;

        let mut list = node.list.clone();
        patch(&mut list.title, request.title);
        if request.description.is_some() {
            list.description = request.description;
        }

        Ok(self.store.save_list(&list).await?)
    }

    pub async fn reorder(
        &self,
        user_id: Uuid,
        request: ReorderListsRequest,
    ) -> ApiResult<Vec<ListNode>> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;

        reorder_siblings(
            self.store.as_ref(),
            SiblingLevel::List,
            &mut tree.lists,
            request.source_index,
            request.destination_index,
        )
        .await?;

        Ok(tree.lists)
    }

    /// Deletes a list with everything in it and returns the remaining lists
    pub async fn delete(
        &self,
        user_id: Uuid,
        request: DeleteListRequest,
    ) -> ApiResult<Vec<ListNode>> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;

        remove_sibling(
            self.store.as_ref(),
            SiblingLevel::List,
            &mut tree.lists,
            request.id,
            INVALID_LIST,
        )
        .await?;

        info!(project_id = %tree.project.id, list_id = %request.id, "List deleted");
        Ok(tree.lists)
    }
}
