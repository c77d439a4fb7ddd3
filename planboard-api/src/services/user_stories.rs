/// User stories inside a feature

use std::sync::Arc;

use planboard_shared::{
    models::{FeatureNode, NewUserStory, ProjectTree, UserStory, UserStoryNode},
    ordering::SiblingLevel,
    store::PlannerStore,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{
    next_position, patch, remove_sibling, reorder_siblings, ProjectLookup, INVALID_FEATURE,
    INVALID_LIST, INVALID_USER_STORY,
};
use crate::{
    error::{ApiError, ApiResult},
    sanitize::{clean, clean_opt, Sanitize},
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserStoryRequest {
    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,

    #[serde(rename = "featureID")]
    pub feature_id: Uuid,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,
}

impl Sanitize for CreateUserStoryRequest {
    fn sanitize(&mut self) {
        clean(&mut self.title);
        clean_opt(&mut self.description);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserStoryRequest {
    pub id: Uuid,

    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,

    #[serde(rename = "featureID")]
    pub feature_id: Uuid,

    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,
}

impl Sanitize for UpdateUserStoryRequest {
    fn sanitize(&mut self) {
        clean_opt(&mut self.title);
        clean_opt(&mut self.description);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderUserStoriesRequest {
    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,

    #[serde(rename = "featureID")]
    pub feature_id: Uuid,

    pub source_index: usize,

    pub destination_index: usize,
}

impl Sanitize for ReorderUserStoriesRequest {
    fn sanitize(&mut self) {}
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeleteUserStoryRequest {
    pub id: Uuid,

    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,

    #[serde(rename = "featureID")]
    pub feature_id: Uuid,
}

impl Sanitize for DeleteUserStoryRequest {
    fn sanitize(&mut self) {}
}

fn feature_in(
    tree: &mut ProjectTree,
    list_id: Uuid,
    feature_id: Uuid,
) -> ApiResult<&mut FeatureNode> {
    tree.list_mut(list_id)
        .ok_or_else(|| ApiError::bad_request(INVALID_LIST))?
        .feature_mut(feature_id)
        .ok_or_else(|| ApiError::bad_request(INVALID_FEATURE))
}

pub struct UserStoryService {
    store: Arc<dyn PlannerStore>,
    projects: Arc<dyn ProjectLookup>,
}

impl UserStoryService {
    pub fn new(store: Arc<dyn PlannerStore>, projects: Arc<dyn ProjectLookup>) -> Self {
        Self { store, projects }
    }

    /// Appends a user story to the feature and returns the feature's stories
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateUserStoryRequest,
    ) -> ApiResult<Vec<UserStoryNode>> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;
        let feature = feature_in(&mut tree, request.list_id, request.feature_id)?;

        let story = self
            .store
            .insert_user_story(NewUserStory {
                feature_id: feature.feature.id,
                title: request.title,
                description: request.description,
                position: next_position(&feature.user_stories),
            })
            .await?;

        info!(feature_id = %feature.feature.id, user_story_id = %story.id, "User story created");
        feature.user_stories.push(UserStoryNode::new(story));
        Ok(std::mem::take(&mut feature.user_stories))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        request: UpdateUserStoryRequest,
    ) -> ApiResult<UserStory> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;
        let node = feature_in(&mut tree, request.list_id, request.feature_id)?
            .user_story_mut(request.id)
            .ok_or_else(|| ApiError::bad_request(INVALID_USER_STORY))?;

        let mut story = node.user_story.clone();
        patch(&mut story.title, request.title);
        if request.description.is_some() {
            story.description = request.description;
        }

        Ok(self.store.save_user_story(&story).await?)
    }

    pub async fn reorder(
        &self,
        user_id: Uuid,
        request: ReorderUserStoriesRequest,
    ) -> ApiResult<Vec<UserStoryNode>> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;
        let feature = feature_in(&mut tree, request.list_id, request.feature_id)?;

        reorder_siblings(
            self.store.as_ref(),
            SiblingLevel::UserStory,
            &mut feature.user_stories,
            request.source_index,
            request.destination_index,
        )
        .await?;

        Ok(std::mem::take(&mut feature.user_stories))
    }

    pub async fn delete(
        &self,
        user_id: Uuid,
        request: DeleteUserStoryRequest,
    ) -> ApiResult<Vec<UserStoryNode>> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;
        let feature = feature_in(&mut tree, request.list_id, request.feature_id)?;

        remove_sibling(
            self.store.as_ref(),
            SiblingLevel::UserStory,
            &mut feature.user_stories,
            request.id,
            INVALID_USER_STORY,
        )
        .await?;

        info!(feature_id = %feature.feature.id, user_story_id = %request.id, "User story deleted");
        Ok(std::mem::take(&mut feature.user_stories))
    }
}
