/// Features inside a list

use std::sync::Arc;

use planboard_shared::{
    models::{Feature, FeatureNode, ListNode, NewFeature, ProjectTree},
    ordering::SiblingLevel,
    store::PlannerStore,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{
    next_position, patch, remove_sibling, reorder_siblings, ProjectLookup, INVALID_FEATURE,
    INVALID_LIST,
};
use crate::{
    error::{ApiError, ApiResult},
    sanitize::{clean, clean_opt, Sanitize},
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeatureRequest {
    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,
}

impl Sanitize for CreateFeatureRequest {
    fn sanitize(&mut self) {
        clean(&mut self.title);
        clean_opt(&mut self.description);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFeatureRequest {
    pub id: Uuid,

    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,

    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,
}

impl Sanitize for UpdateFeatureRequest {
    fn sanitize(&mut self) {
        clean_opt(&mut self.title);
        clean_opt(&mut self.description);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReorderFeaturesRequest {
    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,

    pub source_index: usize,

    pub destination_index: usize,
}

impl Sanitize for ReorderFeaturesRequest {
    fn sanitize(&mut self) {}
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeleteFeatureRequest {
    pub id: Uuid,

    #[serde(rename = "projectID")]
    pub project_id: Uuid,

    #[serde(rename = "listID")]
    pub list_id: Uuid,
}

impl Sanitize for DeleteFeatureRequest {
    fn sanitize(&mut self) {}
}

fn list_in(tree: &mut ProjectTree, list_id: Uuid) -> ApiResult<&mut ListNode> {
    tree.list_mut(list_id)
        .ok_or_else(|| ApiError::bad_request(INVALID_LIST))
}

pub struct FeatureService {
    store: Arc<dyn PlannerStore>,
    projects: Arc<dyn ProjectLookup>,
}

impl FeatureService {
    pub fn new(store: Arc<dyn PlannerStore>, projects: Arc<dyn ProjectLookup>) -> Self {
        Self { store, projects }
    }

    /// Appends a feature to the list and returns the list's features
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateFeatureRequest,
    ) -> ApiResult<Vec<FeatureNode>> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;
        let list = list_in(&mut tree, request.list_id)?;

        let feature = self
            .store
            .insert_feature(NewFeature {
                list_id: list.list.id,
                title: request.title,
                description: request.description,
                position: next_position(&list.features),
            })
            .await?;

        info!(list_id = %list.list.id, feature_id = %feature.id, "Feature created");
        list.features.push(FeatureNode::new(feature));
        Ok(std::mem::take(&mut list.features))
    }

    pub async fn update(&self, user_id: Uuid, request: UpdateFeatureRequest) -> ApiResult<Feature> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;
        let node = list_in(&mut tree, request.list_id)?
            .feature_mut(request.id)
            .ok_or_else(|| ApiError::bad_request(INVALID_FEATURE))?;

        let mut feature = node.feature.clone();
        patch(&mut feature.title, request.title);
        if request.description.is_some() {
            feature.description = request.description;
        }

        Ok(self.store.save_feature(&feature).await?)
    }

    pub async fn reorder(
        &self,
        user_id: Uuid,
        request: ReorderFeaturesRequest,
    ) -> ApiResult<Vec<FeatureNode>> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;
        let list = list_in(&mut tree, request.list_id)?;

        reorder_siblings(
            self.store.as_ref(),
            SiblingLevel::Feature,
            &mut list.features,
            request.source_index,
            request.destination_index,
        )
        .await?;

        Ok(std::mem::take(&mut list.features))
    }

    pub async fn delete(
        &self,
        user_id: Uuid,
        request: DeleteFeatureRequest,
    ) -> ApiResult<Vec<FeatureNode>> {
        let mut tree = self.projects.owned_tree(user_id, request.project_id).await?;
        let list = list_in(&mut tree, request.list_id)?;

        remove_sibling(
            self.store.as_ref(),
            SiblingLevel::Feature,
            &mut list.features,
            request.id,
            INVALID_FEATURE,
        )
        .await?;

        info!(list_id = %list.list.id, feature_id = %request.id, "Feature deleted");
        Ok(std::mem::take(&mut list.features))
    }
}
