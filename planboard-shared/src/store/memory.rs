//! In-memory implementation of [`PlannerStore`]
//!
//! Keeps every table in a `HashMap` behind one `tokio::sync::RwLock`. Used
//! by the API's integration tests and for running the server without a
//! database. Mirrors the Postgres behaviour the services rely on:
//! case-insensitive uniqueness of usernames and emails, cascading deletes,
//! and all-or-nothing position writes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PlannerStore, StoreError, StoreResult, EMAIL_TAKEN, USERNAME_TAKEN};
use crate::models::{
    Feature, List, NewFeature, NewList, NewProject, NewTask, NewUser, NewUserStory, Project,
    ProjectTree, Task, User, UserStory,
};
use crate::ordering::{PositionUpdate, SiblingLevel};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    lists: HashMap<Uuid, List>,
    features: HashMap<Uuid, Feature>,
    user_stories: HashMap<Uuid, UserStory>,
    tasks: HashMap<Uuid, Task>,
}

impl Tables {
    /// Rejects `username`/`email` held by any user other than `except`
    fn check_unique(&self, username: &str, email: &str, except: Option<Uuid>) -> StoreResult<()> {
        let others = self.users.values().filter(|u| Some(u.id) != except);

        for user in others {
            if user.username.to_lowercase() == username.to_lowercase() {
                return Err(StoreError::Conflict(USERNAME_TAKEN.to_string()));
            }
            if user.email.to_lowercase() == email.to_lowercase() {
                return Err(StoreError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }
        Ok(())
    }

    fn position_mut(&mut self, level: SiblingLevel, id: Uuid) -> Option<&mut i32> {
        match level {
            SiblingLevel::List => self.lists.get_mut(&id).map(|l| &mut l.position),
            SiblingLevel::Feature => self.features.get_mut(&id).map(|f| &mut f.position),
            SiblingLevel::UserStory => self.user_stories.get_mut(&id).map(|s| &mut s.position),
            SiblingLevel::Task => self.tasks.get_mut(&id).map(|t| &mut t.position),
        }
    }

    fn contains(&self, level: SiblingLevel, id: Uuid) -> bool {
        match level {
            SiblingLevel::List => self.lists.contains_key(&id),
            SiblingLevel::Feature => self.features.contains_key(&id),
            SiblingLevel::UserStory => self.user_stories.contains_key(&id),
            SiblingLevel::Task => self.tasks.contains_key(&id),
        }
    }

    fn apply_positions(&mut self, level: SiblingLevel, updates: &[PositionUpdate]) -> StoreResult<()> {
        if let Some(missing) = updates.iter().find(|u| !self.contains(level, u.id)) {
            tracing::debug!(id = %missing.id, table = level.table(), "Position write for unknown row");
            return Err(StoreError::NotFound(level.entity()));
        }

        let now = Utc::now();
        for update in updates {
            if let Some(position) = self.position_mut(level, update.id) {
                *position = update.position;
            }
            self.touch(level, update.id, now);
        }
        Ok(())
    }

    fn touch(&mut self, level: SiblingLevel, id: Uuid, now: chrono::DateTime<Utc>) {
        match level {
            SiblingLevel::List => self.lists.get_mut(&id).map(|l| l.updated_at = now),
            SiblingLevel::Feature => self.features.get_mut(&id).map(|f| f.updated_at = now),
            SiblingLevel::UserStory => self.user_stories.get_mut(&id).map(|s| s.updated_at = now),
            SiblingLevel::Task => self.tasks.get_mut(&id).map(|t| t.updated_at = now),
        };
    }

    /// Removes a row and everything below it
    fn remove_cascade(&mut self, level: SiblingLevel, id: Uuid) {
        match level {
            SiblingLevel::Task => {
                self.tasks.remove(&id);
            }
            SiblingLevel::UserStory => {
                self.user_stories.remove(&id);
                self.tasks.retain(|_, t| t.user_story_id != id);
            }
            SiblingLevel::Feature => {
                self.features.remove(&id);
                let stories: Vec<Uuid> = self
                    .user_stories
                    .values()
                    .filter(|s| s.feature_id == id)
                    .map(|s| s.id)
                    .collect();
                for story in stories {
                    self.remove_cascade(SiblingLevel::UserStory, story);
                }
            }
            SiblingLevel::List => {
                self.lists.remove(&id);
                let features: Vec<Uuid> = self
                    .features
                    .values()
                    .filter(|f| f.list_id == id)
                    .map(|f| f.id)
                    .collect();
                for feature in features {
                    self.remove_cascade(SiblingLevel::Feature, feature);
                }
            }
        }
    }
}

/// Ephemeral store for tests and database-less runs
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlannerStore for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, data: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        tables.check_unique(&data.username, &data.email, None)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: data.first_name,
            last_name: data.last_name,
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            project_count: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let username = username.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username.to_lowercase() == username)
            .cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn save_user(&self, user: &User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let project_count = match tables.users.get(&user.id) {
            Some(existing) => existing.project_count,
            None => return Err(StoreError::NotFound("User")),
        };
        tables.check_unique(&user.username, &user.email, Some(user.id))?;

        let mut stored = user.clone();
        stored.project_count = project_count;
        stored.updated_at = Utc::now();
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn adjust_project_count(&self, user_id: Uuid, delta: i32) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound("User"))?;

        user.project_count = user.project_count.saturating_add(delta).max(0);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn insert_project(&self, data: NewProject) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            title: data.title,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| (p.created_at, p.id));
        Ok(projects)
    }

    async fn project_tree(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> StoreResult<Option<ProjectTree>> {
        let tables = self.tables.read().await;

        let Some(project) = tables
            .projects
            .get(&project_id)
            .filter(|p| p.user_id == user_id)
            .cloned()
        else {
            return Ok(None);
        };

        let lists: Vec<List> = tables
            .lists
            .values()
            .filter(|l| l.project_id == project_id)
            .cloned()
            .collect();
        let features: Vec<Feature> = tables
            .features
            .values()
            .filter(|f| lists.iter().any(|l| l.id == f.list_id))
            .cloned()
            .collect();
        let user_stories: Vec<UserStory> = tables
            .user_stories
            .values()
            .filter(|s| features.iter().any(|f| f.id == s.feature_id))
            .cloned()
            .collect();
        let tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| user_stories.iter().any(|s| s.id == t.user_story_id))
            .cloned()
            .collect();

        Ok(Some(ProjectTree::assemble(
            project,
            lists,
            features,
            user_stories,
            tasks,
        )))
    }

    async fn save_project(&self, project: &Project) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .projects
            .get_mut(&project.id)
            .ok_or(StoreError::NotFound("Project"))?;

        stored.title = project.title.clone();
        stored.description = project.description.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_project(&self, project_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.projects.remove(&project_id).is_none() {
            return Err(StoreError::NotFound("Project"));
        }

        let lists: Vec<Uuid> = tables
            .lists
            .values()
            .filter(|l| l.project_id == project_id)
            .map(|l| l.id)
            .collect();
        for list in lists {
            tables.remove_cascade(SiblingLevel::List, list);
        }
        Ok(())
    }

    async fn insert_list(&self, data: NewList) -> StoreResult<List> {
        let now = Utc::now();
        let list = List {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            title: data.title,
            description: data.description,
            position: data.position,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn save_list(&self, list: &List) -> StoreResult<List> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .lists
            .get_mut(&list.id)
            .ok_or(StoreError::NotFound("List"))?;

        stored.title = list.title.clone();
        stored.description = list.description.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn insert_feature(&self, data: NewFeature) -> StoreResult<Feature> {
        let now = Utc::now();
        let feature = Feature {
            id: Uuid::new_v4(),
            list_id: data.list_id,
            title: data.title,
            description: data.description,
            position: data.position,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .features
            .insert(feature.id, feature.clone());
        Ok(feature)
    }

    async fn save_feature(&self, feature: &Feature) -> StoreResult<Feature> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .features
            .get_mut(&feature.id)
            .ok_or(StoreError::NotFound("Feature"))?;

        stored.title = feature.title.clone();
        stored.description = feature.description.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn insert_user_story(&self, data: NewUserStory) -> StoreResult<UserStory> {
        let now = Utc::now();
        let story = UserStory {
            id: Uuid::new_v4(),
            feature_id: data.feature_id,
            title: data.title,
            description: data.description,
            position: data.position,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .user_stories
            .insert(story.id, story.clone());
        Ok(story)
    }

    async fn save_user_story(&self, story: &UserStory) -> StoreResult<UserStory> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .user_stories
            .get_mut(&story.id)
            .ok_or(StoreError::NotFound("User story"))?;

        stored.title = story.title.clone();
        stored.description = story.description.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn insert_task(&self, data: NewTask) -> StoreResult<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_story_id: data.user_story_id,
            content: data.content,
            completed: data.completed,
            position: data.position,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .tasks
            .get_mut(&task.id)
            .ok_or(StoreError::NotFound("Task"))?;

        stored.content = task.content.clone();
        stored.completed = task.completed;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn reposition(&self, level: SiblingLevel, updates: &[PositionUpdate]) -> StoreResult<()> {
        self.tables.write().await.apply_positions(level, updates)
    }

    async fn delete_node(
        &self,
        level: SiblingLevel,
        id: Uuid,
        compaction: &[PositionUpdate],
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.contains(level, id) {
            return Err(StoreError::NotFound(level.entity()));
        }
        if compaction.iter().any(|u| u.id == id || !tables.contains(level, u.id)) {
            return Err(StoreError::NotFound(level.entity()));
        }

        tables.remove_cascade(level, id);
        tables.apply_positions(level, compaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            first_name: "Dan".to_string(),
            last_name: "Neri".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    async fn board(store: &InMemoryStore) -> (User, Project, Vec<List>) {
        let user = store
            .insert_user(new_user("dneri", "dan@example.com"))
            .await
            .unwrap();
        let project = store
            .insert_project(NewProject {
                user_id: user.id,
                title: "Trip Plan".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let mut lists = Vec::new();
        for (position, title) in ["To Do", "Doing", "Done"].iter().enumerate() {
            lists.push(
                store
                    .insert_list(NewList {
                        project_id: project.id,
                        title: title.to_string(),
                        description: None,
                        position: position as i32,
                    })
                    .await
                    .unwrap(),
            );
        }
        (user, project, lists)
    }

    #[tokio::test]
    async fn test_user_uniqueness_is_case_insensitive() {
        let store = InMemoryStore::new();
        store
            .insert_user(new_user("dneri", "dan@example.com"))
            .await
            .unwrap();

        let err = store
            .insert_user(new_user("DNeri", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref m) if m == USERNAME_TAKEN));

        let err = store
            .insert_user(new_user("someone", "DAN@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref m) if m == EMAIL_TAKEN));

        assert!(store.user_by_username("DNERI").await.unwrap().is_some());
        assert!(store.user_by_email("Dan@Example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_user_allows_own_values() {
        let store = InMemoryStore::new();
        let mut user = store
            .insert_user(new_user("dneri", "dan@example.com"))
            .await
            .unwrap();

        user.first_name = "Daniel".to_string();
        let saved = store.save_user(&user).await.unwrap();
        assert_eq!(saved.first_name, "Daniel");
    }

    #[tokio::test]
    async fn test_project_count_and_password_are_written_separately() {
        let store = InMemoryStore::new();
        let stale = store
            .insert_user(new_user("dneri", "dan@example.com"))
            .await
            .unwrap();

        let mut reset = stale.clone();
        reset.password_hash = "new-hash".to_string();
        store.save_user(&reset).await.unwrap();

        let adjusted = store.adjust_project_count(stale.id, 1).await.unwrap();
        assert_eq!(adjusted.project_count, 1);
        assert_eq!(adjusted.password_hash, "new-hash");

        // a stale copy still carries project_count 0
        let saved = store.save_user(&stale).await.unwrap();
        assert_eq!(saved.project_count, 1);

        store.adjust_project_count(stale.id, -1).await.unwrap();
        let floor = store.adjust_project_count(stale.id, -1).await.unwrap();
        assert_eq!(floor.project_count, 0);

        assert!(matches!(
            store.adjust_project_count(Uuid::new_v4(), 1).await,
            Err(StoreError::NotFound("User"))
        ));
    }

    #[tokio::test]
    async fn test_project_tree_is_scoped_to_owner() {
        let store = InMemoryStore::new();
        let (user, project, _) = board(&store).await;

        let tree = store.project_tree(user.id, project.id).await.unwrap().unwrap();
        let titles: Vec<_> = tree.lists.iter().map(|l| l.list.title.as_str()).collect();
        assert_eq!(titles, ["To Do", "Doing", "Done"]);

        assert!(store
            .project_tree(Uuid::new_v4(), project.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_reposition_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let (user, project, lists) = board(&store).await;

        let updates = [
            PositionUpdate { id: lists[0].id, position: 2 },
            PositionUpdate { id: Uuid::new_v4(), position: 0 },
        ];
        let err = store.reposition(SiblingLevel::List, &updates).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound("List")));

        let tree = store.project_tree(user.id, project.id).await.unwrap().unwrap();
        assert_eq!(tree.lists[0].list.id, lists[0].id);
        assert_eq!(tree.lists[0].list.position, 0);
    }

    #[tokio::test]
    async fn test_delete_project_cascades() {
        let store = InMemoryStore::new();
        let (user, project, lists) = board(&store).await;
        let feature = store
            .insert_feature(NewFeature {
                list_id: lists[0].id,
                title: "Flights".to_string(),
                description: None,
                position: 0,
            })
            .await
            .unwrap();

        store.delete_project(project.id).await.unwrap();

        assert!(store.projects_for_user(user.id).await.unwrap().is_empty());
        let tables = store.tables.read().await;
        assert!(tables.lists.is_empty());
        assert!(!tables.features.contains_key(&feature.id));
    }

    #[tokio::test]
    async fn test_delete_node_compacts() {
        let store = InMemoryStore::new();
        let (user, project, lists) = board(&store).await;

        let compaction = [PositionUpdate { id: lists[2].id, position: 1 }];
        store
            .delete_node(SiblingLevel::List, lists[1].id, &compaction)
            .await
            .unwrap();

        let tree = store.project_tree(user.id, project.id).await.unwrap().unwrap();
        let remaining: Vec<_> = tree
            .lists
            .iter()
            .map(|l| (l.list.title.as_str(), l.list.position))
            .collect();
        assert_eq!(remaining, [("To Do", 0), ("Done", 1)]);
    }
}
