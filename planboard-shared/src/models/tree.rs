/// Fully loaded project board
///
/// A [`ProjectTree`] is a project with its lists, each list's features, each
/// feature's user stories and each story's tasks, every collection sorted by
/// `position`. It serializes to the nested shape the board UI renders:
///
/// ```json
/// { "id": "...", "userID": "...", "title": "Trip Plan",
///   "lists": [ { "id": "...", "projectID": "...", "position": 0,
///                "features": [ { "userStories": [ { "tasks": [] } ] } ] } ] }
/// ```
///
/// The services locate a child by walking down this tree, so the lookup
/// helpers here return `Option` and leave the choice of error to the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{feature::Feature, list::List, project::Project, task::Task, user_story::UserStory};

/// Project with its full board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTree {
    #[serde(flatten)]
    pub project: Project,

    pub lists: Vec<ListNode>,
}

/// List with its features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListNode {
    #[serde(flatten)]
    pub list: List,

    pub features: Vec<FeatureNode>,
}

/// Feature with its user stories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureNode {
    #[serde(flatten)]
    pub feature: Feature,

    #[serde(rename = "userStories")]
    pub user_stories: Vec<UserStoryNode>,
}

/// User story with its tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStoryNode {
    #[serde(flatten)]
    pub user_story: UserStory,

    pub tasks: Vec<Task>,
}

impl ListNode {
    pub fn new(list: List) -> Self {
        Self {
            list,
            features: Vec::new(),
        }
    }

    pub fn feature_mut(&mut self, id: Uuid) -> Option<&mut FeatureNode> {
        self.features.iter_mut().find(|f| f.feature.id == id)
    }
}

impl FeatureNode {
    pub fn new(feature: Feature) -> Self {
        Self {
            feature,
            user_stories: Vec::new(),
        }
    }

    pub fn user_story_mut(&mut self, id: Uuid) -> Option<&mut UserStoryNode> {
        self.user_stories.iter_mut().find(|s| s.user_story.id == id)
    }
}

impl UserStoryNode {
    pub fn new(user_story: UserStory) -> Self {
        Self {
            user_story,
            tasks: Vec::new(),
        }
    }

    pub fn task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

fn group_by<T>(items: Vec<T>, key: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut groups: HashMap<Uuid, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
}

impl ProjectTree {
    /// Builds the nested board from flat rows
    ///
    /// Rows whose parent is not part of the board are dropped. Every
    /// collection is sorted by `position`, ties broken by creation time.
    pub fn assemble(
        project: Project,
        mut lists: Vec<List>,
        features: Vec<Feature>,
        user_stories: Vec<UserStory>,
        tasks: Vec<Task>,
    ) -> Self {
        let mut tasks_by_story = group_by(tasks, |t| t.user_story_id);
        let mut stories_by_feature = group_by(user_stories, |s| s.feature_id);
        let mut features_by_list = group_by(features, |f| f.list_id);

        lists.sort_by_key(|l| (l.position, l.created_at));

        let lists = lists
            .into_iter()
            .map(|list| {
                let mut features = features_by_list.remove(&list.id).unwrap_or_default();
                features.sort_by_key(|f| (f.position, f.created_at));

                let features = features
                    .into_iter()
                    .map(|feature| {
                        let mut stories =
                            stories_by_feature.remove(&feature.id).unwrap_or_default();
                        stories.sort_by_key(|s| (s.position, s.created_at));

                        let user_stories = stories
                            .into_iter()
                            .map(|user_story| {
                                let mut tasks =
                                    tasks_by_story.remove(&user_story.id).unwrap_or_default();
                                tasks.sort_by_key(|t| (t.position, t.created_at));
                                UserStoryNode { user_story, tasks }
                            })
                            .collect();

                        FeatureNode {
                            feature,
                            user_stories,
                        }
                    })
                    .collect();

                ListNode { list, features }
            })
            .collect();

        Self { project, lists }
    }

    /// Loads a project owned by `user_id` together with its whole board
    ///
    /// Returns `None` when the project doesn't exist or belongs to another
    /// user.
    pub async fn load(
        pool: &PgPool,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(project) = Project::find_for_user(pool, user_id, project_id).await? else {
            return Ok(None);
        };

        let lists = List::list_by_project(pool, project_id).await?;
        let features = Feature::list_by_project(pool, project_id).await?;
        let user_stories = UserStory::list_by_project(pool, project_id).await?;
        let tasks = Task::list_by_project(pool, project_id).await?;

        Ok(Some(Self::assemble(project, lists, features, user_stories, tasks)))
    }

    pub fn list_mut(&mut self, id: Uuid) -> Option<&mut ListNode> {
        self.lists.iter_mut().find(|l| l.list.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project() -> Project {
        let now = Utc::now();
        Project {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Trip Plan".to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn list(project_id: Uuid, title: &str, position: i32) -> List {
        let now = Utc::now();
        List {
            id: Uuid::new_v4(),
            project_id,
            title: title.to_string(),
            description: None,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    fn feature(list_id: Uuid, title: &str, position: i32) -> Feature {
        let now = Utc::now();
        Feature {
            id: Uuid::new_v4(),
            list_id,
            title: title.to_string(),
            description: None,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_assemble_groups_and_sorts() {
        let project = project();
        let todo = list(project.id, "To Do", 0);
        let done = list(project.id, "Done", 1);
        let second = feature(todo.id, "second", 1);
        let first = feature(todo.id, "first", 0);
        let orphan = feature(Uuid::new_v4(), "orphan", 0);

        let tree = ProjectTree::assemble(
            project,
            vec![done.clone(), todo.clone()],
            vec![second, first, orphan],
            vec![],
            vec![],
        );

        let titles: Vec<_> = tree.lists.iter().map(|l| l.list.title.as_str()).collect();
        assert_eq!(titles, ["To Do", "Done"]);

        let features: Vec<_> = tree.lists[0]
            .features
            .iter()
            .map(|f| f.feature.title.as_str())
            .collect();
        assert_eq!(features, ["first", "second"]);
        assert!(tree.lists[1].features.is_empty());
    }

    #[test]
    fn test_tree_wire_shape() {
        let project = project();
        let todo = list(project.id, "To Do", 0);
        let card = feature(todo.id, "Flights", 0);
        let now = Utc::now();
        let story = UserStory {
            id: Uuid::new_v4(),
            feature_id: card.id,
            title: "Compare fares".to_string(),
            description: None,
            position: 0,
            created_at: now,
            updated_at: now,
        };

        let tree = ProjectTree::assemble(project, vec![todo], vec![card], vec![story], vec![]);
        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(json["title"], "Trip Plan");
        assert_eq!(json["lists"][0]["title"], "To Do");
        assert_eq!(json["lists"][0]["features"][0]["title"], "Flights");
        assert_eq!(
            json["lists"][0]["features"][0]["userStories"][0]["title"],
            "Compare fares"
        );
        assert!(json["lists"][0]["features"][0]["userStories"][0]["tasks"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_lookup_helpers() {
        let project = project();
        let todo = list(project.id, "To Do", 0);
        let card = feature(todo.id, "Flights", 0);
        let (list_id, feature_id) = (todo.id, card.id);

        let mut tree = ProjectTree::assemble(project, vec![todo], vec![card], vec![], vec![]);

        assert!(tree.list_mut(Uuid::new_v4()).is_none());
        let node = tree.list_mut(list_id).unwrap();
        assert!(node.feature_mut(feature_id).is_some());
        assert!(node.feature_mut(Uuid::new_v4()).is_none());
    }
}
