/// Database models for Planboard
///
/// # Models
///
/// - `user`: User accounts
/// - `project`: Projects owned by a user
/// - `list`, `feature`, `user_story`, `task`: The board hierarchy, each
///   ordered by `position` within its parent
/// - `tree`: A project assembled with its whole board
///
/// Each model carries its own sqlx queries against a `PgPool`; the
/// [`crate::store::postgres::PgStore`] composes them.

pub mod feature;
pub mod list;
pub mod project;
pub mod task;
pub mod tree;
pub mod user;
pub mod user_story;

pub use feature::{Feature, NewFeature};
pub use list::{List, NewList};
pub use project::{NewProject, Project};
pub use task::{NewTask, Task};
pub use tree::{FeatureNode, ListNode, ProjectTree, UserStoryNode};
pub use user::{NewUser, User};
pub use user_story::{NewUserStory, UserStory};
