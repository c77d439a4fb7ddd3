//! Drag-and-drop ordering of sibling collections
//!
//! A move is described by the index of the dragged item (`source`) and the
//! *gap* it was dropped into. A collection of `N` items has `N + 1` gaps:
//! gap `0` is before the first item and gap `N` is after the last one.
//!
//! Dropping an item into the gap directly before or after itself
//! (`gap == source` or `gap == source + 1`) changes nothing and is treated
//! as a no-op. Otherwise the item is removed and reinserted, and only the
//! items between the old and new index are renumbered, so the number of
//! writes is proportional to the distance moved.
//!
//! ```
//! use planboard_shared::ordering::{plan_move, MovePlan};
//!
//! // [o0, o1, o2, o3]: drag o2 into the gap before o0
//! let plan = plan_move(4, 2, 0).unwrap().unwrap();
//! assert_eq!(plan, MovePlan { source: 2, destination: 0 });
//! assert_eq!(plan.affected(), 0..=2);
//!
//! // dropping o2 right before or right after itself is a no-op
//! assert!(plan_move(4, 2, 2).unwrap().is_none());
//! assert!(plan_move(4, 2, 3).unwrap().is_none());
//! ```

use std::ops::RangeInclusive;

use uuid::Uuid;

use crate::models::{Feature, FeatureNode, List, ListNode, Task, UserStory, UserStoryNode};

/// Error type for move planning
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
    #[error("Source index {index} is out of range for {len} items")]
    SourceOutOfRange { index: usize, len: usize },

    #[error("Destination index {index} is out of range for {len} items")]
    DestinationOutOfRange { index: usize, len: usize },
}

/// Level of the board hierarchy a sibling collection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiblingLevel {
    List,
    Feature,
    UserStory,
    Task,
}

impl SiblingLevel {
    /// Table holding rows of this level
    pub fn table(&self) -> &'static str {
        match self {
            SiblingLevel::List => "lists",
            SiblingLevel::Feature => "features",
            SiblingLevel::UserStory => "user_stories",
            SiblingLevel::Task => "tasks",
        }
    }

    /// Human-readable entity name, used in errors and logs
    pub fn entity(&self) -> &'static str {
        match self {
            SiblingLevel::List => "List",
            SiblingLevel::Feature => "Feature",
            SiblingLevel::UserStory => "User story",
            SiblingLevel::Task => "Task",
        }
    }
}

/// Items that carry an id and a position among their siblings
pub trait Positioned {
    fn id(&self) -> Uuid;
    fn position(&self) -> i32;
    fn set_position(&mut self, position: i32);
}

/// A single position write produced by a move or compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionUpdate {
    pub id: Uuid,
    pub position: i32,
}

/// A validated, effective move
///
/// `destination` is the item's final index, already adjusted for the
/// removal of the source item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub source: usize,
    pub destination: usize,
}

impl MovePlan {
    /// Indices whose position changes
    pub fn affected(&self) -> RangeInclusive<usize> {
        self.source.min(self.destination)..=self.source.max(self.destination)
    }
}

/// Validates a drop of item `source` into gap `gap` of a collection of `len`
///
/// Returns `Ok(None)` for the no-op gaps around the source item.
pub fn plan_move(len: usize, source: usize, gap: usize) -> Result<Option<MovePlan>, OrderingError> {
    if source >= len {
        return Err(OrderingError::SourceOutOfRange { index: source, len });
    }
    if gap > len {
        return Err(OrderingError::DestinationOutOfRange { index: gap, len });
    }
    if gap == source || gap == source + 1 {
        return Ok(None);
    }

    let destination = if gap > source { gap - 1 } else { gap };

    Ok(Some(MovePlan {
        source,
        destination,
    }))
}

/// Performs a planned move in place and renumbers the affected range
///
/// Returns the position writes needed to persist the move, in index order.
pub fn apply_move<T: Positioned>(items: &mut Vec<T>, plan: MovePlan) -> Vec<PositionUpdate> {
    let item = items.remove(plan.source);
    items.insert(plan.destination, item);

    plan.affected()
        .map(|index| {
            let item = &mut items[index];
            item.set_position(index as i32);
            PositionUpdate {
                id: item.id(),
                position: index as i32,
            }
        })
        .collect()
}

/// Plans and applies a move in one step
///
/// Returns no updates when the drop is a no-op.
pub fn reorder<T: Positioned>(
    items: &mut Vec<T>,
    source: usize,
    gap: usize,
) -> Result<Vec<PositionUpdate>, OrderingError> {
    Ok(match plan_move(items.len(), source, gap)? {
        Some(plan) => apply_move(items, plan),
        None => Vec::new(),
    })
}

/// Renumbers items to `0..len` in their current order
///
/// Returns writes only for the items whose position actually changed, which
/// after removing one item are the ones that followed it.
pub fn compact<T: Positioned>(items: &mut [T]) -> Vec<PositionUpdate> {
    items
        .iter_mut()
        .enumerate()
        .filter(|(index, item)| item.position() != *index as i32)
        .map(|(index, item)| {
            item.set_position(index as i32);
            PositionUpdate {
                id: item.id(),
                position: index as i32,
            }
        })
        .collect()
}

impl Positioned for List {
    fn id(&self) -> Uuid {
        self.id
    }
    fn position(&self) -> i32 {
        self.position
    }
    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

impl Positioned for Feature {
    fn id(&self) -> Uuid {
        self.id
    }
    fn position(&self) -> i32 {
        self.position
    }
    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

impl Positioned for UserStory {
    fn id(&self) -> Uuid {
        self.id
    }
    fn position(&self) -> i32 {
        self.position
    }
    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

impl Positioned for Task {
    fn id(&self) -> Uuid {
        self.id
    }
    fn position(&self) -> i32 {
        self.position
    }
    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

impl Positioned for ListNode {
    fn id(&self) -> Uuid {
        self.list.id
    }
    fn position(&self) -> i32 {
        self.list.position
    }
    fn set_position(&mut self, position: i32) {
        self.list.position = position;
    }
}

impl Positioned for FeatureNode {
    fn id(&self) -> Uuid {
        self.feature.id
    }
    fn position(&self) -> i32 {
        self.feature.position
    }
    fn set_position(&mut self, position: i32) {
        self.feature.position = position;
    }
}

impl Positioned for UserStoryNode {
    fn id(&self) -> Uuid {
        self.user_story.id
    }
    fn position(&self) -> i32 {
        self.user_story.position
    }
    fn set_position(&mut self, position: i32) {
        self.user_story.position = position;
    }
}
