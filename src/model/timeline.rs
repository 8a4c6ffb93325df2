use serde::{Deserialize, Serialize};

use super::task::{compare_items, Person, Task, TimelineItem};

/// The parsed tasks and people of one chart instance.
///
/// Records are built once at parse time and never mutated afterwards;
/// filtering hands out cloned subsets for the layout engine to consume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineModel {
    pub tasks: Vec<Task>,
    pub people: Vec<Person>,
}

/// A drill-down view of the model: the subset of records shown in one
/// layout pass.
#[derive(Debug, Clone)]
pub struct FilteredView {
    pub tasks: Vec<Task>,
    pub people: Vec<Person>,
}

impl TimelineModel {
    pub fn new(tasks: Vec<Task>, people: Vec<Person>) -> Self {
        Self { tasks, people }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Restrict the model to one task group. `None` returns everything.
    ///
    /// Tasks match on their own group; people match on the group of their
    /// owning task, so drilling into a group keeps both charts consistent.
    pub fn filter_by_group(&self, group: Option<&str>) -> FilteredView {
        match group {
            None => FilteredView {
                tasks: self.tasks.clone(),
                people: self.people.clone(),
            },
            Some(g) => FilteredView {
                tasks: self
                    .tasks
                    .iter()
                    .filter(|t| t.group == g)
                    .cloned()
                    .collect(),
                people: self
                    .people
                    .iter()
                    .filter(|p| p.task_group == g)
                    .cloned()
                    .collect(),
            },
        }
    }
}

/// Stable in-place sort by the canonical chart order.
pub fn sort_items<T: TimelineItem>(items: &mut [T]) {
    items.sort_by(compare_items);
}
