use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::theme::Color;

/// Weight of the group label and bar caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStyle {
    #[default]
    Normal,
    Bold,
}

/// A single work item on the tasks chart.
///
/// `to` is the exclusive end of the bar: the last inclusive day bumped by
/// one full day, so a one-day task still gets a visible width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub group: String,
    /// Sub-task caption drawn on the bar; may be empty.
    pub name: String,
    pub style: TaskStyle,
    pub color: Color,
    pub order: i32,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub url: Option<String>,
    pub commit: Option<String>,
    /// Index of the prior task sharing this group, if any. Used by the
    /// compare view to locate the "before" revision.
    pub previous_task: Option<usize>,
}

/// One contributor's timeline slice within a task. Rows on the people
/// chart group by the person, not by the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Display name of the person; the grouping key on the people chart.
    pub person_group: String,
    pub order: i32,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    /// Caption drawn on the bar, derived from the owning task.
    pub display_name: String,
    /// Group of the owning task, mirrored exactly.
    pub task_group: String,
    /// Order of the owning task, mirrored exactly.
    pub task_order: i32,
    pub color: Color,
    /// Percent of capacity devoted to the task, 0–100. Values below 100
    /// render with a diagonal hatch.
    pub involvement: u8,
    pub url: Option<String>,
    /// Index of the owning task in the instance's task list.
    pub owning_task: Option<usize>,
}

/// Exclusive end of the day containing `date`: midnight of the next day.
pub fn day_end(date: NaiveDate) -> NaiveDateTime {
    (date + chrono::Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
}

/// Start of the day containing `date`.
pub fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
}

/// Common view over tasks and people used by sorting and layout.
pub trait TimelineItem {
    /// Grouping key: the task group on the tasks chart, the person on the
    /// people chart.
    fn group(&self) -> &str;
    /// Order used to sort groups against each other.
    fn group_order(&self) -> i32;
    /// Order used within one group.
    fn task_order(&self) -> i32;
    fn from(&self) -> NaiveDateTime;
    fn to(&self) -> NaiveDateTime;
    fn label(&self) -> &str;
    fn style(&self) -> TaskStyle;
    fn color(&self) -> Color;
    fn involvement(&self) -> u8 {
        100
    }
    fn url(&self) -> Option<&str>;
}

impl TimelineItem for Task {
    fn group(&self) -> &str {
        &self.group
    }
    fn group_order(&self) -> i32 {
        self.order
    }
    fn task_order(&self) -> i32 {
        self.order
    }
    fn from(&self) -> NaiveDateTime {
        self.from
    }
    fn to(&self) -> NaiveDateTime {
        self.to
    }
    fn label(&self) -> &str {
        &self.name
    }
    fn style(&self) -> TaskStyle {
        self.style
    }
    fn color(&self) -> Color {
        self.color
    }
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl TimelineItem for Person {
    fn group(&self) -> &str {
        &self.person_group
    }
    fn group_order(&self) -> i32 {
        self.order
    }
    fn task_order(&self) -> i32 {
        self.task_order
    }
    fn from(&self) -> NaiveDateTime {
        self.from
    }
    fn to(&self) -> NaiveDateTime {
        self.to
    }
    fn label(&self) -> &str {
        &self.display_name
    }
    fn style(&self) -> TaskStyle {
        TaskStyle::Normal
    }
    fn color(&self) -> Color {
        self.color
    }
    fn involvement(&self) -> u8 {
        self.involvement
    }
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Canonical ordering applied before every layout pass.
///
/// Groups sort by group order, then group name; within one group, items
/// sort by task order, then start date. Used with a stable sort so equal
/// keys keep their parse order.
pub fn compare_items<T: TimelineItem>(a: &T, b: &T) -> Ordering {
    if a.group() == b.group() {
        a.task_order()
            .cmp(&b.task_order())
            .then_with(|| a.from().cmp(&b.from()))
    } else {
        a.group_order()
            .cmp(&b.group_order())
            .then_with(|| a.group().cmp(b.group()))
    }
}
