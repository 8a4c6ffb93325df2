use serde::Serialize;

use crate::config::GraphOptions;
use crate::layout::Geometry;
use crate::model::{Person, Task};

/// Vertical slack subtracted from the clicked label position when
/// deriving the drill-down padding, so the back control lands slightly
/// above where the label was.
const DRILL_DOWN_OFFSET: f32 = 150.0;

/// Drill-down filter state of one chart instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Full,
    FilteredByGroup(String),
}

/// Two-state filter machine: `Full ↔ FilteredByGroup`. Moving between two
/// filtered groups is not supported; the adapter goes back first.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: FilterState,
    extra_padding: f32,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Group the view is currently narrowed to, if any.
    pub fn filter(&self) -> Option<&str> {
        match &self.state {
            FilterState::Full => None,
            FilterState::FilteredByGroup(g) => Some(g),
        }
    }

    /// Padding to add above the filtered plot so the layout stays visually
    /// anchored to the clicked label.
    pub fn extra_padding(&self) -> f32 {
        self.extra_padding
    }

    /// Enter the drill-down for `group`. `label_y` is the surface position
    /// of the clicked group label.
    pub fn select_group(&mut self, group: &str, label_y: f32) {
        self.state = FilterState::FilteredByGroup(group.to_string());
        self.extra_padding = (label_y - DRILL_DOWN_OFFSET).max(0.0);
    }

    /// Leave the drill-down and restore the full view.
    pub fn select_back(&mut self) {
        self.state = FilterState::Full;
        self.extra_padding = 0.0;
    }
}

/// Semantic actions the render adapter feeds back into the core.
#[derive(Debug, Clone)]
pub enum Action {
    /// A task-chart group label was selected.
    SelectGroup { name: String, label_y: f32 },
    /// The synthesized back control was selected.
    SelectBack,
    /// A task bar was selected; the index refers to the instance's task
    /// list.
    SelectTask { index: usize },
    /// A person bar was selected; the index refers to the instance's
    /// people list.
    SelectPerson { index: usize },
}

/// What the adapter should do after an action was handled.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Repaint from the given geometry.
    Redraw(Vec<Geometry>),
    /// Open an external link.
    OpenUrl(String),
    /// Hand one descriptor each to the before/after viewer panes.
    Compare(Vec<StateDescriptor>),
    /// Nothing to do.
    Ignored,
}

/// One side of the before/after compare view, handed to an external
/// viewer pane for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDescriptor {
    /// Element id of the receiving viewer pane.
    pub element_id: String,
    /// Short revision label; `None` when the state never existed.
    pub revision: Option<String>,
    /// Resource to load; `None` clears the pane.
    pub resource_path: Option<String>,
    pub caption: String,
    pub subject: String,
}

/// Compare descriptors for a clicked task bar: the entry point as built
/// by the prior task's revision versus the current build. `None` when no
/// viewer panes or no build revision are configured, or the task carries
/// no link.
pub fn compare_task(
    task: &Task,
    tasks: &[Task],
    options: &GraphOptions,
) -> Option<[StateDescriptor; 2]> {
    let frames = options.web_frames.as_ref()?;
    let current = options.build_revision.as_deref()?;
    task.url.as_deref()?;

    let before = match prior_commit(task, tasks) {
        Some(commit) => StateDescriptor {
            element_id: frames[0].clone(),
            revision: Some(short_rev(commit).to_string()),
            resource_path: Some(format!("index.{}.html", short_rev(commit))),
            caption: "Previously".to_string(),
            subject: "the entry point /".to_string(),
        },
        None => never_existed(&frames[0], "the entry point /"),
    };
    let after = StateDescriptor {
        element_id: frames[1].clone(),
        revision: Some(short_rev(current).to_string()),
        resource_path: Some(".".to_string()),
        caption: "Now".to_string(),
        subject: "the entry point /".to_string(),
    };
    Some([before, after])
}

/// Compare descriptors for a clicked person bar. The person's group names
/// the resource; the owning task's commit decides whether the "before"
/// side is the previously published revision or the prior task's one.
pub fn compare_person(
    person: &Person,
    tasks: &[Task],
    options: &GraphOptions,
) -> Option<[StateDescriptor; 2]> {
    let frames = options.web_frames.as_ref()?;
    let current = options.build_revision.as_deref()?;
    let task = person.owning_task.and_then(|i| tasks.get(i))?;
    let task_url = task.url.as_deref()?;
    let resource = person.person_group.as_str();

    let task_is_current = task.commit.as_deref() == Some(current);
    let before = if task_is_current {
        match prior_commit(task, tasks) {
            Some(commit) => StateDescriptor {
                element_id: frames[0].clone(),
                revision: Some(short_rev(commit).to_string()),
                resource_path: Some(versioned_path(resource, commit)),
                caption: "The previous version".to_string(),
                subject: resource.to_string(),
            },
            None => never_existed(&frames[0], resource),
        }
    } else {
        match task.commit.as_deref() {
            Some(commit) => StateDescriptor {
                element_id: frames[0].clone(),
                revision: Some(short_rev(commit).to_string()),
                resource_path: Some(format!("{}/{}", task_url, resource)),
                caption: "When published".to_string(),
                subject: resource.to_string(),
            },
            None => never_existed(&frames[0], resource),
        }
    };

    let after_path = match task.commit.as_deref() {
        Some(_) if task_is_current => resource.to_string(),
        Some(commit) => versioned_path(resource, commit),
        None => resource.to_string(),
    };
    let after = StateDescriptor {
        element_id: frames[1].clone(),
        revision: Some(short_rev(current).to_string()),
        resource_path: Some(after_path),
        caption: "Now".to_string(),
        subject: resource.to_string(),
    };
    Some([before, after])
}

/// Commit of the prior task in the same group, when both exist.
fn prior_commit<'a>(task: &Task, tasks: &'a [Task]) -> Option<&'a str> {
    tasks
        .get(task.previous_task?)
        .and_then(|prev| prev.commit.as_deref())
}

fn never_existed(frame: &str, subject: &str) -> StateDescriptor {
    StateDescriptor {
        element_id: frame.to_string(),
        revision: None,
        resource_path: None,
        caption: "Previously".to_string(),
        subject: format!("{} did not previously exist", subject),
    }
}

fn short_rev(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}

/// Insert the short revision before an `.html` extension; other resource
/// names pass through unversioned.
fn versioned_path(name: &str, commit: &str) -> String {
    match name.strip_suffix(".html") {
        Some(stem) => format!("{}.{}.html", stem, short_rev(commit)),
        None => name.to_string(),
    }
}
