use chrono::NaiveDateTime;
use once_cell::sync::OnceCell;
use uuid::Uuid;

use crate::config::GraphOptions;
use crate::interaction::{
    compare_person, compare_task, Action, InteractionController, Outcome,
};
use crate::layout::{layout, ChartKind, Geometry, LayoutOptions};
use crate::model::TimelineModel;
use crate::parse::{parse_payload, ParseError};
use crate::theme::Palette;

static BOUND: OnceCell<()> = OnceCell::new();

/// Run the page-level parse-and-bind sequence at most once per process,
/// even when the host ready signal fires repeatedly. Returns whether `f`
/// actually ran.
pub fn bind_once<F: FnOnce()>(f: F) -> bool {
    let mut ran = false;
    BOUND.get_or_init(|| {
        f();
        ran = true;
    });
    ran
}

/// One chart container: parsed model, host configuration and drill-down
/// state. Instances are independent; a payload failing to parse only
/// keeps its own container from rendering.
#[derive(Debug)]
pub struct ChartInstance {
    id: Uuid,
    options: GraphOptions,
    container_width: f32,
    model: TimelineModel,
    controller: InteractionController,
}

impl ChartInstance {
    /// Parse the container's text payload and build the instance.
    pub fn from_payload(
        options: GraphOptions,
        container_width: f32,
        payload: &str,
    ) -> Result<Self, ParseError> {
        let mut palette = Palette::new();
        let model = parse_payload(payload, &options, &mut palette)?;
        Ok(Self {
            id: Uuid::new_v4(),
            options,
            container_width,
            model,
            controller: InteractionController::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    pub fn model(&self) -> &TimelineModel {
        &self.model
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Run one draw cycle for the current filter state: the tasks chart,
    /// then the people chart stacked below it, sharing side padding and
    /// the hatch pattern counter. Empty when the payload held no tasks.
    pub fn refresh(&self, now: NaiveDateTime) -> Vec<Geometry> {
        if self.model.is_empty() {
            return Vec::new();
        }
        let view = self.model.filter_by_group(self.controller.filter());
        let mut geometries: Vec<Geometry> = Vec::new();

        if self.options.wants_tasks() {
            let geometry = layout(
                &view.tasks,
                &self.pass_options(ChartKind::Tasks, &geometries, now),
            );
            geometries.push(geometry);
        }
        if self.options.wants_people() && !view.people.is_empty() {
            let geometry = layout(
                &view.people,
                &self.pass_options(ChartKind::People, &geometries, now),
            );
            geometries.push(geometry);
        }
        geometries
    }

    /// Handle a semantic action surfaced by the render adapter.
    pub fn handle(&mut self, action: Action, now: NaiveDateTime) -> Outcome {
        match action {
            Action::SelectGroup { name, label_y } => {
                // Filtered-to-filtered is not supported; the adapter
                // goes back first.
                if self.controller.filter().is_some() {
                    return Outcome::Ignored;
                }
                self.controller.select_group(&name, label_y);
                Outcome::Redraw(self.refresh(now))
            }
            Action::SelectBack => {
                self.controller.select_back();
                Outcome::Redraw(self.refresh(now))
            }
            Action::SelectTask { index } => match self.model.tasks.get(index) {
                Some(task) => {
                    if let Some(pair) = compare_task(task, &self.model.tasks, &self.options)
                    {
                        Outcome::Compare(pair.to_vec())
                    } else if let Some(url) = &task.url {
                        Outcome::OpenUrl(url.clone())
                    } else {
                        Outcome::Ignored
                    }
                }
                None => Outcome::Ignored,
            },
            Action::SelectPerson { index } => match self.model.people.get(index) {
                Some(person) => {
                    if let Some(pair) =
                        compare_person(person, &self.model.tasks, &self.options)
                    {
                        Outcome::Compare(pair.to_vec())
                    } else if let Some(url) = &person.url {
                        Outcome::OpenUrl(url.clone())
                    } else {
                        Outcome::Ignored
                    }
                }
                None => Outcome::Ignored,
            },
        }
    }

    /// Options for the next pass of the current draw cycle. The first
    /// pass computes side padding and carries the drill-down padding;
    /// later passes reuse the padding and stack below.
    fn pass_options(
        &self,
        kind: ChartKind,
        earlier: &[Geometry],
        now: NaiveDateTime,
    ) -> LayoutOptions {
        let last = earlier.last();
        LayoutOptions {
            kind,
            container_width: self.container_width,
            side_padding: last.map(|g| g.side_padding),
            y_offset: last.map(|g| g.total_height()).unwrap_or(0.0),
            pattern_start: earlier.iter().map(|g| g.patterns.len()).sum(),
            ticks: self.options.ticks,
            axis_format: self.options.axis_format().to_string(),
            additional_x_axis: self.options.additional_x_axis,
            now,
            extra_top_padding: if earlier.is_empty() {
                self.controller.extra_padding()
            } else {
                0.0
            },
        }
    }
}
