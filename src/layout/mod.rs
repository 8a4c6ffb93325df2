pub mod scale;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::TickKind;
use crate::model::{compare_items, TaskStyle, TimelineItem};
use crate::theme::{self, Color};

pub use scale::TimeScale;

/// Which of the two stacked charts a geometry belongs to. Only task-chart
/// group labels trigger the drill-down filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Tasks,
    People,
}

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One bar on the chart. `rect.x`/`rect.width` are plot-relative; the
/// adapter translates them by `Geometry::side_padding`.
#[derive(Debug, Clone, Serialize)]
pub struct ItemBox {
    pub rect: Rect,
    pub label: String,
    pub style: TaskStyle,
    pub color: Color,
    /// Hatch pattern id when the item renders partially involved.
    pub hatch: Option<usize>,
    pub url: Option<String>,
    /// Index of the item in the (sorted) input slice, for routing clicks
    /// back to the record.
    pub item_index: usize,
}

/// Background span covering all consecutive rows sharing one group.
/// `rect` spans the full container width, including the label gutter.
#[derive(Debug, Clone, Serialize)]
pub struct GroupBand {
    pub name: String,
    pub style: TaskStyle,
    pub start_row: usize,
    pub row_count: usize,
    pub rect: Rect,
    /// Vertical anchor of the group label, fed back by the adapter when a
    /// label click starts a drill-down.
    pub label_y: f32,
}

/// Diagonal hatch tile for a partially involved person bar: a `width`-px
/// stripe inside an 8 px repeat, rotated 45°.
#[derive(Debug, Clone, Serialize)]
pub struct HatchPattern {
    pub id: usize,
    pub width: f32,
    pub tile: f32,
    pub angle: f32,
    pub color: Color,
}

/// One axis tick, plot-relative x.
#[derive(Debug, Clone, Serialize)]
pub struct Tick {
    pub x: f32,
    pub label: String,
}

/// Everything the render adapter needs to paint one chart.
#[derive(Debug, Clone, Serialize)]
pub struct Geometry {
    pub kind: ChartKind,
    /// Vertical offset of this chart within the shared surface; non-zero
    /// for the people chart stacked below the tasks chart.
    pub y_offset: f32,
    /// Height of this chart including its axis strip.
    pub height: f32,
    pub container_width: f32,
    pub side_padding: f32,
    /// Top of the plot area, in surface coordinates.
    pub plot_top: f32,
    /// Baseline of the bottom axis, in surface coordinates; tick lines
    /// span from `plot_top` down to here.
    pub axis_y: f32,
    pub bands: Vec<GroupBand>,
    pub items: Vec<ItemBox>,
    pub patterns: Vec<HatchPattern>,
    pub ticks: Vec<Tick>,
    /// Mirrored ticks for the optional top axis.
    pub top_ticks: Option<Vec<Tick>>,
    /// Plot-relative x of the "now" marker, only when now is strictly
    /// inside the time domain.
    pub today_x: Option<f32>,
    pub scale: TimeScale,
    axis_format: String,
}

impl Geometry {
    /// Total surface height up to and including this chart.
    pub fn total_height(&self) -> f32 {
        self.y_offset + self.height
    }

    /// Formatted date under a surface x coordinate, for the hover
    /// readout. `None` left of the plot area.
    pub fn hover_label(&self, surface_x: f32) -> Option<String> {
        if surface_x <= self.side_padding {
            return None;
        }
        let date = self.scale.invert(surface_x - self.side_padding);
        Some(date.format(&self.axis_format).to_string())
    }
}

/// Inputs of one layout pass.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub kind: ChartKind,
    pub container_width: f32,
    /// Side padding carried over from an earlier pass in the same draw
    /// cycle; `None` computes it from the widest group label.
    pub side_padding: Option<f32>,
    /// Accumulated height of earlier passes in the same draw cycle.
    pub y_offset: f32,
    /// First hatch pattern id to allocate; the counter is monotonic
    /// across the passes of one draw cycle.
    pub pattern_start: usize,
    pub ticks: TickKind,
    pub axis_format: String,
    pub additional_x_axis: bool,
    pub now: NaiveDateTime,
    /// Extra padding above the plot while drilled into a group, keeping
    /// the back control near where the label was clicked.
    pub extra_top_padding: f32,
}

/// Compute the full geometry for one chart: sorted rows, group bands,
/// hatch patterns, time scale, axis ticks and the today marker. Pure; the
/// same items and options always produce the same geometry.
pub fn layout<T: TimelineItem + Clone>(items: &[T], options: &LayoutOptions) -> Geometry {
    let mut items: Vec<T> = items.to_vec();
    items.sort_by(compare_items);

    let side_padding = options.side_padding.unwrap_or_else(|| {
        let widest = items
            .iter()
            .map(|item| theme::estimate_label_width(item.group()))
            .fold(0.0, f32::max);
        widest + theme::LABEL_GAP
    });
    let plot_width = (options.container_width - side_padding - theme::RIGHT_MARGIN).max(0.0);

    let plot_top = options.y_offset + theme::TOP_PADDING + options.extra_top_padding;
    let height = items.len() as f32 * theme::ROW_BAND
        + theme::TOP_PADDING
        + options.extra_top_padding
        + theme::AXIS_HEIGHT;
    let axis_y = options.y_offset + height - theme::AXIS_HEIGHT;

    let bands = group_bands(&items, options.container_width, plot_top);
    let (domain_from, domain_to) = time_domain(&items, options.now);
    let scale = TimeScale::new(domain_from, domain_to, plot_width);

    let mut patterns = Vec::new();
    let mut next_pattern = options.pattern_start;
    let boxes = items
        .iter()
        .enumerate()
        .map(|(row, item)| {
            let hatch = if item.involvement() != 100 {
                let id = next_pattern;
                next_pattern += 1;
                patterns.push(HatchPattern {
                    id,
                    width: (item.involvement() as f32 * 8.0 / 100.0).ceil(),
                    tile: 8.0,
                    angle: 45.0,
                    color: item.color(),
                });
                Some(id)
            } else {
                None
            };
            let x = scale.scale(item.from());
            ItemBox {
                rect: Rect {
                    x,
                    y: plot_top + row as f32 * theme::ROW_BAND,
                    width: scale.scale(item.to()) - x,
                    height: theme::BAR_HEIGHT,
                },
                label: item.label().to_string(),
                style: item.style(),
                color: item.color(),
                hatch,
                url: item.url().map(str::to_string),
                item_index: row,
            }
        })
        .collect();

    let ticks: Vec<Tick> = scale
        .ticks(options.ticks)
        .into_iter()
        .map(|t| Tick {
            x: scale.scale(t),
            label: t.format(&options.axis_format).to_string(),
        })
        .collect();
    let top_ticks = options.additional_x_axis.then(|| ticks.clone());

    let today_x = scale
        .contains(options.now)
        .then(|| scale.scale(options.now));

    Geometry {
        kind: options.kind,
        y_offset: options.y_offset,
        height,
        container_width: options.container_width,
        side_padding,
        plot_top,
        axis_y,
        bands,
        items: boxes,
        patterns,
        ticks,
        top_ticks,
        today_x,
        scale,
        axis_format: options.axis_format.clone(),
    }
}

/// Collapse consecutive equal-group runs of the sorted items into bands.
fn group_bands<T: TimelineItem>(items: &[T], width: f32, plot_top: f32) -> Vec<GroupBand> {
    let mut bands: Vec<GroupBand> = Vec::new();
    for item in items {
        match bands.last_mut() {
            Some(band) if band.name == item.group() => band.row_count += 1,
            _ => {
                let start_row = bands
                    .last()
                    .map(|b| b.start_row + b.row_count)
                    .unwrap_or(0);
                bands.push(GroupBand {
                    name: item.group().to_string(),
                    style: item.style(),
                    start_row,
                    row_count: 1,
                    rect: Rect {
                        x: 0.0,
                        y: 0.0,
                        width,
                        height: 0.0,
                    },
                    label_y: 0.0,
                });
            }
        }
    }
    for band in &mut bands {
        let y = plot_top + band.start_row as f32 * theme::ROW_BAND;
        let h = band.row_count as f32 * theme::ROW_BAND - theme::ROW_GAP;
        band.rect.y = y;
        band.rect.height = h;
        band.label_y = y + h / 2.0 + 2.0;
    }
    bands
}

/// `[min from, max to]` over the items; degenerate one-day domain around
/// `now` when there are no items.
fn time_domain<T: TimelineItem>(
    items: &[T],
    now: NaiveDateTime,
) -> (NaiveDateTime, NaiveDateTime) {
    let from = items.iter().map(|i| i.from()).min();
    let to = items.iter().map(|i| i.to()).max();
    match (from, to) {
        (Some(from), Some(to)) => (from, to),
        _ => (now, now + chrono::Duration::days(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{day_end, day_start, Person, Task};
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        day_start(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn task(group: &str, from_day: u32, days: i64) -> Task {
        let from = NaiveDate::from_ymd_opt(2024, 1, from_day).unwrap();
        Task {
            group: group.to_string(),
            name: format!("{} work", group),
            style: TaskStyle::Normal,
            color: Color::from_rgb(10, 20, 30),
            order: 0,
            from: day_start(from),
            to: day_end(from + chrono::Duration::days(days - 1)),
            url: None,
            commit: None,
            previous_task: None,
        }
    }

    fn person(name: &str, involvement: u8) -> Person {
        Person {
            person_group: name.to_string(),
            order: 0,
            from: dt(2024, 1, 1),
            to: dt(2024, 1, 6),
            display_name: "Alpha".to_string(),
            task_group: "Alpha".to_string(),
            task_order: 0,
            color: Color::from_rgb(10, 20, 30),
            involvement,
            url: None,
            owning_task: None,
        }
    }

    fn options() -> LayoutOptions {
        LayoutOptions {
            kind: ChartKind::Tasks,
            container_width: 800.0,
            side_padding: None,
            y_offset: 0.0,
            pattern_start: 0,
            ticks: TickKind::Week,
            axis_format: "%b %d".to_string(),
            additional_x_axis: false,
            now: dt(2023, 6, 1),
            extra_top_padding: 0.0,
        }
    }

    #[test]
    fn bands_partition_the_rows() {
        let items = vec![
            task("Beta", 10, 5),
            task("Alpha", 1, 5),
            task("Alpha", 6, 3),
            task("Gamma", 2, 2),
        ];
        let geometry = layout(&items, &options());

        let total: usize = geometry.bands.iter().map(|b| b.row_count).sum();
        assert_eq!(total, items.len());

        // Contiguous, non-overlapping row ranges in sorted order.
        let mut next_row = 0;
        for band in &geometry.bands {
            assert_eq!(band.start_row, next_row);
            next_row += band.row_count;
        }
        let names: Vec<&str> = geometry.bands.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(geometry.bands[0].row_count, 2);
    }

    #[test]
    fn rows_stack_below_the_top_padding() {
        let items = vec![task("Alpha", 1, 5), task("Beta", 3, 5)];
        let geometry = layout(&items, &options());
        assert_eq!(geometry.items[0].rect.y, theme::TOP_PADDING);
        assert_eq!(
            geometry.items[1].rect.y,
            theme::TOP_PADDING + theme::ROW_BAND
        );
        assert_eq!(
            geometry.height,
            2.0 * theme::ROW_BAND + theme::TOP_PADDING + theme::AXIS_HEIGHT
        );
    }

    #[test]
    fn bars_scale_with_the_time_domain() {
        let items = vec![task("Alpha", 1, 10)];
        let geometry = layout(&items, &options());
        let item = &geometry.items[0];
        // Single task spans the whole domain.
        assert_eq!(item.rect.x, 0.0);
        assert!((item.rect.width - geometry.scale.range()).abs() < 0.01);
        assert_eq!(
            geometry.scale.range(),
            800.0 - geometry.side_padding - theme::RIGHT_MARGIN
        );
    }

    #[test]
    fn hatch_allocated_only_below_full_involvement() {
        let items = vec![person("ann", 50), person("bob", 100), person("cleo", 25)];
        let mut opts = options();
        opts.kind = ChartKind::People;
        opts.pattern_start = 3;
        let geometry = layout(&items, &opts);

        assert_eq!(geometry.patterns.len(), 2);
        assert_eq!(geometry.patterns[0].id, 3);
        assert_eq!(geometry.patterns[0].width, 4.0);
        assert_eq!(geometry.patterns[1].id, 4);
        assert_eq!(geometry.patterns[1].width, 2.0);

        let hatched: Vec<Option<usize>> =
            geometry.items.iter().map(|i| i.hatch).collect();
        assert_eq!(hatched, vec![Some(3), None, Some(4)]);
    }

    #[test]
    fn today_marker_requires_now_inside_domain() {
        let items = vec![task("Alpha", 1, 10)];
        let mut opts = options();
        opts.now = dt(2024, 1, 5);
        assert!(layout(&items, &opts).today_x.is_some());

        opts.now = dt(2025, 1, 1);
        assert!(layout(&items, &opts).today_x.is_none());

        // Exactly on the domain edge does not count as inside.
        opts.now = dt(2024, 1, 1);
        assert!(layout(&items, &opts).today_x.is_none());
    }

    #[test]
    fn side_padding_reused_from_prior_pass() {
        let items = vec![task("A very long group name", 1, 5)];
        let first = layout(&items, &options());
        assert!(first.side_padding > theme::LABEL_GAP);

        let mut opts = options();
        opts.side_padding = Some(first.side_padding);
        opts.y_offset = first.height;
        let second = layout(&[person("ann", 100)], &opts);
        assert_eq!(second.side_padding, first.side_padding);
        assert_eq!(second.plot_top, first.height + theme::TOP_PADDING);
        assert_eq!(second.total_height(), first.height + second.height);
    }

    #[test]
    fn top_axis_mirrors_the_ticks() {
        let items = vec![task("Alpha", 1, 21)];
        let mut opts = options();
        opts.additional_x_axis = true;
        let geometry = layout(&items, &opts);
        assert!(!geometry.ticks.is_empty());
        let top = geometry.top_ticks.as_ref().unwrap();
        assert_eq!(top.len(), geometry.ticks.len());
        assert_eq!(top[0].x, geometry.ticks[0].x);
    }

    #[test]
    fn hover_label_requires_plot_area() {
        let items = vec![task("Alpha", 1, 10)];
        let geometry = layout(&items, &options());
        assert_eq!(geometry.hover_label(0.0), None);
        let label = geometry
            .hover_label(geometry.side_padding + 1.0)
            .expect("inside the plot");
        assert!(label.starts_with("Jan"));
    }
}
