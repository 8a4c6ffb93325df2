use serde::{Deserialize, Serialize};

/// Which of the two stacked charts a container shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphType {
    Tasks,
    People,
    #[default]
    Both,
}

/// Granularity of the horizontal axis ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickKind {
    /// One tick per Monday inside the time domain.
    #[default]
    Week,
    /// One tick on the first of each month inside the domain.
    Month,
}

/// Default axis label format when the host supplies none.
pub const DEFAULT_AXIS_FORMAT: &str = "%b %d";
/// Default format for parsing payload dates.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-container host configuration, read from the chart element's data
/// attributes by the embedding layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphOptions {
    pub graph_type: GraphType,
    /// chrono format string for payload dates and axis labels.
    pub date_format: Option<String>,
    pub ticks: TickKind,
    /// Element ids of the before/after viewer panes; the compare view is
    /// only offered when exactly two are configured.
    pub web_frames: Option<[String; 2]>,
    /// Mirror the tick axis at the top of the plot.
    pub additional_x_axis: bool,
    /// Revision the current document was built from; the "after" side of
    /// every comparison. Absent means no comparison is offered.
    pub build_revision: Option<String>,
}

impl GraphOptions {
    /// Format used to parse `from`/`to` fields in the payload.
    pub fn date_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT)
    }

    /// Format used for axis tick labels and the hover readout.
    pub fn axis_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or(DEFAULT_AXIS_FORMAT)
    }

    pub fn wants_tasks(&self) -> bool {
        self.graph_type != GraphType::People
    }

    pub fn wants_people(&self) -> bool {
        self.graph_type != GraphType::Tasks
    }
}
