//! Data ingestion and layout engine for roadmap Gantt charts embedded in
//! a host document.
//!
//! The crate parses two payload grammars (a structured JSON one, with a
//! legacy line-based fallback) into a unified task/person timeline model
//! and computes deterministic geometry for an external render adapter:
//! row boxes, group bands, a clamped time scale, axis ticks, hatch
//! patterns for partial involvement, and the today marker. Painting and
//! pointer-event wiring stay with the adapter; it feeds semantic
//! [`Action`]s back in and receives [`Outcome`]s.
//!
//! ```no_run
//! use roadmap_gantt::{ChartInstance, GraphOptions};
//!
//! let payload = "Alpha, Kickoff\n2024-01-01 2024-01-05\nann 50%\n";
//! let chart = ChartInstance::from_payload(GraphOptions::default(), 960.0, payload)?;
//! let geometry = chart.refresh(chrono::Local::now().naive_local());
//! # Ok::<(), roadmap_gantt::ParseError>(())
//! ```

pub mod config;
pub mod instance;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod parse;
pub mod theme;

pub use config::{GraphOptions, GraphType, TickKind};
pub use instance::{bind_once, ChartInstance};
pub use interaction::{
    Action, FilterState, InteractionController, Outcome, StateDescriptor,
};
pub use layout::{layout, ChartKind, Geometry, GroupBand, HatchPattern, ItemBox, LayoutOptions, Rect, Tick, TimeScale};
pub use model::{Person, Task, TaskStyle, TimelineItem, TimelineModel};
pub use parse::{parse_payload, ParseError};
pub use theme::{Color, Palette};
