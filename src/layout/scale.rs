use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::config::TickKind;
use crate::model::day_start;

/// Linear mapping from a date domain onto `[0, range]` pixels.
///
/// Values outside the domain clamp to the edges, matching the behavior of
/// a clamped d3 time scale. The scale travels with the produced geometry
/// so the render adapter can invert pointer positions for the hover
/// readout.
#[derive(Debug, Clone, Serialize)]
pub struct TimeScale {
    from: NaiveDateTime,
    to: NaiveDateTime,
    range: f32,
}

impl TimeScale {
    /// `to` must be after `from`; the parser's day-end bump guarantees at
    /// least one full day between them.
    pub fn new(from: NaiveDateTime, to: NaiveDateTime, range: f32) -> Self {
        debug_assert!(to > from);
        Self { from, to, range }
    }

    pub fn domain(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.from, self.to)
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    fn span_seconds(&self) -> f64 {
        (self.to - self.from).num_seconds() as f64
    }

    /// Pixel position of `t`, clamped to `[0, range]`.
    pub fn scale(&self, t: NaiveDateTime) -> f32 {
        let t = t.clamp(self.from, self.to);
        let elapsed = (t - self.from).num_seconds() as f64;
        (elapsed / self.span_seconds() * self.range as f64) as f32
    }

    /// Date under pixel `x`, clamped to the domain.
    pub fn invert(&self, x: f32) -> NaiveDateTime {
        let x = x.clamp(0.0, self.range) as f64;
        let seconds = (x / self.range as f64 * self.span_seconds()).round() as i64;
        self.from + Duration::seconds(seconds)
    }

    /// Whether `t` falls strictly inside the domain.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t > self.from && t < self.to
    }

    /// Tick dates inside `[from, to)`: every Monday for weekly ticks, the
    /// first of each month for monthly ones.
    pub fn ticks(&self, kind: TickKind) -> Vec<NaiveDateTime> {
        let mut ticks = Vec::new();
        let mut date = match kind {
            TickKind::Week => next_monday(self.from.date()),
            TickKind::Month => next_month_start(self.from.date()),
        };
        while day_start(date) < self.to {
            ticks.push(day_start(date));
            date = match kind {
                TickKind::Week => date + Duration::days(7),
                TickKind::Month => next_month_start(date + Duration::days(1)),
            };
        }
        ticks
    }
}

/// First Monday on or after `date`.
fn next_monday(date: NaiveDate) -> NaiveDate {
    let behind = date.weekday().num_days_from_monday();
    if behind == 0 {
        date
    } else {
        date + Duration::days((7 - behind) as i64)
    }
}

/// First day of the month, advancing to the next month when `date` is
/// already past the first.
fn next_month_start(date: NaiveDate) -> NaiveDate {
    if date.day() == 1 {
        return date;
    }
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}
