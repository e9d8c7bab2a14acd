//! Server-side rendering of timestamp labels.
//!
//! The label pattern is chosen from the aggregation mode and range, then
//! coarsened by an ordered list of overrides for dense series and narrow
//! screens.

use chrono::{NaiveDate, NaiveDateTime};
use common::req::{AggregateMode, RangeSpec, TimeTemplate};

/// Series with more points than this get compact labels.
pub const DENSE_DATA_POINTS: usize = 50;
/// Screens narrower than this (px) are treated as mobile.
pub const NARROW_SCREEN_PX: u32 = 768;

// Stored and ISO-style stamps down to minute precision; date-only text
// is handled in `parse_local` as midnight.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Per-request inputs to every formatting decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayContext {
    pub aggregate: AggregateMode,
    pub range: RangeSpec,
    pub data_points: usize,
    pub screen_width: u32,
}

impl DisplayContext {
    pub fn is_dense(&self) -> bool {
        self.data_points > DENSE_DATA_POINTS
    }

    pub fn is_narrow(&self) -> bool {
        self.screen_width < NARROW_SCREEN_PX
    }
}

struct Override {
    applies: fn(&DisplayContext) -> bool,
    template: fn(RangeSpec) -> TimeTemplate,
}

// evaluated top to bottom, the last applicable entry wins
const OVERRIDES: [Override; 2] = [
    Override {
        applies: DisplayContext::is_dense,
        template: compact_template,
    },
    Override {
        applies: DisplayContext::is_narrow,
        template: compact_template,
    },
];

fn compact_template(range: RangeSpec) -> TimeTemplate {
    if range.is_short() {
        TimeTemplate::HourMinute
    } else {
        TimeTemplate::MonthDay
    }
}

fn base_template(aggregate: AggregateMode, range: RangeSpec) -> TimeTemplate {
    match (aggregate, range) {
        (AggregateMode::Raw, RangeSpec::OneHour | RangeSpec::SixHours) => {
            TimeTemplate::HourMinuteSecond
        }
        (AggregateMode::Raw, RangeSpec::Month) => TimeTemplate::MonthDay,
        (AggregateMode::Raw, _) => TimeTemplate::MonthDayHourMinute,
        (AggregateMode::Hourly, RangeSpec::Month) => TimeTemplate::MonthDay,
        (AggregateMode::Hourly, _) => TimeTemplate::MonthDayHour,
        (AggregateMode::Daily, _) => TimeTemplate::MonthDay,
    }
}

/// Pattern used to render every label of a series in `ctx`.
pub fn label_template(ctx: &DisplayContext) -> TimeTemplate {
    OVERRIDES
        .iter()
        .fold(base_template(ctx.aggregate, ctx.range), |template, o| {
            if (o.applies)(ctx) {
                (o.template)(ctx.range)
            } else {
                template
            }
        })
}

/// Renders a stored timestamp as a display label.
///
/// Fractional seconds are dropped first. Text that does not parse as a
/// local date-time is returned as is (minus the fraction).
pub fn format_timestamp(text: &str, ctx: &DisplayContext) -> String {
    let base = strip_fraction(text);
    match parse_local(base) {
        Some(dt) => dt.format(label_template(ctx).pattern()).to_string(),
        None => base.to_string(),
    }
}

fn strip_fraction(text: &str) -> &str {
    match text.split_once('.') {
        Some((base, _)) => base,
        None => text,
    }
}

fn parse_local(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
