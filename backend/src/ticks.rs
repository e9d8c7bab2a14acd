//! Axis tick planning: label template and tick budget per display context.

use common::req::{AggregateMode, RangeSpec, TickRule, TimeTemplate};

use crate::format::{DisplayContext, DENSE_DATA_POINTS, NARROW_SCREEN_PX};

const VERY_DENSE_DATA_POINTS: usize = 100;
const VERY_DENSE_MAX_TICKS: u32 = 8;
const DENSE_MAX_TICKS: u32 = 12;
const NARROW_MAX_TICKS: u32 = 6;

/// Rule for a range outside the known set.
pub const DEFAULT_RULE: TickRule = rule(TimeTemplate::MonthDayHourMinute, 10);

const fn rule(template: TimeTemplate, max_ticks: u32) -> TickRule {
    TickRule {
        template,
        max_ticks,
    }
}

/// Unclamped rule for a mode and range.
pub fn base_rule(aggregate: AggregateMode, range: Option<RangeSpec>) -> TickRule {
    use AggregateMode::*;
    use RangeSpec::*;
    use TimeTemplate::*;

    let Some(range) = range else {
        return DEFAULT_RULE;
    };

    match (aggregate, range) {
        (Raw, OneHour) => rule(HourMinuteSecond, 12),
        (Raw, SixHours) => rule(HourMinute, 15),
        (Raw, TwelveHours) => rule(MonthDayHourMinute, 12),
        (Raw, Day) => rule(MonthDayHourMinute, 15),
        (Raw, ThreeDays) => rule(MonthDayHourMinute, 10),
        (Raw, Week) => rule(MonthDayHourMinute, 8),
        (Raw, Month) => rule(MonthDay, 10),

        (Hourly, OneHour | SixHours | TwelveHours) => rule(Hour, 12),
        (Hourly, Day) => rule(MonthDayHour, 12),
        (Hourly, ThreeDays) => rule(MonthDayHour, 10),
        (Hourly, Week) => rule(MonthDayHour, 8),
        (Hourly, Month) => rule(MonthDay, 10),

        (Daily, OneHour | SixHours | TwelveHours | Day) => rule(MonthDay, 1),
        (Daily, ThreeDays) => rule(MonthDay, 3),
        (Daily, Week) => rule(MonthDay, 7),
        (Daily, Month) => rule(MonthDay, 10),
    }
}

/// Plans the time axis for a series.
///
/// `range` is `None` when the requested range was not recognized, which
/// selects [`DEFAULT_RULE`] before clamping.
pub fn plan(
    aggregate: AggregateMode,
    range: Option<RangeSpec>,
    data_points: usize,
    screen_width: u32,
) -> TickRule {
    let mut rule = base_rule(aggregate, range);

    if data_points > VERY_DENSE_DATA_POINTS {
        rule.max_ticks = rule.max_ticks.min(VERY_DENSE_MAX_TICKS);
    } else if data_points > DENSE_DATA_POINTS {
        rule.max_ticks = rule.max_ticks.min(DENSE_MAX_TICKS);
    }

    if screen_width < NARROW_SCREEN_PX {
        rule.max_ticks = rule.max_ticks.min(NARROW_MAX_TICKS);
        rule.template = match rule.template {
            TimeTemplate::MonthDayHourMinute => TimeTemplate::MonthDayHourShort,
            TimeTemplate::MonthDayHour => TimeTemplate::MonthDay,
            other => other,
        };
    }

    rule
}

pub fn plan_for(ctx: &DisplayContext) -> TickRule {
    plan(
        ctx.aggregate,
        Some(ctx.range),
        ctx.data_points,
        ctx.screen_width,
    )
}
