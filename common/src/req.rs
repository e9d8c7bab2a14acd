// keep in sync with the dashboard frontend
use serde::{Deserialize, Serialize};

/// Lookback window of a dashboard query, relative to "now".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeSpec {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl RangeSpec {
    pub const ALL: [RangeSpec; 7] = [
        RangeSpec::OneHour,
        RangeSpec::SixHours,
        RangeSpec::TwelveHours,
        RangeSpec::Day,
        RangeSpec::ThreeDays,
        RangeSpec::Week,
        RangeSpec::Month,
    ];

    /// Strict parse of a query parameter, `None` if unrecognized.
    pub fn parse(param: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == param)
    }

    /// Lenient parse, unrecognized values fall back to `24h`.
    pub fn from_param(param: &str) -> Self {
        Self::parse(param).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeSpec::OneHour => "1h",
            RangeSpec::SixHours => "6h",
            RangeSpec::TwelveHours => "12h",
            RangeSpec::Day => "24h",
            RangeSpec::ThreeDays => "3d",
            RangeSpec::Week => "7d",
            RangeSpec::Month => "30d",
        }
    }

    pub fn lookback_hours(&self) -> i64 {
        match self {
            RangeSpec::OneHour => 1,
            RangeSpec::SixHours => 6,
            RangeSpec::TwelveHours => 12,
            RangeSpec::Day => 24,
            RangeSpec::ThreeDays => 24 * 3,
            RangeSpec::Week => 24 * 7,
            RangeSpec::Month => 24 * 30,
        }
    }

    /// `1h` and `6h`, the ranges labelled by time of day only.
    pub fn is_short(&self) -> bool {
        matches!(self, RangeSpec::OneHour | RangeSpec::SixHours)
    }
}

/// Granularity of the rows returned for a dashboard query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateMode {
    #[default]
    Raw,
    Hourly,
    Daily,
}

impl AggregateMode {
    pub const ALL: [AggregateMode; 3] = [
        AggregateMode::Raw,
        AggregateMode::Hourly,
        AggregateMode::Daily,
    ];

    pub fn parse(param: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == param)
    }

    /// Lenient parse, unrecognized values fall back to `raw`.
    pub fn from_param(param: &str) -> Self {
        Self::parse(param).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateMode::Raw => "raw",
            AggregateMode::Hourly => "hourly",
            AggregateMode::Daily => "daily",
        }
    }
}

/// Label template for timestamps, serialized as its strftime pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeTemplate {
    #[serde(rename = "%H:%M:%S")]
    HourMinuteSecond,
    #[serde(rename = "%H:%M")]
    HourMinute,
    #[serde(rename = "%H:00")]
    Hour,
    #[serde(rename = "%m-%d %H:%M")]
    MonthDayHourMinute,
    #[serde(rename = "%m-%d %H")]
    MonthDayHourShort,
    #[serde(rename = "%m-%d %H:00")]
    MonthDayHour,
    #[serde(rename = "%m-%d")]
    MonthDay,
}

impl TimeTemplate {
    pub fn pattern(&self) -> &'static str {
        match self {
            TimeTemplate::HourMinuteSecond => "%H:%M:%S",
            TimeTemplate::HourMinute => "%H:%M",
            TimeTemplate::Hour => "%H:00",
            TimeTemplate::MonthDayHourMinute => "%m-%d %H:%M",
            TimeTemplate::MonthDayHourShort => "%m-%d %H",
            TimeTemplate::MonthDayHour => "%m-%d %H:00",
            TimeTemplate::MonthDay => "%m-%d",
        }
    }
}

/// Axis label template and tick budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickRule {
    pub template: TimeTemplate,
    pub max_ticks: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub count: i64,
    pub temperature: MetricStats,
    pub humidity: MetricStats,
    pub soil_moisture: MetricStats,
}

impl Statistics {
    /// Statistics block reported when the window holds no readings.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMeta {
    pub range: RangeSpec,
    pub aggregate: AggregateMode,
    pub location: String,
    pub data_count: usize,
    pub screen_width: u32,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub timestamps: Vec<String>,
    pub raw_timestamps: Vec<String>,
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub soil_moisture: Vec<Option<f64>>,
    pub tick_rule: TickRule,
    pub statistics: Statistics,
    pub metadata: DashboardMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSample {
    pub formatted: String,
    pub rule: TickRule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_fallback() {
        assert_eq!(RangeSpec::parse("bogus"), None);
        assert_eq!(RangeSpec::from_param("bogus"), RangeSpec::Day);
        assert_eq!(RangeSpec::from_param("7d"), RangeSpec::Week);
        assert!(RangeSpec::SixHours.is_short());
        assert!(!RangeSpec::TwelveHours.is_short());
    }

    #[test]
    fn aggregate_fallback() {
        assert_eq!(AggregateMode::from_param(""), AggregateMode::Raw);
        assert_eq!(AggregateMode::from_param("daily"), AggregateMode::Daily);
    }

    #[test]
    fn serde_names_match_params() {
        for range in RangeSpec::ALL {
            let json = serde_json::to_string(&range).unwrap();
            assert_eq!(json, format!("\"{}\"", range.as_str()));
        }
        for mode in AggregateMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn tick_rule_wire_shape() {
        let rule = TickRule {
            template: TimeTemplate::MonthDayHourMinute,
            max_ticks: 15,
        };
        let json = serde_json::to_value(rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "template": "%m-%d %H:%M", "maxTicks": 15 })
        );
    }

    #[test]
    fn empty_statistics_are_zero() {
        let stats = Statistics::empty();
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["count"], 0);
        assert_eq!(json["soilMoisture"]["avg"], 0.0);
        assert_eq!(json["temperature"]["max"], 0.0);
    }
}
