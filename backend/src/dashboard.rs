//! Assembles the dashboard payload: query, label formatting, tick planning
//! and window statistics.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDateTime;
use common::req::{
    AggregateMode, DashboardMeta, DashboardResponse, FormatSample, MetricStats, RangeSpec,
    Statistics,
};
use log::debug;

use crate::{
    db::{ReadingStore, StatsRow},
    format::{format_timestamp, DisplayContext},
    query::{select_query_at, ALL_LOCATIONS},
    ticks, utils,
};

pub const DEFAULT_SCREEN_WIDTH: u32 = 1200;

const FORMAT_SAMPLE_TIMESTAMP: &str = "2025-06-18 13:33:49.265477";
const FORMAT_SAMPLE_POINTS: usize = 50;
const FORMAT_SAMPLE_WIDTHS: [u32; 5] = [375, 768, 1024, 1200, 1920];

/// Query string of a dashboard request, as sent by the browser.
#[derive(Debug, Default, Clone)]
pub struct DashboardQuery {
    pub range: Option<String>,
    pub aggregate: Option<String>,
    pub location: Option<String>,
    pub width: Option<String>,
}

impl DashboardQuery {
    /// First value wins for repeated keys; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "range" => &mut query.range,
                "aggregate" => &mut query.aggregate,
                "location" => &mut query.location,
                "width" => &mut query.width,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    /// `None` if the client sent a range outside the known set.
    pub requested_range: Option<RangeSpec>,
    pub range: RangeSpec,
    pub aggregate: AggregateMode,
    pub location: String,
    pub screen_width: u32,
}

fn non_empty(param: &Option<String>) -> Option<&str> {
    param.as_deref().map(str::trim).filter(|p| !p.is_empty())
}

impl DashboardRequest {
    pub fn from_query(query: &DashboardQuery) -> Self {
        let requested_range = match non_empty(&query.range) {
            Some(range) => RangeSpec::parse(range),
            None => Some(RangeSpec::default()),
        };

        Self {
            requested_range,
            range: requested_range.unwrap_or_default(),
            aggregate: non_empty(&query.aggregate)
                .map(AggregateMode::from_param)
                .unwrap_or_default(),
            location: non_empty(&query.location)
                .unwrap_or(ALL_LOCATIONS)
                .to_owned(),
            screen_width: non_empty(&query.width)
                .and_then(|w| w.parse::<u32>().ok())
                .filter(|w| *w > 0)
                .unwrap_or(DEFAULT_SCREEN_WIDTH),
        }
    }
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self::from_query(&DashboardQuery::default())
    }
}

pub fn build_payload<S>(
    store: &mut S,
    request: &DashboardRequest,
    now: NaiveDateTime,
) -> Result<DashboardResponse>
where
    S: ReadingStore + ?Sized,
{
    debug!("dashboard request {request:?}");

    let locations = store.locations()?;
    let spec = select_query_at(
        request.range,
        request.aggregate,
        &request.location,
        &locations,
        now,
    );
    let rows = store.series(&spec)?;

    let ctx = DisplayContext {
        aggregate: request.aggregate,
        range: request.range,
        data_points: rows.len(),
        screen_width: request.screen_width,
    };
    let tick_rule = ticks::plan(
        request.aggregate,
        request.requested_range,
        rows.len(),
        request.screen_width,
    );

    // averaged buckets are shown with one decimal
    let value = |v: Option<f64>| match request.aggregate {
        AggregateMode::Raw => v,
        AggregateMode::Hourly | AggregateMode::Daily => v.map(utils::round1),
    };

    let statistics = statistics_from_row(&store.statistics(&spec)?);

    Ok(DashboardResponse {
        timestamps: rows.iter().map(|r| format_timestamp(&r.ts, &ctx)).collect(),
        raw_timestamps: rows.iter().map(|r| r.ts.clone()).collect(),
        temperature: rows.iter().map(|r| value(r.temperature)).collect(),
        humidity: rows.iter().map(|r| value(r.humidity)).collect(),
        soil_moisture: rows.iter().map(|r| value(r.soil_moisture)).collect(),
        tick_rule,
        statistics,
        metadata: DashboardMeta {
            range: request.range,
            aggregate: request.aggregate,
            location: spec.location.unwrap_or_else(|| ALL_LOCATIONS.to_owned()),
            data_count: rows.len(),
            screen_width: request.screen_width,
            locations,
        },
    })
}

fn metric(avg: Option<f64>, min: Option<f64>, max: Option<f64>) -> MetricStats {
    let shown = |v: Option<f64>| v.map_or(0.0, utils::round1);
    MetricStats {
        avg: shown(avg),
        min: shown(min),
        max: shown(max),
    }
}

pub fn statistics_from_row(row: &StatsRow) -> Statistics {
    if row.count == 0 {
        return Statistics::empty();
    }

    Statistics {
        count: row.count,
        temperature: metric(row.avg_temperature, row.min_temperature, row.max_temperature),
        humidity: metric(row.avg_humidity, row.min_humidity, row.max_humidity),
        soil_moisture: metric(
            row.avg_soil_moisture,
            row.min_soil_moisture,
            row.max_soil_moisture,
        ),
    }
}

/// Label and tick rule of a fixed sample for every range, aggregate and
/// reference width, keyed `{range}_{aggregate}_{width}px`.
pub fn format_samples() -> BTreeMap<String, FormatSample> {
    let mut samples = BTreeMap::new();
    for range in RangeSpec::ALL {
        for aggregate in AggregateMode::ALL {
            for screen_width in FORMAT_SAMPLE_WIDTHS {
                let ctx = DisplayContext {
                    aggregate,
                    range,
                    data_points: FORMAT_SAMPLE_POINTS,
                    screen_width,
                };
                samples.insert(
                    format!("{}_{}_{}px", range.as_str(), aggregate.as_str(), screen_width),
                    FormatSample {
                        formatted: format_timestamp(FORMAT_SAMPLE_TIMESTAMP, &ctx),
                        rule: ticks::plan_for(&ctx),
                    },
                );
            }
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{tests::seeded_db, tests::now, SeriesRow};
    use crate::query::QuerySpec;
    use crate::ticks::DEFAULT_RULE;
    use common::req::TimeTemplate;

    fn query(range: &str, aggregate: &str, location: &str, width: &str) -> DashboardRequest {
        DashboardRequest::from_query(&DashboardQuery {
            range: Some(range.to_string()),
            aggregate: Some(aggregate.to_string()),
            location: Some(location.to_string()),
            width: Some(width.to_string()),
        })
    }

    /// Store returning canned rows and recording the last query.
    #[derive(Default)]
    struct Canned {
        rows: Vec<SeriesRow>,
        stats: StatsRow,
        last: Option<QuerySpec>,
    }

    impl ReadingStore for Canned {
        fn locations(&mut self) -> Result<Vec<String>> {
            Ok(vec!["ohana_001".to_string()])
        }

        fn series(&mut self, spec: &QuerySpec) -> Result<Vec<SeriesRow>> {
            self.last = Some(spec.clone());
            Ok(self.rows.clone())
        }

        fn statistics(&mut self, _spec: &QuerySpec) -> Result<StatsRow> {
            Ok(self.stats.clone())
        }
    }

    #[test]
    fn request_defaults() {
        let req = DashboardRequest::default();
        assert_eq!(req.requested_range, Some(RangeSpec::Day));
        assert_eq!(req.range, RangeSpec::Day);
        assert_eq!(req.aggregate, AggregateMode::Raw);
        assert_eq!(req.location, "all");
        assert_eq!(req.screen_width, 1200);
    }

    #[test]
    fn malformed_params_degrade() {
        let req = query("bogus", "weekly", "", "wide");
        assert_eq!(req.requested_range, None);
        assert_eq!(req.range, RangeSpec::Day);
        assert_eq!(req.aggregate, AggregateMode::Raw);
        assert_eq!(req.location, "all");
        assert_eq!(req.screen_width, 1200);

        assert_eq!(query("1h", "raw", "all", "0").screen_width, 1200);
        assert_eq!(query("1h", "raw", "all", "375").screen_width, 375);
    }

    #[test]
    fn repeated_params_keep_first_value() {
        let pairs = [
            ("range", "1h"),
            ("width", "375"),
            ("range", "6h"),
            ("theme", "dark"),
            ("width", "1200"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let req = DashboardRequest::from_query(&DashboardQuery::from_pairs(pairs));
        assert_eq!(req.range, RangeSpec::OneHour);
        assert_eq!(req.screen_width, 375);
        assert_eq!(req.aggregate, AggregateMode::Raw);
        assert_eq!(req.location, "all");
    }

    #[test]
    fn empty_window_yields_zero_statistics() {
        let mut store = Canned::default();
        let payload = build_payload(&mut store, &query("1h", "hourly", "all", "1200"), now()).unwrap();

        assert!(payload.timestamps.is_empty());
        assert!(payload.temperature.is_empty());
        assert_eq!(payload.statistics, Statistics::empty());
        assert_eq!(payload.tick_rule.template, TimeTemplate::Hour);
        assert_eq!(payload.tick_rule.max_ticks, 12);
        assert_eq!(payload.metadata.data_count, 0);
    }

    #[test]
    fn zero_count_ignores_stray_aggregates() {
        let stats = StatsRow {
            count: 0,
            avg_temperature: Some(f64::NAN),
            ..StatsRow::default()
        };
        assert_eq!(statistics_from_row(&stats), Statistics::empty());
    }

    #[test]
    fn null_metrics_in_statistics_read_as_zero() {
        let stats = StatsRow {
            count: 3,
            avg_temperature: Some(21.349),
            min_temperature: Some(20.0),
            max_temperature: Some(22.96),
            ..StatsRow::default()
        };
        let stats = statistics_from_row(&stats);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.temperature.avg, 21.3);
        assert_eq!(stats.temperature.max, 23.0);
        assert_eq!(stats.humidity, MetricStats::default());
    }

    #[test]
    fn aggregated_values_are_rounded_and_nulls_kept() {
        let mut store = Canned {
            rows: vec![
                SeriesRow {
                    ts: "2025-06-18 12:00:00".to_string(),
                    temperature: Some(20.46),
                    humidity: None,
                    soil_moisture: Some(0.0),
                },
                SeriesRow {
                    ts: "2025-06-18 13:00:00".to_string(),
                    temperature: Some(21.04),
                    humidity: Some(60.25),
                    soil_moisture: Some(33.333),
                },
            ],
            ..Canned::default()
        };
        let payload = build_payload(&mut store, &query("24h", "hourly", "all", "1200"), now()).unwrap();

        assert_eq!(payload.timestamps, vec!["06-18 12:00", "06-18 13:00"]);
        assert_eq!(payload.temperature, vec![Some(20.5), Some(21.0)]);
        assert_eq!(payload.humidity, vec![None, Some(60.3)]);
        assert_eq!(payload.soil_moisture, vec![Some(0.0), Some(33.3)]);
        assert_eq!(payload.tick_rule.template, TimeTemplate::MonthDayHour);
    }

    #[test]
    fn raw_values_pass_through() {
        let mut store = Canned {
            rows: vec![SeriesRow {
                ts: "2025-06-18 13:33:49.265477".to_string(),
                temperature: Some(20.46),
                humidity: Some(55.55),
                soil_moisture: None,
            }],
            ..Canned::default()
        };
        let payload = build_payload(&mut store, &query("1h", "raw", "all", "1200"), now()).unwrap();
        assert_eq!(payload.timestamps, vec!["13:33:49"]);
        assert_eq!(payload.raw_timestamps, vec!["2025-06-18 13:33:49.265477"]);
        assert_eq!(payload.temperature, vec![Some(20.46)]);
        assert_eq!(payload.soil_moisture, vec![None]);
    }

    #[test]
    fn unknown_range_queries_a_day_with_default_ticks() {
        let mut store = Canned::default();
        build_payload(&mut store, &query("24h", "raw", "all", "1200"), now()).unwrap();
        let day = store.last.take();

        let payload = build_payload(&mut store, &query("bogus", "raw", "all", "1200"), now()).unwrap();
        assert_eq!(store.last, day);
        assert_eq!(payload.tick_rule, DEFAULT_RULE);
        assert_eq!(payload.metadata.range, RangeSpec::Day);
    }

    #[test]
    fn unknown_location_reads_everything() {
        let mut store = Canned::default();
        let payload = build_payload(&mut store, &query("24h", "raw", "attic", "1200"), now()).unwrap();
        assert_eq!(store.last.unwrap().location, None);
        assert_eq!(payload.metadata.location, "all");

        let mut store = Canned::default();
        let payload = build_payload(&mut store, &query("24h", "raw", "ohana_001", "1200"), now()).unwrap();
        assert_eq!(store.last.unwrap().location, Some("ohana_001".to_string()));
        assert_eq!(payload.metadata.location, "ohana_001");
    }

    #[test]
    fn payload_from_sqlite_store() {
        let mut db = seeded_db();
        let payload = build_payload(&mut db, &query("6h", "raw", "all", "375"), now()).unwrap();

        assert_eq!(payload.timestamps, vec!["12:05", "12:35", "13:20"]);
        assert_eq!(payload.statistics.count, 3);
        assert_eq!(payload.statistics.temperature.min, 20.0);
        assert_eq!(payload.statistics.temperature.max, 24.0);
        assert_eq!(payload.statistics.temperature.avg, 21.7);
        assert_eq!(payload.tick_rule.template, TimeTemplate::HourMinute);
        assert_eq!(payload.tick_rule.max_ticks, 6);
        assert_eq!(payload.metadata.locations, vec!["balcony", "ohana_001"]);
    }

    #[test]
    fn format_samples_cover_every_combination() {
        let samples = format_samples();
        assert_eq!(samples.len(), 7 * 3 * 5);

        let sample = &samples["1h_raw_1200px"];
        assert_eq!(sample.formatted, "13:33:49");
        assert_eq!(sample.rule.template, TimeTemplate::HourMinuteSecond);

        let sample = &samples["24h_hourly_375px"];
        assert_eq!(sample.formatted, "06-18");
        assert_eq!(sample.rule.template, TimeTemplate::MonthDay);
        assert_eq!(sample.rule.max_ticks, 6);
    }
}
