//! Maps a requested range, aggregation and location onto the SQL run
//! against `sensor_data`.

use chrono::{Duration, NaiveDateTime};
use common::req::{AggregateMode, RangeSpec};

/// Location wildcard, no filter.
pub const ALL_LOCATIONS: &str = "all";
/// Text layout of the lookback cutoff, comparable with stored timestamps.
pub const CUTOFF_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub aggregate: AggregateMode,
    pub since: NaiveDateTime,
    pub location: Option<String>,
}

impl QuerySpec {
    /// First bind parameter of both queries.
    pub fn since_param(&self) -> String {
        self.since.format(CUTOFF_FORMAT).to_string()
    }

    fn predicate(&self) -> &'static str {
        if self.location.is_some() {
            "timestamp >= ? AND sensor_location = ?"
        } else {
            "timestamp >= ?"
        }
    }

    /// Series rows `(ts, temperature, humidity, soil_moisture)` in time order.
    pub fn series_sql(&self) -> String {
        let predicate = self.predicate();
        match self.aggregate {
            AggregateMode::Raw => format!(
                "SELECT timestamp AS ts, temperature, humidity, soil_moisture \
                 FROM sensor_data WHERE {predicate} ORDER BY timestamp ASC"
            ),
            AggregateMode::Hourly => bucketed_sql("%Y-%m-%d %H:00:00", "%Y-%m-%d %H", predicate),
            AggregateMode::Daily => bucketed_sql("%Y-%m-%d 00:00:00", "%Y-%m-%d", predicate),
        }
    }

    /// Count and avg/min/max per metric over the un-aggregated window.
    pub fn statistics_sql(&self) -> String {
        let predicate = self.predicate();
        format!(
            "SELECT COUNT(*) AS count, \
             AVG(temperature) AS avg_temperature, \
             MIN(temperature) AS min_temperature, \
             MAX(temperature) AS max_temperature, \
             AVG(humidity) AS avg_humidity, \
             MIN(humidity) AS min_humidity, \
             MAX(humidity) AS max_humidity, \
             AVG(soil_moisture) AS avg_soil_moisture, \
             MIN(soil_moisture) AS min_soil_moisture, \
             MAX(soil_moisture) AS max_soil_moisture \
             FROM sensor_data WHERE {predicate}"
        )
    }
}

fn bucketed_sql(label: &str, group: &str, predicate: &str) -> String {
    format!(
        "SELECT strftime('{label}', timestamp) AS ts, \
         AVG(temperature) AS temperature, \
         AVG(humidity) AS humidity, \
         AVG(soil_moisture) AS soil_moisture \
         FROM sensor_data WHERE {predicate} \
         GROUP BY strftime('{group}', timestamp) \
         ORDER BY ts ASC"
    )
}

/// Location filter to apply, `None` for the wildcard and for locations
/// outside the known set.
pub fn resolve_location(location: &str, known: &[String]) -> Option<String> {
    if location != ALL_LOCATIONS && known.iter().any(|l| l == location) {
        Some(location.to_owned())
    } else {
        None
    }
}

/// Query for `range` ending at the local time `now`.
pub fn select_query_at(
    range: RangeSpec,
    aggregate: AggregateMode,
    location: &str,
    known: &[String],
    now: NaiveDateTime,
) -> QuerySpec {
    QuerySpec {
        aggregate,
        since: now - Duration::hours(range.lookback_hours()),
        location: resolve_location(location, known),
    }
}
