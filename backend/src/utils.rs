use chrono::{Local, NaiveDateTime, TimeZone};

/// Storage layout of reading timestamps (local time, microseconds).
pub const STORED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub fn stored_timestamp(dt: NaiveDateTime) -> String {
    dt.format(STORED_TIMESTAMP_FORMAT).to_string()
}

/// Local wall-clock time of a ms-since-epoch instant.
pub fn local_from_millis(ms: u64) -> Option<NaiveDateTime> {
    let ms = i64::try_from(ms).ok()?;
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.naive_local())
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
