use crate::query::QuerySpec;
use crate::schema::*;
use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use diesel::sqlite::SqliteConnection;

/// Known location set when no reading carries one.
pub const DEFAULT_LOCATION: &str = "default";

const CREATE_SENSOR_DATA: &str = "CREATE TABLE IF NOT EXISTS sensor_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    timestamp TEXT NOT NULL,
    temperature REAL,
    humidity REAL,
    soil_moisture REAL,
    sensor_location TEXT
)";

const CREATE_TIMESTAMP_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS sensor_data_timestamp ON sensor_data (timestamp)";

#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name=sensor_data)]
pub struct NewReading {
    pub timestamp: String,          // local, see utils::STORED_TIMESTAMP_FORMAT
    pub temperature: Option<f64>,   // °C
    pub humidity: Option<f64>,      // percent
    pub soil_moisture: Option<f64>, // percent
    pub sensor_location: Option<String>,
}

/// One row of a (possibly aggregated) series query.
#[derive(Debug, Clone, PartialEq, QueryableByName)]
pub struct SeriesRow {
    #[diesel(sql_type = Text)]
    pub ts: String,
    #[diesel(sql_type = Nullable<Double>)]
    pub temperature: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub humidity: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub soil_moisture: Option<f64>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryableByName)]
pub struct StatsRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_temperature: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub min_temperature: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub max_temperature: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_humidity: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub min_humidity: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub max_humidity: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub avg_soil_moisture: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub min_soil_moisture: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub max_soil_moisture: Option<f64>,
}

/// Read side of the readings table, as seen by the dashboard.
pub trait ReadingStore {
    /// Distinct recorded locations, or `[DEFAULT_LOCATION]` if there are none.
    fn locations(&mut self) -> Result<Vec<String>>;

    fn series(&mut self, spec: &QuerySpec) -> Result<Vec<SeriesRow>>;

    fn statistics(&mut self, spec: &QuerySpec) -> Result<StatsRow>;
}

pub struct Db {
    conn: SqliteConnection,
}

impl Db {
    pub fn connect(database_url: &str) -> Result<Self> {
        let mut conn = SqliteConnection::establish(database_url)
            .with_context(|| format!("cannot open database {database_url}"))?;

        diesel::sql_query(CREATE_SENSOR_DATA).execute(&mut conn)?;
        diesel::sql_query(CREATE_TIMESTAMP_INDEX).execute(&mut conn)?;

        Ok(Self { conn })
    }

    pub fn insert_reading(&mut self, reading: &NewReading) -> Result<()> {
        diesel::insert_into(sensor_data::table)
            .values(reading)
            .execute(&mut self.conn)?;

        Ok(())
    }
}

impl ReadingStore for Db {
    fn locations(&mut self) -> Result<Vec<String>> {
        use crate::schema::sensor_data::dsl::*;
        let mut res: Vec<String> = sensor_data
            .select(sensor_location)
            .filter(sensor_location.is_not_null())
            .distinct()
            .order(sensor_location.asc())
            .load::<Option<String>>(&mut self.conn)?
            .into_iter()
            .flatten()
            .collect();

        if res.is_empty() {
            res.push(DEFAULT_LOCATION.to_owned());
        }

        Ok(res)
    }

    fn series(&mut self, spec: &QuerySpec) -> Result<Vec<SeriesRow>> {
        let query = diesel::sql_query(spec.series_sql()).bind::<Text, _>(spec.since_param());
        let res = match &spec.location {
            Some(location) => query
                .bind::<Text, _>(location.clone())
                .load::<SeriesRow>(&mut self.conn)?,
            None => query.load::<SeriesRow>(&mut self.conn)?,
        };

        Ok(res)
    }

    fn statistics(&mut self, spec: &QuerySpec) -> Result<StatsRow> {
        let query = diesel::sql_query(spec.statistics_sql()).bind::<Text, _>(spec.since_param());
        let res = match &spec.location {
            Some(location) => query
                .bind::<Text, _>(location.clone())
                .get_result::<StatsRow>(&mut self.conn)?,
            None => query.get_result::<StatsRow>(&mut self.conn)?,
        };

        Ok(res)
    }
}
