use std::{env, net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub http_bind: SocketAddr,
    pub ingest_bind: SocketAddr,
    pub cors_origin: String,
    pub moisture_alert_threshold: f64, // percent
}

impl Config {
    /// Reads the environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        Ok(Self {
            database_url,
            http_bind: parse_or(&lookup, "HTTP_BIND", "0.0.0.0:8080")?,
            ingest_bind: parse_or(&lookup, "INGEST_BIND", "0.0.0.0:8989")?,
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "http://127.0.0.1:8080".into()),
            moisture_alert_threshold: parse_or(&lookup, "MOISTURE_ALERT_THRESHOLD", "30.0")?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_owned());
    raw.parse::<T>()
        .with_context(|| format!("invalid {key}: {raw:?}"))
}
