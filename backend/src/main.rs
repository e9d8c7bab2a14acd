use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::info;
use tokio::net::UdpSocket;

mod alert;
mod api;
mod config;
mod dashboard;
mod db;
mod format;
mod ingest;
mod query;
mod schema;
mod ticks;
mod utils;

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::Config::from_env()?;
    info!("starting with {config:?}");

    let sock = UdpSocket::bind(config.ingest_bind)
        .await
        .with_context(|| format!("cannot bind ingest socket {}", config.ingest_bind))?;

    let db = Arc::new(Mutex::new(db::Db::connect(&config.database_url)?));
    let web_db = db.clone();

    let alert: Arc<dyn alert::Alert> = Arc::new(alert::LogAlert);
    let task = actix_web::rt::spawn(ingest::listen(
        sock,
        db,
        alert,
        config.moisture_alert_threshold,
    ));

    let (http, _) = tokio::join!(api::new_http_server(web_db, &config), task);
    http.context("http server failed")?;

    Ok(())
}
