use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{
    error::ErrorInternalServerError,
    get,
    http::header,
    web::{self, Data},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use chrono::Local;
use log::error;

use crate::{
    config::Config,
    dashboard::{self, DashboardQuery, DashboardRequest},
    db::{Db, ReadingStore},
};

type SharedDb = web::Data<Arc<Mutex<Db>>>;

fn internal_error(e: anyhow::Error) -> actix_web::Error {
    error!("dashboard query failed: {e:#}");
    ErrorInternalServerError("database error")
}

fn lock(db: &SharedDb) -> actix_web::Result<std::sync::MutexGuard<'_, Db>> {
    db.lock()
        .map_err(|_| internal_error(anyhow::anyhow!("database lock poisoned")))
}

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("plant dashboard")
}

#[get("/api/dashboard")]
async fn api_dashboard(req: HttpRequest, db: SharedDb) -> actix_web::Result<impl Responder> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();
    let request = DashboardRequest::from_query(&DashboardQuery::from_pairs(pairs));
    let mut db = lock(&db)?;
    let payload = dashboard::build_payload(&mut *db, &request, Local::now().naive_local())
        .map_err(internal_error)?;
    Ok(web::Json(payload))
}

#[get("/api/locations")]
async fn api_locations(db: SharedDb) -> actix_web::Result<impl Responder> {
    let mut db = lock(&db)?;
    let res = db.locations().map_err(internal_error)?;
    Ok(web::Json(res))
}

#[get("/api/format-test")]
async fn api_format_test() -> impl Responder {
    web::Json(dashboard::format_samples())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .service(api_dashboard)
        .service(api_locations)
        .service(api_format_test);
}

pub async fn new_http_server(db: Arc<Mutex<Db>>, config: &Config) -> std::io::Result<()> {
    let origin = config.cors_origin.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db.clone()))
            .configure(configure)
            .wrap(
                Cors::default()
                    .allowed_origin(&origin)
                    .allowed_methods(vec!["GET"])
                    .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT])
                    .allowed_header(header::CONTENT_TYPE)
                    .max_age(3600),
            )
    })
    .bind(config.http_bind)?
    .run()
    .await
}
