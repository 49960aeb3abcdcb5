use actix_web::{get, web, App, HttpResponse, HttpServer, Responder, Result};
use chrono::prelude::Utc;
use serde_json::json;

mod api;
mod config;
mod error;
mod models;
mod repository;

use crate::config::Config;
use crate::models::task::{HealthResponse, MessageResponse};
use crate::repository::database::Database;
use crate::repository::tasks::TaskRepository;

#[get("/health")]
async fn healthcheck() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Task API running",
        "health": "/health",
    }))
}

async fn not_found() -> Result<HttpResponse> {
    let response = MessageResponse {
        message: "Resource not found".to_string(),
    };
    Ok(HttpResponse::NotFound().json(response))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Config::from_env();
    let db = Database::open(&config.database_path).expect("Failed to open the task database.");
    db.init_schema()
        .expect("Failed to initialize the task schema.");
    log::info!(
        "database ready at {} (WAL mode)",
        config.database_path.display()
    );

    let repo = TaskRepository::new(db);
    let app_data = web::Data::new(repo);

    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .configure(api::tasks::config)
            .service(healthcheck)
            .service(index)
            .default_service(web::route().to(not_found))
            .wrap(actix_web::middleware::Logger::default())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_healthcheck() {
        let app = test::init_service(App::new().service(healthcheck)).await;
        let req = TestRequest::default().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, resp.status());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn test_index() {
        let app = test::init_service(App::new().service(index)).await;
        let req = TestRequest::default().to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, resp.status());
    }

    #[actix_web::test]
    async fn test_unmatched_route_is_404() {
        let app =
            test::init_service(App::new().default_service(web::route().to(not_found))).await;
        let req = TestRequest::default().uri("/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::NOT_FOUND, resp.status());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Resource not found");
    }
}
