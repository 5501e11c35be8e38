use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};
use std::sync::Arc;

mod comment;
mod database;
mod middleware;
mod post;
mod router;
mod utils;

use comment::repository::MongoCommentRepository;
use comment::service::CommentService;
use database::RedisService;
use middleware::error_handler::handle_error;
use middleware::not_found::not_found;
use post::post_repository::MongoPostRepository;
use post::post_service::PostService;
use router::index::routes;
use serde_json::json;
use utils::config::AppConfig;

#[get("/")]
async fn default(config: web::Data<AppConfig>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Welcome to the comments service",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": config.service_name,
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    info!("Starting server on http://{}:{}", config.host, config.port);

    let mongo_client = database::connect_to_mongo(&config)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to MongoDB: {}", e)))?;

    let comments = Arc::new(MongoCommentRepository::new(
        &mongo_client,
        &config.database_name,
    ));
    let posts = Arc::new(MongoPostRepository::new(&mongo_client, &config.database_name));
    let comment_service = web::Data::new(CommentService::new(comments.clone(), posts.clone()));
    let post_service = web::Data::new(PostService::new(posts, comments));

    let redis_service = match config.redis_url.as_deref() {
        Some(url) => match RedisService::connect(url).await {
            Ok(service) => Some(web::Data::new(service)),
            Err(e) => {
                warn!("{}; sessions will not be checked", e);
                None
            }
        },
        None => None,
    };

    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(comment_service.clone())
            .app_data(post_service.clone());
        if let Some(redis_service) = &redis_service {
            app = app.app_data(redis_service.clone());
        }
        app.configure(routes)
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .service(default)
    })
    .bind(bind)?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
