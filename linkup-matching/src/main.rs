use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod matching;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use linkup_shared::clients::db::{self, DbPool};
use linkup_shared::clients::rabbitmq::RabbitMQClient;
use linkup_shared::clients::redis::RedisClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: RedisClient,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    linkup_shared::middleware::init_tracing("linkup-matching");
    let metrics_handle = linkup_shared::middleware::init_metrics()?;

    let config = AppConfig::load()?;
    let port = config.port;

    let db = db::create_pool(&config.database_url, config.db_pool_size)?;

    // Infrastructure clients
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        redis,
        metrics_handle,
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Discovery feed
        .route("/feed", get(routes::feed::get_feed))
        .route("/feed/refresh", post(routes::feed::refresh_feed))
        // Swipes
        .route("/actions", post(routes::actions::swipe))
        // Likes inbox
        .route("/likes/incoming", get(routes::likes::incoming))
        .route("/likes/:user_id/accept", post(routes::likes::accept))
        .route("/likes/:user_id/ignore", post(routes::likes::ignore))
        // Matches
        .route("/matches", get(routes::matches::list))
        .route("/matches/with/:user_id", get(routes::matches::relationship))
        .route(
            "/matches/:id",
            get(routes::matches::get).delete(routes::matches::unmatch),
        )
        .layer(axum::middleware::from_fn(
            linkup_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "linkup-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
