use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
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
    linkup_shared::middleware::init_tracing("linkup-profile");
    let metrics_handle = linkup_shared::middleware::init_metrics()?;

    let config = AppConfig::load()?;
    let port = config.port;

    let db = db::create_pool(&config.database_url, config.db_pool_size)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;

    let state = Arc::new(AppState { db, config, rabbitmq, redis, metrics_handle });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/me", get(routes::profile::get_profile).post(routes::profile::create_profile))
        .route("/me/personal", put(routes::profile::update_personal))
        .route("/me/professional", put(routes::profile::update_professional))
        .route("/me/social", put(routes::profile::update_social))
        .route("/me/complete", post(routes::profile::complete_onboarding))
        .route("/profiles/:id", get(routes::profile::get_public_profile))
        // Service-to-service (service role token)
        .route("/internal/profiles/batch", post(routes::internal::batch_profiles))
        .layer(axum::middleware::from_fn(linkup_shared::middleware::metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "linkup-profile starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
