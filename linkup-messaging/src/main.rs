use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use socketioxide::SocketIo;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod routes;
mod schema;
mod services;
mod socket;

use config::AppConfig;
use linkup_shared::clients::db::{self, DbPool};
use linkup_shared::clients::rabbitmq::RabbitMQClient;
use linkup_shared::clients::redis::RedisClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: RedisClient,
    pub io: SocketIo,
    pub http_client: reqwest::Client,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    linkup_shared::middleware::init_tracing("linkup-messaging");
    let metrics_handle = linkup_shared::middleware::init_metrics()?;

    let config = AppConfig::load()?;
    let port = config.port;

    let db = db::create_pool(&config.database_url, config.db_pool_size)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let redis = RedisClient::connect(&config.redis_url).await?;

    // REST handlers and the subscriber emit through `io`
    let (sio_layer, io) = SocketIo::builder().build_layer();

    let http_client = reqwest::Client::new();
    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        redis,
        io: io.clone(),
        http_client,
        metrics_handle,
    });

    io.ns("/", {
        let state = state.clone();
        move |socket: socketioxide::extract::SocketRef| {
            let state = state.clone();
            async move {
                socket::handlers::on_connect_with_state(socket, state).await;
            }
        }
    });

    let sub_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = events::subscriber::listen_matching_events(sub_state).await {
            tracing::error!(error = %e, "matching events subscriber failed");
        }
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Conversations
        .route("/conversations", get(routes::conversations::list_conversations))
        .route("/conversations/:id/messages", get(routes::messages::list_messages))
        .route("/conversations/:id/read", post(routes::messages::mark_as_read))
        // Messages
        .route("/matches/:match_id/messages", post(routes::messages::send_message))
        .route("/unread-count", get(routes::messages::get_unread_count))
        .layer(axum::middleware::from_fn(linkup_shared::middleware::metrics_middleware))
        .layer(sio_layer)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "linkup-messaging starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
