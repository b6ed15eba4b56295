mod auth;
mod config;
mod db;
mod error;
mod game;
mod models;
mod routes;
mod websocket;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use axum::{http::HeaderValue, routing::get, Router};
use config::Config;
use db::{MemoryStore, PgStore, ScoreboardStore};
use game::{QuestionDesk, ScoreboardModel};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use websocket::hub::Hub;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ScoreboardStore>,
    pub scoreboard: ScoreboardModel,
    pub questions: QuestionDesk,
    /// Connected sockets, for broadcasts
    pub hub: Hub,
    pub started_at: Instant,
}

impl AppState {
    pub async fn new(config: Config, store: Arc<dyn ScoreboardStore>) -> error::Result<Arc<Self>> {
        let scoreboard = ScoreboardModel::initialize(store.clone(), &config.game).await?;
        let questions = QuestionDesk::new(store.clone());

        Ok(Arc::new(AppState {
            config,
            store,
            scoreboard,
            questions,
            hub: Hub::new(),
            started_at: Instant::now(),
        }))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gameshow_scoreboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting game show scoreboard server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded ({:?})", config.server.environment);

    let store: Arc<dyn ScoreboardStore> = match config.database_url() {
        Some(url) => {
            let pool = db::create_pool(url, config.database.max_connections)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations completed");

            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Using in-memory store for now.");
            tracing::warn!("Scores and questions will be lost when the server stops");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(config.clone(), store).await?;
    let snapshot = state.scoreboard.snapshot().await;
    tracing::info!(
        "Scoreboard ready: {} contestants, round {}",
        snapshot.contestants.len(),
        snapshot.round
    );

    // Spawn background task to drop sockets whose writer has gone away
    let sweep_state = state.clone();
    tokio::spawn(async move {
        subscriber_sweep_task(sweep_state).await;
    });

    let app = build_router(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Admin console: http://{}/admin", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes and pages
        .merge(routes::create_routes(&static_dir))
        // Anything else is a static asset
        .fallback_service(ServeDir::new(&static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.server.allowed_origins)),
        )
        .with_state(state)
}

/// An empty list or `*` allows any origin
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// Background task that periodically removes closed subscribers from the hub
async fn subscriber_sweep_task(state: Arc<AppState>) {
    let period = Duration::from_secs(state.config.game.subscriber_sweep_secs.max(1));
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        let removed = state.hub.prune_closed();
        if removed > 0 {
            tracing::info!(
                "Removed {} closed subscribers ({} still connected)",
                removed,
                state.hub.len()
            );
        }
    }
}

/// Fresh state on the in-memory store with the test configuration
#[cfg(test)]
pub async fn test_state() -> Arc<AppState> {
    AppState::new(Config::for_tests(), Arc::new(MemoryStore::new()))
        .await
        .expect("test state should initialize")
}
