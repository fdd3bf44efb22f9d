use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod routes;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;
use db::{JournalStore, MemoryJournalStore, PgJournalStore};
use services::mood_image::MoodImageLookup;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JournalStore>,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
    pub mood_images: Arc<dyn MoodImageLookup>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodjournal_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let store: Arc<dyn JournalStore> = match &config.database_url {
        Some(url) => {
            let store = PgJournalStore::connect(url)
                .await
                .expect("Failed to open journal database");
            tracing::info!("Database migrations applied");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, journal data is kept in memory only");
            Arc::new(MemoryJournalStore::new())
        }
    };

    let rate_limiter =
        RateLimitState::new(config.rate_limit_max_requests, config.rate_limit_window_secs);
    auth::rate_limit::spawn_cleanup_worker(rate_limiter.clone());

    let state = AppState {
        store,
        config: config.clone(),
        rate_limiter,
        mood_images: services::mood_image::from_config(&config),
    };

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .expect("FRONTEND_URL must be a valid header value")];
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
