//! Health & supplements log: daily entry form plus trend dashboard, served
//! as a JSON API over a `health_logs` table.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod extract;
pub mod form;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod store;
pub mod trends;

use config::Config;
use store::LogStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LogStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn LogStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/options", get(handlers::options::get_options))
        .route(
            "/api/entries",
            get(handlers::entries::list_entries).post(handlers::entries::create_entry),
        )
        .route("/api/trends", get(handlers::trends::get_trends));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
