//! HTTP and realtime application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, audit log, mutation engine and broadcast bus
//! - `broadcast.rs`: turns mutation outcomes into addressed realtime messages
//! - `routes/`: HTTP, SSE and WebSocket handlers
//! - `dto.rs`: client frames and response bodies
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::AppConfig;

pub mod broadcast;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, ServicesError};

/// Build the full router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, ServicesError> {
    let services = services::build_services(config).await?;
    Ok(router(services))
}

/// Router over already-built services; tests use this with in-memory wiring.
pub fn router(services: AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router().layer(Extension(services)))
        .layer(ServiceBuilder::new())
}
