//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements a thin REST API, using Axum, over the single in-process matching engine.
// All mutation goes through one `tokio::sync::Mutex<MatchingEngine>` — the engine itself holds no
// internal lock, so this is the single point of serialized access the spec requires.
//
// | Component      | Description                                                |
// |----------------|-----------------------------------------------------------|
// | Api            | Binds an address and serves the router                     |
// | AppState       | Shared application state (the locked engine)                |
// | Routes         | Handler functions for API endpoints                        |
// | DTOs           | Data transfer objects for API requests/responses           |
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name           | Description                                       | Key Methods       |
// |----------------|---------------------------------------------------|------------------|
// | AppState       | Shared application state                         | new               |
// | Api            | Main API structure                               | serve             |
//--------------------------------------------------------------------------------------------------

mod dto;
mod error;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Extension, Router,
};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::domain::services::matching_engine::MatchingEngine;

pub use dto::*;
pub use error::{ApiError, ApiResult};

/// Shared application state accessible by all handlers: the one matching engine, behind the one
/// lock every mutating handler takes.
pub struct AppState {
    pub engine: Mutex<MatchingEngine>,
}

impl AppState {
    pub fn new(engine: MatchingEngine) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }
}

/// The HTTP surface: binds an address and serves the router over it.
pub struct Api {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl Api {
    pub fn new(addr: SocketAddr, engine: MatchingEngine) -> Self {
        let state = Arc::new(AppState::new(engine));
        Self { addr, state }
    }

    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin([
                "http://localhost:3000".parse::<HeaderValue>().unwrap(),
                "http://127.0.0.1:3000".parse::<HeaderValue>().unwrap(),
            ])
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

        Router::new()
            .route("/health", get(routes::health))
            .route("/orders", post(routes::place_order))
            .route("/orders/:id", delete(routes::cancel_order))
            .route("/book", get(routes::get_book))
            .route("/admin/reset", post(routes::reset))
            .layer(Extension(self.state.clone()))
            .layer(cors)
    }

    /// Starts the API server and runs until shutdown.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.routes();

        info!(addr = %self.addr, "API listening");
        let listener = TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
