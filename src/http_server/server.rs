//! # HTTP Server
//!
//! Main HTTP server combining all endpoint routers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::coordinator::Coordinator;
use crate::realtime::Notifier;

use super::activity_routes::{activity_routes, ActivityState};
use super::config::HttpServerConfig;
use super::hold_routes::{hold_routes, HoldsState};
use super::realtime_routes::{realtime_routes, RealtimeState};
use super::roster_routes::{roster_routes, RosterState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// HTTP server for the holdline API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server with default configuration
    pub fn new(coordinator: Arc<Coordinator>, notifier: Arc<Notifier>) -> Self {
        Self::with_config(HttpServerConfig::default(), coordinator, notifier)
    }

    /// Create a server with custom configuration
    pub fn with_config(
        config: HttpServerConfig,
        coordinator: Arc<Coordinator>,
        notifier: Arc<Notifier>,
    ) -> Self {
        let router = Self::build_router(&config, coordinator, notifier);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(
        config: &HttpServerConfig,
        coordinator: Arc<Coordinator>,
        notifier: Arc<Notifier>,
    ) -> Router {
        let roster_state = Arc::new(RosterState {
            coordinator: coordinator.clone(),
        });
        let holds_state = Arc::new(HoldsState {
            coordinator: coordinator.clone(),
        });
        let activity_state = Arc::new(ActivityState { coordinator });
        let realtime_state = Arc::new(RealtimeState::new(notifier));

        let cors = if config.cors_origins.is_empty() {
            // No origins configured: permissive, for development
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            use tower_http::cors::AllowOrigin;
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/health", get(health_handler))
            .nest("/roster", roster_routes(roster_state))
            .nest("/holds", hold_routes(holds_state))
            .nest("/activity", activity_routes(activity_state))
            .nest("/realtime", realtime_routes(realtime_state))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{}", e)))?;

        println!("Starting holdline HTTP server on {}", addr);
        println!("Health check: http://{}/health", addr);
        println!("API endpoints:");
        println!("  - /roster/* - Rotation & roster mutations");
        println!("  - /holds/* - Scheduled holds");
        println!("  - /activity/* - Activity feed");
        println!("  - /realtime/* - Change events (WebSocket)");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    fn test_server(dir: &TempDir, config: HttpServerConfig) -> HttpServer {
        let store = Arc::new(Store::open(dir.path()).unwrap());
        let notifier = Arc::new(Notifier::new());
        let coordinator = Arc::new(Coordinator::new(store, notifier.clone()));
        HttpServer::with_config(config, coordinator, notifier)
    }

    #[test]
    fn test_server_creation() {
        let dir = TempDir::new().unwrap();
        let server = test_server(&dir, HttpServerConfig::default());
        assert_eq!(server.socket_addr(), "0.0.0.0:8620");
    }

    #[test]
    fn test_router_builds() {
        let dir = TempDir::new().unwrap();
        let server = test_server(&dir, HttpServerConfig::with_port(8080));
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
        let _router = server.router();
    }
}
