//! API module for the relay
//!
//! Provides the HTTP endpoints the web front-end calls: progress polling,
//! playlist synthesis, reassembled downloads and the course catalog.

use anyhow::Result;
use tracing::info;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{create_router, AppState};

/// API Server for handling REST requests
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!(
            "🚀 Starting API server on {}:{}",
            self.state.config.server.host, self.state.config.server.port
        );
        server::start_http_server(self.state).await
    }
}
