//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use super::models::{CoursesQuery, ErrorBody, ProgressQuery, TransferRequest};
use super::handlers;
use crate::catalog::CatalogClient;
use crate::client::build_client;
use crate::config::Config;
use crate::error::RelayError;
use crate::progress::ProgressStore;
use crate::segments::{
    ContentHost, HttpSegmentSource, PlaylistSynthesizer, SegmentLocator, SegmentReassembler, SegmentSource,
    PLAYLIST_CONTENT_TYPE, SEGMENT_CONTENT_TYPE,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub progress: ProgressStore,
    pub locator: SegmentLocator,
    pub playlists: PlaylistSynthesizer,
    pub reassembler: SegmentReassembler,
    pub catalog: CatalogClient,
}

impl AppState {
    /// Wire everything against the real content host
    pub fn from_config(config: Config) -> crate::error::Result<Self> {
        let client = build_client(&config.http)?;
        let source = Arc::new(HttpSegmentSource::new(client.clone()));
        Ok(Self::with_source(config, source, client))
    }

    /// Wire everything against a caller-supplied segment source
    pub fn with_source(config: Config, source: Arc<dyn SegmentSource>, client: Client) -> Self {
        let host = ContentHost::from_config(&config.content_host);

        Self {
            progress: ProgressStore::new(),
            locator: SegmentLocator::new(source.clone(), host.clone(), config.discovery.probe_ceiling),
            playlists: PlaylistSynthesizer::new(host.clone(), &config.playlist),
            reassembler: SegmentReassembler::new(source, host),
            catalog: CatalogClient::new(client, &config.catalog),
            config: Arc::new(config),
        }
    }
}

/// Build the router with all routes, mounted both at the root and under `/api`
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/progress", get(progress_handler))
        .route("/stream", post(stream_handler))
        .route("/download", post(download_handler))
        .route("/courses", get(courses_handler))
        .route("/champions", get(champions_handler))
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = create_router(state);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

fn status_for(error: &RelayError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    match handlers::health_check().await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(e.to_string())),
    }
}

/// Progress poll handler
async fn progress_handler(State(state): State<AppState>, Query(query): Query<ProgressQuery>) -> Response {
    match handlers::get_progress(&state, query.id.as_deref()) {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(_) => error_response(StatusCode::BAD_REQUEST, ErrorBody::new("Missing id")),
    }
}

/// Playlist handler
async fn stream_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match TransferRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, ErrorBody::new(missing_message(&e))),
    };

    match handlers::build_playlist(&state, &request).await {
        Ok(playlist) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)],
            playlist,
        )
            .into_response(),
        Err(e) => {
            error!("Error processing video {}: {}", request, e);
            error_response(
                status_for(&e),
                ErrorBody::with_details("Failed to process video", e.to_string()),
            )
        }
    }
}

/// Download handler. The body streams while segments are still being fetched.
async fn download_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match TransferRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, ErrorBody::new(missing_message(&e))),
    };

    let disposition = format!("attachment; filename=\"{}\"", request.download_filename());

    match handlers::start_download(&state, request.clone()).await {
        Ok(handle) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, SEGMENT_CONTENT_TYPE.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            Body::from_stream(handle.stream),
        )
            .into_response(),
        Err(e) => {
            error!("Error downloading video {}: {}", request, e);
            error_response(
                status_for(&e),
                ErrorBody::with_details("Failed to download video", e.to_string()),
            )
        }
    }
}

/// Course catalog handler
async fn courses_handler(State(state): State<AppState>, Query(query): Query<CoursesQuery>) -> Response {
    match handlers::list_courses(&state, query.game.as_deref()).await {
        Ok(catalog) => (StatusCode::OK, Json(catalog)).into_response(),
        Err(RelayError::InvalidGame(game)) => {
            warn!("Rejected course request for game {:?}", game);
            error_response(StatusCode::BAD_REQUEST, ErrorBody::new("Invalid game type"))
        }
        Err(e) => {
            error!("Failed to fetch courses: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("Failed to fetch courses"))
        }
    }
}

/// Champion list handler
async fn champions_handler(State(state): State<AppState>) -> Response {
    match handlers::list_champions(&state).await {
        Ok(champions) => (StatusCode::OK, Json(champions)).into_response(),
        Err(e) => {
            error!("Failed to fetch champions: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("Failed to fetch champions"))
        }
    }
}

fn missing_message(error: &RelayError) -> String {
    match error {
        RelayError::MissingParameter(message) => message.clone(),
        other => other.to_string(),
    }
}
