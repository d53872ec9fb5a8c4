use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    api,
    config::{AppConfig, FrontendPublicConfig},
    fetcher::{self, RefreshTrigger},
    middleware as mw,
    ops::events::EventsHub,
    service::{
        board::{Board, BoardHandle},
        carousel,
    },
};

const EVENTS_BUFFER: usize = 16;

#[derive(Clone)]
pub struct AppState {
    pub board: BoardHandle,
    pub config: FrontendPublicConfig,
    pub refresh: RefreshTrigger,
}

/// Refetch and rotation tasks; each can be stopped on its own.
pub struct BackgroundTasks {
    pub fetcher: JoinHandle<()>,
    pub carousel: JoinHandle<()>,
}

impl BackgroundTasks {
    pub fn shutdown(self) {
        self.fetcher.abort();
        self.carousel.abort();
        tracing::info!("background tasks stopped");
    }
}

pub fn build_router(config: &AppConfig) -> anyhow::Result<(Router, BackgroundTasks)> {
    let board = BoardHandle::new(Board::from_config(config), EventsHub::new(EVENTS_BUFFER));
    let (refresh, refresh_rx) = fetcher::refresh_channel();

    let fetcher_task = fetcher::spawn(board.clone(), config.feed.clone(), refresh_rx)?;
    let carousel_task = carousel::spawn(board.clone(), config.display.rotation_secs);

    let state = AppState {
        board,
        config: config.frontend_public_config(),
        refresh,
    };

    Ok((
        router(state),
        BackgroundTasks {
            fetcher: fetcher_task,
            carousel: carousel_task,
        },
    ))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(mw::assign_trace_id))
        .layer(middleware::from_fn(mw::log_server_errors));

    Router::new()
        .route("/healthz", get(api::health::health_check))
        .route("/status", get(api::status::current_status))
        .route("/status/stream", get(api::status::stream_status))
        .route("/status/refresh", post(api::status::request_refresh))
        .route("/status/:section", get(api::status::section_status))
        .route("/config/frontend", get(api::config::frontend_config))
        .layer(layers)
        .with_state(state)
}
