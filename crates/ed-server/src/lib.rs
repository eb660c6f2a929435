//! Reference job server for the edgedrop client: `POST job` schedules an annotation,
//! `GET job` hands out everything finished since the previous call.

pub mod annotate;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::routes::api_routes;
use crate::state::JobState;

pub fn app(config: &ServerConfig) -> Router {
    let state = JobState::new(config.annotate_delay);

    Router::new()
        .merge(api_routes(&config.url_prefix))
        .with_state(Arc::new(state))
}

pub async fn serve(listener: TcpListener, config: &ServerConfig) -> std::io::Result<()> {
    axum::serve(listener, app(config)).await
}
