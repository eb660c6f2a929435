use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use ed_core::job_path;

use crate::routes::job::{create_job, take_results};
use crate::state::JobState;

mod job;

pub fn api_routes(url_prefix: &str) -> Router<Arc<JobState>> {
    Router::new().route(&job_path(url_prefix), post(create_job).get(take_results))
}
