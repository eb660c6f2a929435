use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use base64::prelude::*;
use ed_core::{JobCreated, JobId, JobRequest, JobResults, ParamSnapshot};
use uuid::Uuid;

use crate::annotate::annotate;
use crate::error::ServerError;
use crate::state::JobState;

pub async fn create_job(
    State(state): State<Arc<JobState>>,
    Json(request): Json<JobRequest>,
) -> Result<Json<JobCreated>, ServerError> {
    let bytes = BASE64_STANDARD.decode(request.image.as_bytes())?;
    let id = JobId(Uuid::new_v4().to_string());

    tracing::info!(job = %id, bytes = bytes.len(), params = ?request.params, "Job received");
    tokio::spawn(run_job(state, id.clone(), bytes, request.params));

    Ok(Json(JobCreated { id }))
}

pub async fn take_results(State(state): State<Arc<JobState>>) -> Json<JobResults> {
    Json(state.drain())
}

async fn run_job(state: Arc<JobState>, id: JobId, bytes: Vec<u8>, params: ParamSnapshot) {
    if !state.annotate_delay.is_zero() {
        tokio::time::sleep(state.annotate_delay).await;
    }

    match tokio::task::spawn_blocking(move || annotate(&bytes, &params)).await {
        Ok(Ok(png)) => {
            tracing::info!(job = %id, "Job finished");
            state.complete(id, BASE64_STANDARD.encode(png));
        }
        Ok(Err(e)) => tracing::error!(job = %id, error = %e, "Annotation failed"),
        Err(e) => tracing::error!(job = %id, error = %e, "Annotation task panicked"),
    }
}
