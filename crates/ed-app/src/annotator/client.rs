use async_trait::async_trait;
use ed_core::{JobCreated, JobId, JobRequest, JobResults};
use reqwest::Response;

use crate::annotator::config::AppConfig;
use crate::error::AppError;

/// The two calls the annotator makes against a job server.
#[async_trait]
pub trait JobClient: Send + Sync {
    /// `POST job`: schedule an annotation job.
    async fn submit(&self, request: &JobRequest) -> Result<JobId, AppError>;

    /// `GET job`: results completed since the previous call.
    async fn fetch_results(&self) -> Result<JobResults, AppError>;
}

pub struct HttpJobClient {
    client: reqwest::Client,
    job_url: String,
}

impl HttpJobClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            job_url: config.job_url(),
        })
    }

    pub fn job_url(&self) -> &str {
        &self.job_url
    }
}

#[async_trait]
impl JobClient for HttpJobClient {
    #[tracing::instrument(skip_all, fields(url = %self.job_url))]
    async fn submit(&self, request: &JobRequest) -> Result<JobId, AppError> {
        let response = self
            .client
            .post(&self.job_url)
            .json(request)
            .send()
            .await?;

        let created: JobCreated = check_status(response).await?.json().await?;
        tracing::debug!(job = %created.id, "Job created");

        Ok(created.id)
    }

    #[tracing::instrument(skip_all, fields(url = %self.job_url))]
    async fn fetch_results(&self) -> Result<JobResults, AppError> {
        let response = self.client.get(&self.job_url).send().await?;
        let results: JobResults = check_status(response).await?.json().await?;

        if !results.is_empty() {
            tracing::debug!(count = results.len(), "Received job results");
        }

        Ok(results)
    }
}

async fn check_status(response: Response) -> Result<Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::BackendError {
        status: status.as_u16(),
        body,
    })
}
