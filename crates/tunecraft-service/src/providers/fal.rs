//! fal.ai queue client.
//!
//! Jobs are submitted to `{queue}/{app}`; the submission returns a status
//! URL to poll and a response URL to read once the job is `COMPLETED`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{api_error, ProviderError, VideoProvider, VideoRequest};

/// Default fal queue base URL.
pub const DEFAULT_QUEUE_URL: &str = "https://queue.fal.run";

/// Handle returned when a job is queued.
#[derive(Debug, Clone, Deserialize)]
pub struct QueuedJob {
    /// Job ID.
    pub request_id: String,
    /// URL reporting queue position and progress.
    pub status_url: String,
    /// URL holding the result once complete.
    pub response_url: String,
}

/// Queue state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Waiting for a runner.
    InQueue,
    /// Running.
    InProgress,
    /// Finished; the result may still be an error.
    Completed,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: JobStatus,
}

/// fal.ai API client.
#[derive(Debug, Clone)]
pub struct FalClient {
    client: Client,
    queue_url: String,
    api_key: String,
    poll_interval: Duration,
}

impl FalClient {
    /// Create a new fal client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        queue_url: impl Into<String>,
        api_key: impl Into<String>,
        poll_interval: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            queue_url: queue_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            poll_interval,
        })
    }

    /// Queue a job for `app` with the given arguments.
    pub async fn submit(&self, app: &str, arguments: &Value) -> Result<QueuedJob, ProviderError> {
        let url = format!("{}/{}", self.queue_url, app.trim_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(arguments)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Current queue status of a job.
    pub async fn status(&self, job: &QueuedJob) -> Result<JobStatus, ProviderError> {
        let response = self
            .client
            .get(&job.status_url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let status: StatusResponse = self.handle_response(response).await?;
        Ok(status.status)
    }

    /// Fetch the result of a completed job.
    pub async fn result(&self, job: &QueuedJob) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(&job.response_url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Submit a job and wait for its result.
    pub async fn run(&self, app: &str, arguments: &Value) -> Result<Value, ProviderError> {
        let job = self.submit(app, arguments).await?;
        tracing::info!(app = %app, request_id = %job.request_id, "Job queued");

        loop {
            match self.status(&job).await? {
                JobStatus::Completed => break,
                status => {
                    tracing::debug!(request_id = %job.request_id, ?status, "Job pending");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        tracing::info!(request_id = %job.request_id, "Job completed");
        self.result(&job).await
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.api_key)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        if response.status().is_success() {
            return Ok(response.json().await?);
        }
        Err(api_error(response).await)
    }
}

#[async_trait]
impl VideoProvider for FalClient {
    async fn generate(&self, request: VideoRequest) -> Result<String, ProviderError> {
        let arguments = json!({
            "prompt": request.prompt,
            "duration": request.duration,
        });

        let result = self.run(&request.app, &arguments).await?;
        video_url(&result)
    }
}

/// Pull `video.url` out of a job result.
fn video_url(result: &Value) -> Result<String, ProviderError> {
    result
        .get("video")
        .and_then(|video| video.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::MalformedResponse("result has no video.url".into()))
}
