//! Replicate API client.
//!
//! Predictions are created with `Prefer: wait` so short jobs come back
//! finished; anything still running is polled through its `urls.get` link
//! until it reaches a terminal status.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

use super::{api_error, AudioInput, MusicProvider, MusicRequest, ProviderError};

/// Default Replicate API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com";

/// Lifecycle state of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    /// Queued or booting.
    Starting,
    /// Running.
    Processing,
    /// Finished with output.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Cancelled by a client.
    Canceled,
    /// Stopped before it started.
    Aborted,
}

impl PredictionStatus {
    /// Whether the prediction will not change any more.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Starting | Self::Processing)
    }
}

/// Links returned with a prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionUrls {
    /// Poll URL.
    pub get: String,
}

/// A prediction as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    /// Prediction ID.
    pub id: String,
    /// Current status.
    pub status: PredictionStatus,
    /// Model output once succeeded.
    #[serde(default)]
    pub output: Option<Value>,
    /// Error reported by the model.
    #[serde(default)]
    pub error: Option<Value>,
    /// Related links.
    pub urls: PredictionUrls,
}

impl Prediction {
    fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                format!("prediction {} ended with status {:?}", self.id, self.status)
            }
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    urls: PredictionUrls,
}

/// Replicate API client.
#[derive(Debug, Clone)]
pub struct ReplicateClient {
    client: Client,
    base_url: String,
    api_token: String,
    poll_interval: Duration,
}

impl ReplicateClient {
    /// Create a new Replicate client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        poll_interval: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            poll_interval,
        })
    }

    /// Create a prediction for a model version.
    pub async fn create_prediction(
        &self,
        version: &str,
        input: Value,
    ) -> Result<Prediction, ProviderError> {
        let url = format!("{}/v1/predictions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&json!({ "version": version, "input": input }))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Fetch the current state of a prediction from its poll URL.
    pub async fn get_prediction(&self, url: &str) -> Result<Prediction, ProviderError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Upload a file and return the URL predictions can reference it by.
    pub async fn upload_file(&self, mut audio: AudioInput) -> Result<String, ProviderError> {
        let url = format!("{}/v1/files", self.base_url);

        let mut contents = Vec::new();
        audio.file.read_to_end(&mut contents).await?;

        let part = Part::bytes(contents)
            .file_name(audio.filename.clone())
            .mime_str(mime_for(&audio.filename))?;
        let form = Form::new().part("content", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await?;

        let uploaded: UploadedFile = Self::handle_response(response).await?;
        tracing::debug!(filename = %audio.filename, url = %uploaded.urls.get, "Uploaded input file");

        Ok(uploaded.urls.get)
    }

    /// Create a prediction and wait for it to finish, returning its output.
    pub async fn run(&self, version: &str, input: Value) -> Result<Value, ProviderError> {
        let mut prediction = self.create_prediction(version, input).await?;
        tracing::info!(prediction_id = %prediction.id, status = ?prediction.status, "Prediction created");

        while !prediction.status.is_terminal() {
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.get_prediction(&prediction.urls.get).await?;
        }

        if prediction.status != PredictionStatus::Succeeded {
            let message = prediction.error_message();
            tracing::warn!(prediction_id = %prediction.id, error = %message, "Prediction did not succeed");
            return Err(ProviderError::JobFailed(message));
        }

        tracing::info!(prediction_id = %prediction.id, "Prediction succeeded");
        prediction
            .output
            .ok_or_else(|| ProviderError::MalformedResponse("prediction has no output".into()))
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        if response.status().is_success() {
            return Ok(response.json().await?);
        }
        Err(api_error(response).await)
    }
}

#[async_trait]
impl MusicProvider for ReplicateClient {
    async fn generate(&self, request: MusicRequest) -> Result<String, ProviderError> {
        let mut input = json!({
            "prompt": request.prompt,
            "duration": request.duration,
        });

        if let Some(model_version) = request.model_version {
            input["model_version"] = json!(model_version);
        }
        if let Some(audio) = request.input_audio {
            input["input_audio"] = json!(self.upload_file(audio).await?);
        }

        let output = self.run(&request.version, input).await?;
        output_url(&output)
    }
}

/// Extract a media URL from prediction output.
///
/// MusicGen returns a single URL; some models return a list of them.
fn output_url(output: &Value) -> Result<String, ProviderError> {
    match output {
        Value::String(url) => Ok(url.clone()),
        Value::Array(items) => items
            .iter()
            .find_map(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::MalformedResponse("output list has no URL".into())),
        other => Err(ProviderError::MalformedResponse(format!(
            "unexpected output: {other}"
        ))),
    }
}

fn mime_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}
