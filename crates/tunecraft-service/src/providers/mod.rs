//! Generative media providers.
//!
//! The relay talks to providers through the [`MusicProvider`] and
//! [`VideoProvider`] traits:
//!
//! - [`ReplicateClient`] runs MusicGen predictions on Replicate
//! - [`FalClient`] runs queued video jobs on fal.ai
//! - [`Unconfigured`] stands in when credentials are missing

pub mod fal;
pub mod replicate;
pub mod unconfigured;

use async_trait::async_trait;

pub use fal::FalClient;
pub use replicate::ReplicateClient;
pub use unconfigured::Unconfigured;

/// Replicate version of `meta/musicgen`.
pub const MUSICGEN_VERSION: &str =
    "7be0f12c54a8d033a0fbd14418c9af98962da9a86f5ff7811f9b3423a1f0b7d7";

/// MusicGen variant that conditions on an input melody.
pub const MELODY_MODEL_VERSION: &str = "melody";

/// fal.ai application used for text-to-video.
pub const MINIMAX_VIDEO_APP: &str = "fal-ai/minimax-video";

/// Clip length requested from the video provider.
pub const VIDEO_DURATION_SECONDS: u32 = 5;

/// Error type for provider operations.
///
/// The `Display` text is returned to clients in 500 responses.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Credentials for the provider are missing.
    #[error("{0} is not configured")]
    NotConfigured(String),

    /// Transport failure.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("{message} (HTTP {status})")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error text reported by the provider.
        message: String,
    },

    /// The remote job ran but did not succeed.
    #[error("{0}")]
    JobFailed(String),

    /// The provider answered with an unexpected shape.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// Staging the upload on disk failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// An opened audio file handed to a music provider.
#[derive(Debug)]
pub struct AudioInput {
    /// Handle to the staged upload, positioned at the start.
    pub file: tokio::fs::File,
    /// Name to present to the provider.
    pub filename: String,
}

/// One music generation call.
#[derive(Debug)]
pub struct MusicRequest {
    /// Model version identifier.
    pub version: String,
    /// Text prompt.
    pub prompt: String,
    /// Length of the generated clip in seconds.
    pub duration: u32,
    /// Model variant, e.g. [`MELODY_MODEL_VERSION`].
    pub model_version: Option<String>,
    /// Melody to condition on.
    pub input_audio: Option<AudioInput>,
}

/// One video generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    /// Application identifier.
    pub app: String,
    /// Visual prompt.
    pub prompt: String,
    /// Length of the clip in seconds.
    pub duration: u32,
}

/// A provider that turns prompts into audio.
///
/// Implementations block (asynchronously) until the remote job has finished
/// and return the URL of the generated media.
#[async_trait]
pub trait MusicProvider: Send + Sync {
    /// Run a generation to completion.
    async fn generate(&self, request: MusicRequest) -> Result<String, ProviderError>;
}

/// A provider that turns prompts into video.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Run a generation to completion.
    async fn generate(&self, request: VideoRequest) -> Result<String, ProviderError>;
}

/// Read a provider error body, preferring its `detail`/`error` field.
pub(crate) async fn api_error(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body: Option<serde_json::Value> = response.json().await.ok();

    let message = body
        .as_ref()
        .and_then(|b| {
            b.get("detail")
                .or_else(|| b.get("error"))
                .or_else(|| b.get("title"))
        })
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| format!("HTTP {status}"));

    ProviderError::Api {
        status: status.as_u16(),
        message,
    }
}
