//! Common test utilities for tunecraft integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum_test::{TestServer, TestServerConfig};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

use tunecraft_service::providers::{MusicRequest, VideoRequest};
use tunecraft_service::{create_router, AppState, MusicProvider, ProviderError, ServiceConfig, VideoProvider};
use tunecraft_store::MemoryStore;

pub const MUSIC_URL: &str = "https://replicate.delivery/stub/out.wav";
pub const VIDEO_URL: &str = "https://fal.media/stub/clip.mp4";

/// Music provider double that counts calls and records what it was sent.
pub struct StubMusic {
    outcome: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    pub requests: Mutex<Vec<RecordedMusic>>,
}

/// What a [`StubMusic`] saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedMusic {
    pub prompt: String,
    pub duration: u32,
    pub model_version: Option<String>,
    pub audio: Option<Vec<u8>>,
}

impl StubMusic {
    pub fn ok() -> Arc<Self> {
        Self::with_outcome(Ok(MUSIC_URL.to_string()))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::with_outcome(Err(message.to_string()))
    }

    /// Succeeds, but only after `delay`.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(MUSIC_URL.to_string()),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn with_outcome(outcome: Result<String, String>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MusicProvider for StubMusic {
    async fn generate(&self, request: MusicRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let audio = match request.input_audio {
            Some(mut input) => {
                let mut bytes = Vec::new();
                input.file.read_to_end(&mut bytes).await?;
                Some(bytes)
            }
            None => None,
        };
        self.requests.lock().unwrap().push(RecordedMusic {
            prompt: request.prompt,
            duration: request.duration,
            model_version: request.model_version,
            audio,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map_err(ProviderError::JobFailed)
    }
}

/// Video provider double that counts calls.
pub struct StubVideo {
    outcome: Result<String, String>,
    calls: AtomicUsize,
}

impl StubVideo {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(VIDEO_URL.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoProvider for StubVideo {
    async fn generate(&self, _request: VideoRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(ProviderError::JobFailed)
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server; it keeps the session cookie between requests.
    pub server: TestServer,
    /// Music provider double.
    pub music: Arc<StubMusic>,
    /// Video provider double.
    pub video: Arc<StubVideo>,
    /// Scratch directory for remix uploads (kept alive for test duration).
    pub scratch_dir: TempDir,
}

impl TestHarness {
    /// Create a harness whose providers succeed.
    pub fn new() -> Self {
        Self::with_providers(StubMusic::ok(), StubVideo::ok())
    }

    /// Create a harness with the given provider doubles.
    pub fn with_providers(music: Arc<StubMusic>, video: Arc<StubVideo>) -> Self {
        Self::build(music, video, |_| {})
    }

    /// Create a harness with succeeding providers and a tweaked config.
    pub fn with_config(configure: impl FnOnce(&mut ServiceConfig)) -> Self {
        Self::build(StubMusic::ok(), StubVideo::ok(), configure)
    }

    /// Create a harness with the given music provider and a tweaked config.
    pub fn with_music_and_config(
        music: Arc<StubMusic>,
        configure: impl FnOnce(&mut ServiceConfig),
    ) -> Self {
        Self::build(music, StubVideo::ok(), configure)
    }

    fn build(
        music: Arc<StubMusic>,
        video: Arc<StubVideo>,
        configure: impl FnOnce(&mut ServiceConfig),
    ) -> Self {
        let scratch_dir = TempDir::new().expect("Failed to create scratch directory");

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            session_secret: "test-session-secret".into(),
            scratch_dir: scratch_dir.path().to_path_buf(),
            ..ServiceConfig::default()
        };
        configure(&mut config);

        let state = AppState::with_providers(
            config,
            Arc::new(MemoryStore::new()),
            music.clone(),
            video.clone(),
        );
        let router: Router = create_router(state);

        let server_config = TestServerConfig {
            save_cookies: true,
            ..TestServerConfig::default()
        };
        let server =
            TestServer::new_with_config(router, server_config).expect("Failed to create test server");

        Self {
            server,
            music,
            video,
            scratch_dir,
        }
    }

    /// Number of files left in the scratch directory.
    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch_dir.path())
            .map(Iterator::count)
            .unwrap_or(0)
    }

    /// Current balance of the harness session.
    pub async fn credits(&self) -> u64 {
        let body: serde_json::Value = self.server.get("/credits").await.json();
        body["credits"].as_u64().expect("credits should be a number")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
