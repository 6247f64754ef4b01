//! Generation relay.
//!
//! Invokes exactly one provider per request and normalizes the outcome to a
//! media URL or a [`ProviderError`].

use std::path::PathBuf;
use std::sync::Arc;

use tunecraft_core::AudioUpload;

use crate::providers::{
    AudioInput, MusicProvider, MusicRequest, ProviderError, VideoProvider, VideoRequest,
    MELODY_MODEL_VERSION, MINIMAX_VIDEO_APP, MUSICGEN_VERSION, VIDEO_DURATION_SECONDS,
};
use crate::scratch::ScratchFile;

/// Forwards validated requests to the configured providers.
#[derive(Clone)]
pub struct GenerationRelay {
    music: Arc<dyn MusicProvider>,
    video: Arc<dyn VideoProvider>,
    scratch_dir: PathBuf,
}

impl GenerationRelay {
    /// Create a relay. Uploads are staged under `scratch_dir`.
    #[must_use]
    pub fn new(
        music: Arc<dyn MusicProvider>,
        video: Arc<dyn VideoProvider>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            music,
            video,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Generate music from a text prompt.
    pub async fn generate_music(&self, prompt: &str, duration: u32) -> Result<String, ProviderError> {
        self.music
            .generate(MusicRequest {
                version: MUSICGEN_VERSION.to_string(),
                prompt: prompt.to_string(),
                duration,
                model_version: None,
                input_audio: None,
            })
            .await
    }

    /// Generate music conditioned on an uploaded melody.
    ///
    /// The upload is staged in a scratch file for the duration of the call;
    /// the file is removed however the call ends.
    pub async fn remix_music(&self, upload: &AudioUpload) -> Result<String, ProviderError> {
        let scratch = ScratchFile::create(&self.scratch_dir, &upload.extension, &upload.bytes).await?;
        let file = scratch.open().await?;

        self.music
            .generate(MusicRequest {
                version: MUSICGEN_VERSION.to_string(),
                prompt: upload.prompt.clone(),
                duration: upload.duration,
                model_version: Some(MELODY_MODEL_VERSION.to_string()),
                input_audio: Some(AudioInput {
                    file,
                    filename: upload.filename.clone(),
                }),
            })
            .await
    }

    /// Generate a fixed-length video clip from a visual prompt.
    pub async fn generate_video(&self, prompt: &str) -> Result<String, ProviderError> {
        self.video
            .generate(VideoRequest {
                app: MINIMAX_VIDEO_APP.to_string(),
                prompt: prompt.to_string(),
                duration: VIDEO_DURATION_SECONDS,
            })
            .await
    }
}

impl std::fmt::Debug for GenerationRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationRelay")
            .field("scratch_dir", &self.scratch_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::io::AsyncReadExt;

    #[derive(Debug, Clone)]
    struct Seen {
        version: String,
        prompt: String,
        duration: u32,
        model_version: Option<String>,
        audio: Option<(String, Vec<u8>)>,
    }

    struct RecordingMusic {
        fail: bool,
        seen: Mutex<Vec<Seen>>,
    }

    impl RecordingMusic {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MusicProvider for RecordingMusic {
        async fn generate(&self, request: MusicRequest) -> Result<String, ProviderError> {
            let audio = match request.input_audio {
                Some(mut input) => {
                    let mut bytes = Vec::new();
                    input.file.read_to_end(&mut bytes).await?;
                    Some((input.filename, bytes))
                }
                None => None,
            };
            self.seen.lock().unwrap().push(Seen {
                version: request.version,
                prompt: request.prompt,
                duration: request.duration,
                model_version: request.model_version,
                audio,
            });

            if self.fail {
                Err(ProviderError::JobFailed("model exploded".into()))
            } else {
                Ok("https://replicate.delivery/out.wav".into())
            }
        }
    }

    struct RecordingVideo {
        seen: Mutex<Vec<VideoRequest>>,
    }

    #[async_trait]
    impl VideoProvider for RecordingVideo {
        async fn generate(&self, request: VideoRequest) -> Result<String, ProviderError> {
            self.seen.lock().unwrap().push(request);
            Ok("https://fal.media/clip.mp4".into())
        }
    }

    fn upload() -> AudioUpload {
        AudioUpload {
            prompt: "jazzier".into(),
            duration: 12,
            bytes: b"ID3fake".to_vec(),
            filename: "Track.MP3".into(),
            extension: "mp3".into(),
        }
    }

    fn relay(music: Arc<RecordingMusic>, dir: &std::path::Path) -> (GenerationRelay, Arc<RecordingVideo>) {
        let video = Arc::new(RecordingVideo {
            seen: Mutex::new(Vec::new()),
        });
        (GenerationRelay::new(music, video.clone(), dir), video)
    }

    fn entries(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(Iterator::count).unwrap_or(0)
    }

    #[tokio::test]
    async fn music_uses_fixed_version() {
        let dir = tempfile::tempdir().unwrap();
        let music = RecordingMusic::new(false);
        let (relay, _) = relay(music.clone(), dir.path());

        let url = relay.generate_music("lofi beat", 10).await.unwrap();
        assert_eq!(url, "https://replicate.delivery/out.wav");

        let seen = music.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].version, MUSICGEN_VERSION);
        assert_eq!(seen[0].prompt, "lofi beat");
        assert_eq!(seen[0].duration, 10);
        assert!(seen[0].model_version.is_none());
        assert!(seen[0].audio.is_none());
    }

    #[tokio::test]
    async fn remix_passes_open_handle_with_melody_variant() {
        let dir = tempfile::tempdir().unwrap();
        let music = RecordingMusic::new(false);
        let (relay, _) = relay(music.clone(), dir.path());

        relay.remix_music(&upload()).await.unwrap();

        let seen = music.seen.lock().unwrap();
        assert_eq!(seen[0].model_version.as_deref(), Some(MELODY_MODEL_VERSION));
        assert_eq!(
            seen[0].audio,
            Some(("Track.MP3".to_string(), b"ID3fake".to_vec()))
        );
    }

    #[tokio::test]
    async fn remix_removes_scratch_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let (relay, _) = relay(RecordingMusic::new(false), dir.path());

        relay.remix_music(&upload()).await.unwrap();
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn remix_removes_scratch_on_provider_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (relay, _) = relay(RecordingMusic::new(true), dir.path());

        let err = relay.remix_music(&upload()).await.unwrap_err();
        assert_eq!(err.to_string(), "model exploded");
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn remix_reports_scratch_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let music = RecordingMusic::new(false);
        let (relay, _) = relay(music.clone(), &blocker);

        let err = relay.remix_music(&upload()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Io(_)));
        assert!(music.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn video_uses_fixed_app_and_duration() {
        let dir = tempfile::tempdir().unwrap();
        let (relay, video) = relay(RecordingMusic::new(false), dir.path());

        let url = relay.generate_video("a cat surfing").await.unwrap();
        assert_eq!(url, "https://fal.media/clip.mp4");

        let seen = video.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            VideoRequest {
                app: MINIMAX_VIDEO_APP.into(),
                prompt: "a cat surfing".into(),
                duration: 5,
            }
        );
    }
}
