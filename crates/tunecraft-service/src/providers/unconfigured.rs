//! Placeholder provider used when credentials are absent.

use async_trait::async_trait;

use super::{MusicProvider, MusicRequest, ProviderError, VideoProvider, VideoRequest};

/// Provider that fails every call with [`ProviderError::NotConfigured`].
#[derive(Debug, Clone)]
pub struct Unconfigured {
    name: &'static str,
}

impl Unconfigured {
    /// Create a placeholder for the named provider.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl MusicProvider for Unconfigured {
    async fn generate(&self, _request: MusicRequest) -> Result<String, ProviderError> {
        Err(ProviderError::NotConfigured(self.name.to_string()))
    }
}

#[async_trait]
impl VideoProvider for Unconfigured {
    async fn generate(&self, _request: VideoRequest) -> Result<String, ProviderError> {
        Err(ProviderError::NotConfigured(self.name.to_string()))
    }
}
