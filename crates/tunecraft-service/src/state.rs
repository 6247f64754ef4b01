//! Application state.

use std::sync::Arc;

use tunecraft_store::{Ledger, MemoryStore, SessionStore};

use crate::config::ServiceConfig;
use crate::crypto::SessionSigner;
use crate::providers::{FalClient, MusicProvider, ReplicateClient, Unconfigured, VideoProvider};
use crate::relay::GenerationRelay;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Per-session credit ledger.
    pub ledger: Ledger,

    /// Provider relay.
    pub relay: GenerationRelay,

    /// Session cookie signer.
    pub signer: SessionSigner,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create application state with an in-memory session store and the
    /// providers described by `config`.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        let music: Arc<dyn MusicProvider> = match config.replicate_api_token.as_ref() {
            Some(token) => match ReplicateClient::new(
                &config.replicate_api_url,
                token,
                config.poll_interval(),
            ) {
                Ok(client) => {
                    tracing::info!(url = %config.replicate_api_url, "Replicate integration enabled");
                    Arc::new(client)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Replicate client");
                    Arc::new(Unconfigured::new("Replicate"))
                }
            },
            None => {
                tracing::warn!("Replicate not configured - music generation will fail");
                Arc::new(Unconfigured::new("Replicate"))
            }
        };

        let video: Arc<dyn VideoProvider> = match config.fal_key.as_ref() {
            Some(key) => match FalClient::new(&config.fal_queue_url, key, config.poll_interval()) {
                Ok(client) => {
                    tracing::info!(url = %config.fal_queue_url, "fal.ai integration enabled");
                    Arc::new(client)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create fal.ai client");
                    Arc::new(Unconfigured::new("fal.ai"))
                }
            },
            None => {
                tracing::warn!("fal.ai not configured - video generation will fail");
                Arc::new(Unconfigured::new("fal.ai"))
            }
        };

        let store: Arc<dyn SessionStore> = match i64::try_from(config.session_ttl_seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(chrono::Duration::try_seconds)
        {
            Some(ttl) => Arc::new(MemoryStore::with_ttl(ttl)),
            None => Arc::new(MemoryStore::new()),
        };

        Self::with_providers(config, store, music, video)
    }

    /// Create application state from explicit parts.
    #[must_use]
    pub fn with_providers(
        config: ServiceConfig,
        store: Arc<dyn SessionStore>,
        music: Arc<dyn MusicProvider>,
        video: Arc<dyn VideoProvider>,
    ) -> Self {
        if config.uses_default_secret() {
            tracing::warn!("SECRET_KEY not set - using development session secret");
        }

        Self {
            ledger: Ledger::new(store, config.credits),
            relay: GenerationRelay::new(music, video, config.scratch_dir.clone()),
            signer: SessionSigner::new(config.session_secret.clone()),
            config,
        }
    }
}
