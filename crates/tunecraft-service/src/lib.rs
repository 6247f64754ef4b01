//! Tunecraft HTTP API Service.
//!
//! This crate relays prompts to generative media providers and gates usage
//! with a per-session credit balance:
//!
//! - Music generation (Replicate MusicGen)
//! - Melody-conditioned remixes of uploaded audio
//! - Video generation (fal.ai queue)
//! - Session credits and rewards
//!
//! # Sessions
//!
//! Clients are identified by a signed `tunecraft_session` cookie issued on
//! their first request. There is no other authentication.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for axum

pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod providers;
pub mod relay;
pub mod routes;
pub mod scratch;
pub mod session;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use providers::{FalClient, MusicProvider, ProviderError, ReplicateClient, VideoProvider};
pub use relay::GenerationRelay;
pub use routes::create_router;
pub use state::AppState;
