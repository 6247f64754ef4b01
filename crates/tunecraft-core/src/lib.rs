//! Core types and utilities for tunecraft.
//!
//! This crate provides the foundational types used throughout the service:
//!
//! - **Identifiers**: `SessionId`
//! - **Sessions**: `SessionRecord`, `CreditPolicy`
//! - **Validation**: `validate_text_prompt`, `validate_video_prompt`, `validate_audio_upload`
//!
//! # Credits
//!
//! A credit is an abstract usage token. One unit is consumed per successful
//! generation. Balances are stored as `u64` so they can never go negative.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod session;
pub mod validate;

pub use error::{Result, ValidationError};
pub use ids::{IdError, SessionId};
pub use session::{
    CreditPolicy, SessionRecord, DEFAULT_COST_PER_GENERATION, DEFAULT_INITIAL_CREDITS,
    DEFAULT_REWARD_AMOUNT,
};
pub use validate::{
    validate_audio_upload, validate_text_prompt, validate_video_prompt, AudioField, AudioUpload,
    DurationBounds, GeneratePayload, TextPrompt, UploadForm, VideoPayload,
    ALLOWED_AUDIO_EXTENSIONS, DEFAULT_DURATION_SECONDS, DEFAULT_MAX_DURATION_SECONDS,
};
