//! Generation handlers.
//!
//! Each handler validates its input, checks that the session can pay,
//! calls the relay, and only then deducts the credit. A failure at any step
//! returns early with the balance untouched.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use tunecraft_core::{
    validate_audio_upload, validate_text_prompt, validate_video_prompt, AudioField,
    GeneratePayload, UploadForm, VideoPayload,
};

use crate::error::ApiError;
use crate::session::CurrentSession;
use crate::state::AppState;

/// Audio generation response.
#[derive(Debug, Serialize)]
pub struct AudioResponse {
    /// URL of the generated audio.
    pub audio_url: String,
    /// Balance after the charge.
    pub credits: u64,
}

/// Video generation response.
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    /// URL of the generated video.
    pub video_url: String,
    /// Balance after the charge.
    pub credits: u64,
}

/// Generate music from a text prompt.
pub async fn generate_music(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    payload: Result<Json<GeneratePayload>, JsonRejection>,
) -> Result<Json<AudioResponse>, ApiError> {
    let Json(payload) = payload?;
    let request = validate_text_prompt(&payload, state.config.duration_bounds())?;
    state.ledger.ensure_funds(&session)?;

    tracing::info!(session = %session, duration = request.duration, "Generating music");
    let audio_url = state
        .relay
        .generate_music(&request.prompt, request.duration)
        .await?;

    let credits = state.ledger.charge(&session)?;
    Ok(Json(AudioResponse { audio_url, credits }))
}

/// Generate music conditioned on an uploaded melody.
pub async fn remix_music(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AudioResponse>, ApiError> {
    let form = read_upload_form(multipart?).await?;
    let upload = validate_audio_upload(form, state.config.duration_bounds())?;
    state.ledger.ensure_funds(&session)?;

    tracing::info!(
        session = %session,
        filename = %upload.filename,
        bytes = upload.bytes.len(),
        duration = upload.duration,
        "Remixing music"
    );
    let audio_url = state.relay.remix_music(&upload).await?;

    let credits = state.ledger.charge(&session)?;
    Ok(Json(AudioResponse { audio_url, credits }))
}

/// Generate a short video from a visual prompt.
pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    payload: Result<Json<VideoPayload>, JsonRejection>,
) -> Result<Json<VideoResponse>, ApiError> {
    let Json(payload) = payload?;
    let prompt = validate_video_prompt(&payload)?;
    state.ledger.ensure_funds(&session)?;

    tracing::info!(session = %session, "Generating video");
    let video_url = state.relay.generate_video(&prompt).await?;

    let credits = state.ledger.charge(&session)?;
    Ok(Json(VideoResponse { video_url, credits }))
}

/// Collect the known fields of a remix upload. Unknown fields are skipped.
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.audio = Some(AudioField {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            Some("prompt") => form.prompt = Some(field.text().await?),
            Some("duration") => form.duration = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}
