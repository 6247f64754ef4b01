//! Request validation.
//!
//! Every check here is pure: no I/O, no credit lookups, no provider calls.
//! Handlers run these before touching the ledger or the relay.

use serde::Deserialize;

use crate::error::{Result, ValidationError};

/// Extensions accepted for uploaded audio (compared case-insensitively).
pub const ALLOWED_AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "m4a"];

/// Duration used when the request omits one.
pub const DEFAULT_DURATION_SECONDS: u32 = 8;

/// Upper bound on requested audio duration.
pub const DEFAULT_MAX_DURATION_SECONDS: u32 = 30;

/// Bounds applied to requested durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBounds {
    /// Value substituted when no duration is given.
    pub default_seconds: u32,
    /// Largest accepted duration, inclusive.
    pub max_seconds: u32,
}

impl Default for DurationBounds {
    fn default() -> Self {
        Self {
            default_seconds: DEFAULT_DURATION_SECONDS,
            max_seconds: DEFAULT_MAX_DURATION_SECONDS,
        }
    }
}

/// JSON body of `POST /generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratePayload {
    /// Text prompt.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Duration in seconds, as a JSON integer or an integer string.
    #[serde(default)]
    pub duration: Option<serde_json::Value>,
}

/// JSON body of `POST /video`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoPayload {
    /// Visual prompt.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// An uploaded file part.
#[derive(Debug, Clone, Default)]
pub struct AudioField {
    /// Client-supplied filename.
    pub filename: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Multipart body of `POST /remix`, collected but not yet checked.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    /// The `audio` file part, if any.
    pub audio: Option<AudioField>,
    /// The `prompt` text field.
    pub prompt: Option<String>,
    /// The `duration` text field.
    pub duration: Option<String>,
}

/// A validated text generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrompt {
    /// Non-blank prompt.
    pub prompt: String,
    /// Duration in seconds.
    pub duration: u32,
}

/// A validated remix request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUpload {
    /// Non-blank prompt.
    pub prompt: String,
    /// Duration in seconds.
    pub duration: u32,
    /// Uploaded audio.
    pub bytes: Vec<u8>,
    /// Client-supplied filename.
    pub filename: String,
    /// Lowercased extension, one of [`ALLOWED_AUDIO_EXTENSIONS`].
    pub extension: String,
}

/// Validate a text-to-music request.
///
/// # Errors
///
/// `MissingPrompt` when the prompt is absent or blank, `InvalidDuration` when
/// the duration is not a positive integer within `bounds`.
pub fn validate_text_prompt(payload: &GeneratePayload, bounds: DurationBounds) -> Result<TextPrompt> {
    let prompt = require_prompt(payload.prompt.as_deref())?;
    let duration = match &payload.duration {
        None => bounds.default_seconds,
        Some(value) => duration_from_json(value, bounds)?,
    };

    Ok(TextPrompt { prompt, duration })
}

/// Validate a text-to-video request.
///
/// # Errors
///
/// `MissingVisualPrompt` when the prompt is absent or blank.
pub fn validate_video_prompt(payload: &VideoPayload) -> Result<String> {
    require_prompt(payload.prompt.as_deref()).map_err(|_| ValidationError::MissingVisualPrompt)
}

/// Validate a remix upload.
///
/// File checks run first, then the prompt, then the duration.
///
/// # Errors
///
/// `MissingFile`, `InvalidFileType`, `MissingPrompt` or `InvalidDuration`.
pub fn validate_audio_upload(form: UploadForm, bounds: DurationBounds) -> Result<AudioUpload> {
    let audio = form
        .audio
        .filter(|field| !field.filename.is_empty())
        .ok_or(ValidationError::MissingFile)?;

    let extension = allowed_extension(&audio.filename).ok_or_else(|| {
        ValidationError::InvalidFileType {
            filename: audio.filename.clone(),
        }
    })?;

    let prompt = require_prompt(form.prompt.as_deref())?;
    let duration = match form.duration.as_deref() {
        None => bounds.default_seconds,
        Some(raw) => duration_from_str(raw, bounds)?,
    };

    Ok(AudioUpload {
        prompt,
        duration,
        bytes: audio.bytes,
        filename: audio.filename,
        extension,
    })
}

/// Return the lowercased extension of `filename` if it is whitelisted.
#[must_use]
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_AUDIO_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

fn require_prompt(prompt: Option<&str>) -> Result<String> {
    match prompt {
        Some(p) if !p.trim().is_empty() => Ok(p.to_string()),
        _ => Err(ValidationError::MissingPrompt),
    }
}

fn duration_from_json(value: &serde_json::Value, bounds: DurationBounds) -> Result<u32> {
    match value {
        serde_json::Value::Number(n) => {
            let secs = n
                .as_u64()
                .ok_or_else(|| ValidationError::InvalidDuration(format!("{n} is not a positive integer")))?;
            check_bounds(secs, bounds)
        }
        serde_json::Value::String(s) => duration_from_str(s, bounds),
        other => Err(ValidationError::InvalidDuration(format!(
            "{other} is not a positive integer"
        ))),
    }
}

fn duration_from_str(raw: &str, bounds: DurationBounds) -> Result<u32> {
    let trimmed = raw.trim();
    let secs = trimmed.parse::<u64>().map_err(|_| {
        ValidationError::InvalidDuration(format!("{trimmed:?} is not a positive integer"))
    })?;
    check_bounds(secs, bounds)
}

fn check_bounds(secs: u64, bounds: DurationBounds) -> Result<u32> {
    if secs == 0 {
        return Err(ValidationError::InvalidDuration(
            "duration must be at least 1 second".into(),
        ));
    }
    match u32::try_from(secs) {
        Ok(s) if s <= bounds.max_seconds => Ok(s),
        _ => Err(ValidationError::InvalidDuration(format!(
            "duration must be at most {} seconds",
            bounds.max_seconds
        ))),
    }
}
