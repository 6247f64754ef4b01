//! Error types for request validation.

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Errors raised while checking an inbound generation request.
///
/// The `Display` text is user-facing and is returned verbatim in 400 responses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Prompt absent or blank.
    #[error("Prompt is required")]
    MissingPrompt,

    /// Video prompt absent or blank.
    #[error("Visual prompt is required")]
    MissingVisualPrompt,

    /// Duration is not a positive integer within bounds.
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// No `audio` file part, or the part had an empty filename.
    #[error("No audio file uploaded")]
    MissingFile,

    /// Uploaded file extension is not whitelisted.
    #[error("Invalid file type. Only MP3/WAV/OGG/M4A allowed.")]
    InvalidFileType {
        /// The rejected filename.
        filename: String,
    },
}
