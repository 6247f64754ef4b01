//! Scratch files for staging uploads.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A uniquely named file that is removed when the guard is dropped.
///
/// Removal failures (e.g. the file is still held open elsewhere) are logged
/// and otherwise ignored.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Write `contents` to a new file named `remix-<uuid>.<extension>` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written. Any
    /// partially written file is removed.
    pub async fn create(dir: &Path, extension: &str, contents: &[u8]) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let guard = Self {
            path: dir.join(format!("remix-{}.{extension}", Uuid::new_v4())),
        };
        tokio::fs::write(&guard.path, contents).await?;

        tracing::debug!(path = %guard.path.display(), bytes = contents.len(), "Scratch file written");
        Ok(guard)
    }

    /// Location on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub async fn open(&self) -> io::Result<tokio::fs::File> {
        tokio::fs::File::open(self.path()).await
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let path = self.path();
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Scratch file removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove scratch file"
            ),
        }
    }
}
