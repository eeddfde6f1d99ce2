//! Error types for the extraction and renaming pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while processing a message file
#[derive(Error, Debug)]
pub enum Error {
    /// A mandatory header (sender or sent date) could not be determined
    #[error("Cannot get {field} field from: {}", path.display())]
    Header { path: PathBuf, field: &'static str },

    /// Failed to read a message file
    #[error("Failed loading email {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rename system call failed
    #[error("Cannot rename file: {} - {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every `[1]`..`[1023]` suffix is already taken
    #[error("No free collision suffix left for: {}", path.display())]
    CollisionExhausted { path: PathBuf },

    /// Creation time or document property write failed
    #[error("Failed writing metadata for {}: {details}", path.display())]
    MetadataWrite { path: PathBuf, details: String },

    /// Directory traversal failed
    #[error("Failed walking folder: {0}")]
    Walk(#[from] walkdir::Error),

    /// The external PST conversion tool failed
    #[error("PST extraction failed: {0}")]
    Extractor(String),
}

impl Error {
    /// Whether strict mode should abort the whole walk on this error.
    ///
    /// Metadata writes are best-effort; everything else is a hard failure.
    #[must_use]
    pub const fn is_fatal_to_walk(&self) -> bool {
        !matches!(self, Self::MetadataWrite { .. })
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
