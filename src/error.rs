/// Error types for the roster browser
///
/// Every failure is reported once and left to the user to retry.
/// Only `ManifestMissing` stops a load; everything else degrades.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Debug, Error)]
pub enum RosterError {
    /// The roster manifest could not be found or fetched
    #[error("roster.xml not found: {0}")]
    ManifestMissing(String),

    /// A document is missing its expected root structure
    #[error("Malformed document {document}: {reason}")]
    MalformedDocument { document: String, reason: String },

    /// A single locomotive detail document could not be loaded
    #[error("Could not load {file_name}: {reason}")]
    DetailFetchFailed { file_name: String, reason: String },

    /// The photo cache could not be opened or written
    #[error("Photo storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RosterError {
    pub fn malformed(document: impl Into<String>, reason: impl Into<String>) -> Self {
        RosterError::MalformedDocument {
            document: document.into(),
            reason: reason.into(),
        }
    }
}
