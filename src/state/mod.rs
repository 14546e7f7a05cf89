/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The SQLite photo cache (photos.rs)
/// - Persistent settings and app directories (settings.rs)

pub mod data;
pub mod photos;
pub mod settings;
