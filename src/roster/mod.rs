/// JMRI roster handling
///
/// This module handles:
/// - Parsing roster.xml and sorting it into groups (manifest.rs)
/// - Parsing per-locomotive detail documents (detail.rs)
/// - Field fallbacks shared by both parsers (defaults.rs)
/// - Loading a roster from a folder or the network (loader.rs)
/// - Free-text filtering of the rendered cards (filter.rs)

pub mod defaults;
pub mod detail;
pub mod filter;
pub mod loader;
pub mod manifest;
