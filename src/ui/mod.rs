/// User interface module
///
/// - View-model built from the grouped roster (view_model.rs)
/// - Card grid, detail panel and modal overlay widgets (card.rs)
/// - Photo thumbnails for cards (photo.rs)

pub mod card;
pub mod photo;
pub mod view_model;
