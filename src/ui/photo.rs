use ::image::{imageops::FilterType, RgbaImage};
use iced::widget::image::Handle;

/// Size of card thumbnails (longest edge)
const THUMBNAIL_SIZE: u32 = 256;

/// File types offered by the photo picker
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Decode a stored photo and shrink it to thumbnail size
/// Returns None if the bytes are not a decodable image
pub fn decode_thumbnail(blob: &[u8]) -> Option<RgbaImage> {
    let img = ::image::load_from_memory(blob).ok()?;
    let thumbnail = img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Triangle);
    Some(thumbnail.to_rgba8())
}

/// Thumbnail ready for an iced image widget
pub fn thumbnail_handle(blob: &[u8]) -> Option<Handle> {
    let rgba = decode_thumbnail(blob)?;
    let (width, height) = rgba.dimensions();
    Some(Handle::from_rgba(width, height, rgba.into_raw()))
}
