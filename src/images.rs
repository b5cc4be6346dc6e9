//! TMDB image CDN size table and URL derivation.
//!
//! TMDB returns image references as bare file paths (`/abc123.jpg`). The CDN
//! serves each one at a fixed set of widths per image kind; this module turns
//! a path into the full `size -> url` mapping for its kind.

use serde_json::{Map, Value};

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/";

const POSTER_SIZES: &[&str] = &["original", "w92", "w154", "w185", "w342", "w500", "w780"];
const BACKDROP_SIZES: &[&str] = &["original", "w300", "w780", "w1280"];
const LOGO_SIZES: &[&str] = &["original", "w45", "w92", "w154", "w185", "w300", "w500"];
const PROFILE_SIZES: &[&str] = &["original", "w45", "w185", "h632"];
const STILL_SIZES: &[&str] = &["original", "w92", "w185", "w300"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageCategory {
    Poster,
    Backdrop,
    Logo,
    Profile,
    Still,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 5] = [
        ImageCategory::Poster,
        ImageCategory::Backdrop,
        ImageCategory::Logo,
        ImageCategory::Profile,
        ImageCategory::Still,
    ];

    /// Size tokens the CDN accepts for this kind of image, `original` first.
    pub fn sizes(self) -> &'static [&'static str] {
        match self {
            ImageCategory::Poster => POSTER_SIZES,
            ImageCategory::Backdrop => BACKDROP_SIZES,
            ImageCategory::Logo => LOGO_SIZES,
            ImageCategory::Profile => PROFILE_SIZES,
            ImageCategory::Still => STILL_SIZES,
        }
    }
}

/// Builds the CDN URL for one size. A leading slash on `path` is dropped so
/// the size and path are joined by exactly one `/`.
pub fn image_url(size: &str, path: &str) -> String {
    format!("{IMAGE_BASE}{size}/{}", path.trim_start_matches('/'))
}

/// Maps every size of `category` to its URL, or `None` when there is no path.
pub fn image_urls(path: Option<&str>, category: ImageCategory) -> Option<Map<String, Value>> {
    let path = path.filter(|p| !p.is_empty())?;
    Some(
        category
            .sizes()
            .iter()
            .map(|size| (size.to_string(), Value::String(image_url(size, path))))
            .collect(),
    )
}

/// Same as [`image_urls`] but reads the path from a JSON value and yields JSON `null`
/// for anything that is not a non-empty string.
pub fn image_urls_value(path: Option<&Value>, category: ImageCategory) -> Value {
    image_urls(path.and_then(Value::as_str), category)
        .map(Value::Object)
        .unwrap_or(Value::Null)
}
