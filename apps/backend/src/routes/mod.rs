pub mod audio;
pub mod corpus;
pub mod progress;
pub mod pronounce;
pub mod study;

use flashcard_core::Category;

use crate::error::{ApiError, Result};

/// URL prefix the audio content root is served under.
pub const AUDIO_ROUTE: &str = "/audio";

/// Category from a path segment; unknown names are 404.
pub(crate) fn parse_category(name: &str) -> Result<Category> {
    Category::from_str(name).ok_or_else(|| ApiError::NotFound(format!("category {name}")))
}
