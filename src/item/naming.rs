//! Turning uploaded filenames into titles and url slugs.

use regex::Regex;
use std::sync::LazyLock;

static EXTENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\..{3,4}$").expect("valid regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid regex"));
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").expect("valid regex"));
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));

/// Sanitize a filename into something presentable as an item title.
pub fn convert_filename_to_title(filename: &str) -> String {
    let title = filename.replace('_', " ");
    let title = EXTENSION.replace(&title, "");
    SPACES.replace_all(&title, " ").into_owned()
}

/// Convert a filename into something usable as a url component.
///
/// Non-ASCII characters are not transliterated; they end up as dashes.
pub fn convert_filename_to_slug(filename: &str) -> String {
    let slug = filename.replace('&', "-and-").replace(' ', "-").to_lowercase();
    let slug = NON_SLUG.replace_all(&slug, "-");
    let slug = DASHES.replace_all(&slug, "-");
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_filename() {
        assert_eq!(convert_filename_to_title("my_photo.jpeg"), "my photo");
        assert_eq!(convert_filename_to_title("beach__day.jpg"), "beach day");
        assert_eq!(convert_filename_to_title("holiday"), "holiday");
        // Only 3-4 character extensions are dropped.
        assert_eq!(convert_filename_to_title("archive.gz"), "archive.gz");
    }

    #[test]
    fn test_slug_from_filename() {
        assert_eq!(convert_filename_to_slug("Foo & Bar.jpg"), "foo-and-bar-jpg");
        assert_eq!(convert_filename_to_slug("  Summer   2024  "), "summer-2024");
        assert_eq!(convert_filename_to_slug("keep_under-score"), "keep_under-score");
        assert_eq!(convert_filename_to_slug("---"), "");
    }
}
