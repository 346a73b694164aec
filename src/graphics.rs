//! Derived images: thumbnails and resizes under `var/`.

use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Config;
use crate::db::{Database, Item};
use crate::error::Result;
use crate::item::path::ALBUM_THUMB_NAME;
use crate::item::relative_path;

/// Rebuilds whatever derived files an item has after it changed.
pub trait DerivativeGenerator {
    fn generate(&self, db: &Database, item: &Item) -> Result<()>;
}

/// Writes thumbnails and resizes next to the originals' relative paths.
pub struct ThumbnailGenerator {
    albums_dir: PathBuf,
    thumbs_dir: PathBuf,
    resizes_dir: PathBuf,
    thumb_size: u32,
    resize_size: u32,
}

impl ThumbnailGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            albums_dir: config.albums_dir(),
            thumbs_dir: config.thumbs_dir(),
            resizes_dir: config.resizes_dir(),
            thumb_size: config.thumbnails.size,
            resize_size: config.resizes.size,
        }
    }

    fn generate_photo(&self, db: &Database, photo: &Item) -> Result<()> {
        let rel = relative_path(db, photo)?;
        let original = var_file(&self.albums_dir, &rel);
        let img = image::open(&original)?;

        save_image(&fit_within(&img, self.thumb_size), &var_file(&self.thumbs_dir, &rel))?;
        save_image(&fit_within(&img, self.resize_size), &var_file(&self.resizes_dir, &rel))?;
        debug!(id = photo.id, path = %original.display(), "Generated photo derivatives");
        Ok(())
    }

    /// `<album>/.album.jpg`, built from the cover. Stale thumbs of albums
    /// without a cover are removed.
    fn generate_album(&self, db: &Database, album: &Item) -> Result<()> {
        let album_thumb = var_file(&self.thumbs_dir, &relative_path(db, album)?).join(ALBUM_THUMB_NAME);

        let cover = match album.album_cover_item_id {
            Some(id) => db.get_item(id)?,
            None => None,
        };
        let Some(cover) = cover else {
            if album_thumb.exists() {
                fs::remove_file(&album_thumb)?;
                debug!(id = album.id, "Removed album thumbnail");
            }
            return Ok(());
        };

        let cover_rel = relative_path(db, &cover)?;
        let source = if cover.is_movie() {
            var_file(&self.thumbs_dir, &cover_rel).with_extension("jpg")
        } else {
            var_file(&self.albums_dir, &cover_rel)
        };
        if cover.is_movie() && !source.exists() {
            debug!(id = album.id, cover = cover.id, "Movie cover has no thumbnail yet");
            return Ok(());
        }

        let img = image::open(&source)?;
        save_image(&fit_within(&img, self.thumb_size), &album_thumb)?;
        debug!(id = album.id, cover = cover.id, "Generated album thumbnail");
        Ok(())
    }
}

impl DerivativeGenerator for ThumbnailGenerator {
    fn generate(&self, db: &Database, item: &Item) -> Result<()> {
        if item.is_album() {
            self.generate_album(db, item)
        } else if item.is_photo() {
            self.generate_photo(db, item)
        } else {
            debug!(id = item.id, "No frame extraction for movies; skipping");
            Ok(())
        }
    }
}

/// Turn an encoded relative path into a file below `root`.
pub fn var_file(root: &Path, encoded_rel: &str) -> PathBuf {
    encoded_rel
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| {
            let segment = urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string());
            path.join(segment)
        })
}

/// Scale down so neither edge exceeds `size`. Smaller images are kept as is.
fn fit_within(img: &DynamicImage, size: u32) -> DynamicImage {
    if img.width() <= size && img.height() <= size {
        img.clone()
    } else {
        img.thumbnail(size, size)
    }
}

/// Save in the format the extension names. JPEG has no alpha channel.
fn save_image(img: &DynamicImage, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let is_jpeg = dest
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);
    if is_jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8()).save(dest)?;
    } else {
        img.save(dest)?;
    }
    Ok(())
}
