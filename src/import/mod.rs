//! Bulk import of a directory tree into an album.

pub mod metadata;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::access::Permission;
use crate::config::ImportConfig;
use crate::context::RequestContext;
use crate::db::{Item, NewItem};
use crate::error::{GalleryError, Result};
use crate::graphics::var_file;
use crate::item::{make_album_cover, relative_path};

pub use metadata::{read_metadata, MediaMetadata};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub albums: usize,
    pub photos: usize,
    pub movies: usize,
    pub skipped: usize,
}

/// Import everything below `dir` into `parent`: directories become albums,
/// files with a known image or movie extension become photos or movies, and
/// everything else is skipped. Originals are copied under `albums_dir`.
/// Albums left without a cover get their first imported child.
pub fn import_directory(
    ctx: &RequestContext,
    parent: &Item,
    dir: &Path,
    options: &ImportConfig,
    albums_dir: &Path,
) -> Result<ImportSummary> {
    ctx.access.required(Permission::Edit, parent)?;
    if !parent.is_album() {
        return Err(GalleryError::NotAnAlbum(parent.id));
    }

    let owner_id = ctx.session.logged_in_user().map(|user| user.id);
    let mut summary = ImportSummary::default();
    // Source directory -> album it was imported as.
    let mut albums: HashMap<PathBuf, i64> = HashMap::new();
    albums.insert(dir.to_path_buf(), parent.id);

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        let Some(album_id) = path.parent().and_then(|p| albums.get(p)).copied() else {
            // Parent directory was not imported.
            continue;
        };
        let album = ctx.db.load_item(album_id)?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if entry.file_type().is_dir() {
            let mut new = NewItem::album(name);
            new.owner_id = owner_id;
            let created = ctx.db.insert_item(&album, new)?;
            fs::create_dir_all(var_file(albums_dir, &relative_path(ctx.db, &created)?))?;
            albums.insert(path.to_path_buf(), created.id);
            summary.albums += 1;
            debug!(id = created.id, path = %path.display(), "Imported album");
            continue;
        }

        if !entry.file_type().is_file() {
            summary.skipped += 1;
            continue;
        }

        let mut new = if options.is_image(path) {
            NewItem::photo(name)
        } else if options.is_movie(path) {
            NewItem::movie(name)
        } else {
            warn!(path = %path.display(), "Skipping file with unknown extension");
            summary.skipped += 1;
            continue;
        };

        let metadata = read_metadata(path);
        new.owner_id = owner_id;
        new.width = metadata.width;
        new.height = metadata.height;
        new.mime_type = metadata.mime_type;
        new.captured = metadata.captured;

        let created = ctx.db.insert_item(&album, new)?;
        let dest = var_file(albums_dir, &relative_path(ctx.db, &created)?);
        if let Some(parent_dir) = dest.parent() {
            fs::create_dir_all(parent_dir)?;
        }
        fs::copy(path, &dest)?;
        ctx.graphics.generate(ctx.db, &created)?;

        if created.is_photo() {
            summary.photos += 1;
        } else {
            summary.movies += 1;
        }

        if ctx.db.load_item(album_id)?.album_cover_item_id.is_none() {
            make_album_cover(ctx, &created)?;
        }
        debug!(id = created.id, path = %path.display(), "Imported file");
    }

    info!(
        into = parent.id,
        albums = summary.albums,
        photos = summary.photos,
        movies = summary.movies,
        skipped = summary.skipped,
        "Import finished"
    );
    Ok(summary)
}
