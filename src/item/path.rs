//! Resolving filesystem-style paths and url fragments to items.
//!
//! Both lookups try the denormalized cache column first and fall back to a
//! search by name (or slug) at the right tree level, recomputing each
//! candidate's path from its ancestors. The cache only makes lookups fast;
//! answers are always checked against the recomputed value.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::db::{
    recompute_relative_path, recompute_relative_url, Column, Condition, Database, Item, ItemQuery,
    SortOrder,
};
use crate::error::{GalleryError, Result};

/// Marker file name of an album's generated thumbnail.
pub const ALBUM_THUMB_NAME: &str = ".album.jpg";

/// Which file tree under `var/` a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarDir {
    /// Full-size originals; names match exactly.
    #[default]
    Albums,
    /// Derived thumbnails; movies and albums get `.jpg` thumbs.
    Thumbs,
    /// Derived resizes.
    Resizes,
}

impl VarDir {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Albums => "albums",
            Self::Thumbs => "thumbs",
            Self::Resizes => "resizes",
        }
    }
}

impl fmt::Display for VarDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VarDir {
    type Err = GalleryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "albums" => Ok(Self::Albums),
            "thumbs" => Ok(Self::Thumbs),
            "resizes" => Ok(Self::Resizes),
            other => Err(GalleryError::InvalidValue {
                field: "var dir",
                value: other.to_string(),
            }),
        }
    }
}

/// Relative path of `item` (rawurlencoded segments), from the cache when
/// present, otherwise recomputed and written back.
pub fn relative_path(db: &Database, item: &Item) -> Result<String> {
    match &item.relative_path_cache {
        Some(path) => Ok(path.clone()),
        None => Ok(refresh_path_caches(db, item)?.0),
    }
}

/// Relative url of `item` (slugs joined by `/`), from the cache when present.
pub fn relative_url(db: &Database, item: &Item) -> Result<String> {
    match &item.relative_url_cache {
        Some(url) => Ok(url.clone()),
        None => Ok(refresh_path_caches(db, item)?.1),
    }
}

/// Recompute both caches from the ancestor chain and store them.
fn refresh_path_caches(db: &Database, item: &Item) -> Result<(String, String)> {
    let ancestors = db.ancestors(item)?;
    let path = recompute_relative_path(&ancestors, item);
    let url = recompute_relative_url(&ancestors, item);
    if item.relative_path_cache.as_deref() != Some(path.as_str())
        || item.relative_url_cache.as_deref() != Some(url.as_str())
    {
        tracing::debug!(id = item.id, %path, "Refreshing path caches");
        db.update_path_caches(item.id, &path, &url)?;
    }
    Ok((path, url))
}

fn decode_path(encoded: &str) -> String {
    urlencoding::decode(encoded)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| encoded.to_string())
}

/// Drop a trailing `.ext` from the last path segment.
fn strip_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) if !path[dot + 1..].contains('/') => &path[..dot],
        _ => path,
    }
}

/// How a path is matched against item names.
struct PathMatch<'p> {
    path: &'p str,
    var_dir: VarDir,
    /// The path names the item exactly; otherwise it is the item's name with
    /// the extension swapped for `.jpg`.
    full_name: bool,
    album_thumb: bool,
}

impl<'p> PathMatch<'p> {
    fn parse(path: &'p str, var_dir: VarDir) -> Self {
        let path = path.trim_matches('/');

        if var_dir == VarDir::Thumbs
            && (path == ALBUM_THUMB_NAME || path.ends_with(&format!("/{}", ALBUM_THUMB_NAME)))
        {
            let album_path = path[..path.len() - ALBUM_THUMB_NAME.len()].trim_end_matches('/');
            return Self {
                path: album_path,
                var_dir,
                full_name: true,
                album_thumb: true,
            };
        }

        if var_dir != VarDir::Albums {
            if let Some(stem) = path.strip_suffix(".jpg") {
                return Self {
                    path: stem,
                    var_dir,
                    full_name: false,
                    album_thumb: false,
                };
            }
        }

        Self {
            path,
            var_dir,
            full_name: true,
            album_thumb: false,
        }
    }

    /// Whether `item`, found at this path, is something this var dir serves.
    fn accepts(&self, item: &Item) -> bool {
        if self.full_name {
            self.var_dir == VarDir::Albums || item.is_photo() || self.album_thumb
        } else {
            (item.is_movie() && self.var_dir == VarDir::Thumbs)
                || (item.is_photo() && item.name.ends_with(".jpg"))
        }
    }

    /// Compare a recomputed (encoded) relative path with the requested path.
    fn matches_path(&self, encoded: &str) -> bool {
        let decoded = decode_path(encoded);
        if self.full_name {
            decoded == self.path
        } else {
            strip_extension(&decoded) == self.path
        }
    }
}

/// Find an item by its path below one of the var dirs. `Ok(None)` when
/// nothing matches. The caller is responsible for permission checks on the
/// result.
///
/// For thumbs, `a/b/.album.jpg` names album `a/b`. For thumbs and resizes, a
/// path ending in `.jpg` may name an item whose real extension differs (a
/// movie's jpg thumbnail), so that suffix is matched against any extension.
pub fn find_by_path(db: &Database, path: &str, var_dir: VarDir) -> Result<Option<Item>> {
    let lookup = PathMatch::parse(path, var_dir);

    if lookup.path.is_empty() {
        return db.root().map(Some);
    }

    let encoded = lookup
        .path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    let cache_condition = if lookup.full_name {
        Condition::eq(Column::RelativePathCache, encoded)
    } else {
        Condition::StartsWith(Column::RelativePathCache, format!("{}.", encoded))
    };
    let cached = db.find_item(&ItemQuery::new().filter(cache_condition).order_by(Column::Id, SortOrder::Asc))?;
    if let Some(item) = cached {
        if lookup.accepts(&item) {
            let (path, _) = refresh_path_caches(db, &item)?;
            if lookup.matches_path(&path) {
                return Ok(Some(item));
            }
            tracing::debug!(id = item.id, "Stale relative_path_cache hit");
        }
    }

    // Cache miss or stale cache: search by name at the right depth.
    let segments: Vec<&str> = lookup.path.split('/').collect();
    let last = segments.last().copied().unwrap_or_default();
    let name_condition = if lookup.full_name {
        Condition::eq(Column::Name, last.to_string())
    } else {
        Condition::StartsWith(Column::Name, format!("{}.", last))
    };
    let candidates = db.find_items(
        &ItemQuery::new()
            .filter(name_condition)
            .where_eq(Column::Level, segments.len() as i64 + 1)
            .order_by(Column::Id, SortOrder::Asc),
    )?;

    for candidate in candidates {
        let (path, url) = refresh_path_caches(db, &candidate)?;
        if lookup.matches_path(&path) && lookup.accepts(&candidate) {
            return Ok(Some(Item {
                relative_path_cache: Some(path),
                relative_url_cache: Some(url),
                ..candidate
            }));
        }
    }

    tracing::debug!(path, %var_dir, "No item at path");
    Ok(None)
}

/// Find an item by its relative url (`a/b/c`, one slug per level). `Ok(None)`
/// when nothing matches. The caller is responsible for permission checks.
pub fn find_by_relative_url(db: &Database, relative_url: &str) -> Result<Option<Item>> {
    let cached = db.find_item(
        &ItemQuery::new()
            .where_eq(Column::RelativeUrlCache, relative_url.to_string())
            .order_by(Column::Id, SortOrder::Asc),
    )?;
    if let Some(item) = cached {
        let (_, url) = refresh_path_caches(db, &item)?;
        if url == relative_url {
            return Ok(Some(item));
        }
        tracing::debug!(id = item.id, "Stale relative_url_cache hit");
    }

    let segments: Vec<&str> = relative_url.split('/').collect();
    let last = segments.last().copied().unwrap_or_default();
    let candidates = db.find_items(
        &ItemQuery::new()
            .where_eq(Column::Slug, last.to_string())
            .where_eq(Column::Level, segments.len() as i64 + 1)
            .order_by(Column::Id, SortOrder::Asc),
    )?;

    for candidate in candidates {
        let (path, url) = refresh_path_caches(db, &candidate)?;
        if url == relative_url {
            return Ok(Some(Item {
                relative_path_cache: Some(path),
                relative_url_cache: Some(url),
                ..candidate
            }));
        }
    }
    Ok(None)
}
