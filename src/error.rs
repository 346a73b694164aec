//! Error type shared by the library.

use thiserror::Error;

use crate::access::Permission;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("permission denied: {permission} access to item {item_id}")]
    PermissionDenied { permission: Permission, item_id: i64 },

    #[error("item {0} not found")]
    ItemNotFound(i64),

    #[error("item {0} has no parent album")]
    NoParent(i64),

    #[error("item {0} is not an album")]
    NotAnAlbum(i64),

    #[error("cannot move item {source_id} into item {target_id}")]
    InvalidMove { source_id: i64, target_id: i64 },

    #[error("invalid {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
