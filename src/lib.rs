//! Photo gallery core: an album/photo/movie tree in SQLite with path and url
//! lookup, per-group access control, album covers and derived images.

pub mod access;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod graphics;
pub mod identity;
pub mod import;
pub mod item;
pub mod logging;
pub mod menu;
pub mod message;

#[cfg(test)]
mod test_support;

pub use context::RequestContext;
pub use error::{GalleryError, Result};
