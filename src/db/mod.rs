mod schema;
pub mod access;
pub mod cache;
pub mod items;
pub mod query;
pub mod users;

use rusqlite::Connection;
use std::path::Path;

use crate::error::Result;

pub use items::{
    recompute_relative_path, recompute_relative_url, Item, ItemType, NewItem, ROOT_ID,
};
pub use query::{escape_for_like, Column, Comparison, Condition, ItemQuery, SortOrder};
pub use schema::{MIGRATIONS, SCHEMA, SEED};

/// The tree store: one SQLite connection holding items, users, grants and
/// short-lived cache entries.
pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create tables, run migrations and insert the seed rows. Safe to call
    /// on an existing database.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(SCHEMA)?;
        self.run_migrations()?;
        self.conn.execute_batch(SEED)?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        for migration in MIGRATIONS {
            let _ = self.conn.execute(migration, []);
        }
        Ok(())
    }
}
