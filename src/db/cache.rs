//! Short-lived key/value entries with optional expiry and tags.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;

impl Database {
    /// Store `value` under `key`, replacing any previous entry. `ttl_secs`
    /// of `None` never expires.
    pub fn cache_set(&self, key: &str, value: &str, tags: &[&str], ttl_secs: Option<i64>) -> Result<()> {
        let expiration = ttl_secs.map(|ttl| Utc::now().timestamp() + ttl);
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(",{},", tags.join(","))
        };
        self.conn.execute(
            r#"
            INSERT INTO caches (key, tags, expiration, cache) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                tags = excluded.tags, expiration = excluded.expiration, cache = excluded.cache
            "#,
            params![key, tags, expiration, value],
        )?;
        Ok(())
    }

    /// Fetch a live entry. An expired entry is deleted and reported as missing.
    pub fn cache_get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(Option<i64>, String)> = self
            .conn
            .query_row(
                "SELECT expiration, cache FROM caches WHERE key = ?",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((Some(expiration), _)) if expiration <= Utc::now().timestamp() => {
                self.cache_delete(key)?;
                Ok(None)
            }
            Some((_, value)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    pub fn cache_delete(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM caches WHERE key = ?", [key])?;
        Ok(())
    }

    /// Delete every entry carrying `tag`. Returns the number removed.
    pub fn cache_delete_tag(&self, tag: &str) -> Result<usize> {
        let pattern = format!("%,{},%", super::escape_for_like(tag));
        let removed = self.conn.execute(
            "DELETE FROM caches WHERE tags LIKE ? ESCAPE '\\'",
            [pattern],
        )?;
        Ok(removed)
    }

    pub fn cache_purge_expired(&self) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM caches WHERE expiration IS NOT NULL AND expiration <= ?",
            [Utc::now().timestamp()],
        )?;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired cache entries");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;

    #[test]
    fn test_set_get_delete() {
        let db = test_db();
        db.cache_set("k", "v1", &[], None).unwrap();
        db.cache_set("k", "v2", &[], Some(60)).unwrap();
        assert_eq!(db.cache_get("k").unwrap().as_deref(), Some("v2"));

        db.cache_delete("k").unwrap();
        assert!(db.cache_get("k").unwrap().is_none());
    }

    #[test]
    fn test_expired_entries_are_missing() {
        let db = test_db();
        db.cache_set("old", "x", &[], Some(-1)).unwrap();
        assert!(db.cache_get("old").unwrap().is_none());

        db.cache_set("older", "x", &[], Some(-10)).unwrap();
        db.cache_set("fresh", "x", &[], Some(600)).unwrap();
        assert_eq!(db.cache_purge_expired().unwrap(), 1);
        assert!(db.cache_get("fresh").unwrap().is_some());
    }

    #[test]
    fn test_delete_by_tag() {
        let db = test_db();
        db.cache_set("a", "1", &["display_context"], None).unwrap();
        db.cache_set("b", "2", &["display_context", "other"], None).unwrap();
        db.cache_set("c", "3", &["other"], None).unwrap();

        assert_eq!(db.cache_delete_tag("display_context").unwrap(), 2);
        assert!(db.cache_get("a").unwrap().is_none());
        assert_eq!(db.cache_get("c").unwrap().as_deref(), Some("3"));
    }
}
