//! Item rows: the album/photo/movie tree.

use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use super::query::{Column, ItemQuery, SortOrder};
use super::Database;
use crate::error::{GalleryError, Result};
use crate::item::naming::{convert_filename_to_slug, convert_filename_to_title};

/// Id of the root album.
pub const ROOT_ID: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Album,
    Photo,
    Movie,
}

impl ItemType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Photo => "photo",
            Self::Movie => "movie",
        }
    }

    /// Capitalized name for user-facing messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Album => "Album",
            Self::Photo => "Photo",
            Self::Movie => "Movie",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = GalleryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "album" => Ok(Self::Album),
            "photo" => Ok(Self::Photo),
            "movie" => Ok(Self::Movie),
            other => Err(GalleryError::InvalidValue {
                field: "item type",
                value: other.to_string(),
            }),
        }
    }
}

fn text_from_sql<T: FromStr<Err = GalleryError>>(value: ValueRef<'_>) -> FromSqlResult<T> {
    value
        .as_str()?
        .parse()
        .map_err(|e: GalleryError| FromSqlError::Other(Box::new(e)))
}

impl FromSql for ItemType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_from_sql(value)
    }
}

impl ToSql for ItemType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Column {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_from_sql(value)
    }
}

impl ToSql for Column {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_sql()))
    }
}

impl FromSql for SortOrder {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_from_sql(value)
    }
}

impl ToSql for SortOrder {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_sql()))
    }
}

/// A node in the gallery tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub item_type: ItemType,
    pub name: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub level: i64,
    pub weight: i64,
    pub sort_column: Column,
    pub sort_order: SortOrder,
    pub album_cover_item_id: Option<i64>,
    pub relative_path_cache: Option<String>,
    pub relative_url_cache: Option<String>,
    pub owner_id: Option<i64>,
    pub captured: Option<i64>,
    pub created: i64,
    pub updated: i64,
    pub view_count: i64,
    pub rand_key: f64,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub mime_type: Option<String>,
}

impl Item {
    pub fn is_album(&self) -> bool {
        self.item_type == ItemType::Album
    }

    pub fn is_photo(&self) -> bool {
        self.item_type == ItemType::Photo
    }

    pub fn is_movie(&self) -> bool {
        self.item_type == ItemType::Movie
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// The value this item contributes to an ORDER BY on `column`.
    pub fn sort_value(&self, column: Column) -> Value {
        fn int(v: Option<i64>) -> Value {
            v.map_or(Value::Null, Value::Integer)
        }
        fn text(v: &Option<String>) -> Value {
            v.clone().map_or(Value::Null, Value::Text)
        }

        match column {
            Column::Id => Value::Integer(self.id),
            Column::ParentId => int(self.parent_id),
            Column::Type => Value::Text(self.item_type.as_str().to_string()),
            Column::Name => Value::Text(self.name.clone()),
            Column::Slug => Value::Text(self.slug.clone()),
            Column::Title => Value::Text(self.title.clone()),
            Column::Level => Value::Integer(self.level),
            Column::Weight => Value::Integer(self.weight),
            Column::AlbumCoverItemId => int(self.album_cover_item_id),
            Column::RelativePathCache => text(&self.relative_path_cache),
            Column::RelativeUrlCache => text(&self.relative_url_cache),
            Column::OwnerId => int(self.owner_id),
            Column::Captured => int(self.captured),
            Column::Created => Value::Integer(self.created),
            Column::Updated => Value::Integer(self.updated),
            Column::ViewCount => Value::Integer(self.view_count),
            Column::RandKey => Value::Real(self.rand_key),
        }
    }
}

/// Fields a caller provides when adding an item; the store fills in the rest.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub item_type: ItemType,
    pub name: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub sort_column: Column,
    pub sort_order: SortOrder,
    pub owner_id: Option<i64>,
    pub captured: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub mime_type: Option<String>,
}

impl NewItem {
    /// Title and slug are derived from the name. Photo and movie slugs leave
    /// the extension out.
    pub fn new(item_type: ItemType, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug_source = match item_type {
            ItemType::Album => name.as_str(),
            _ => name.rsplit_once('.').map_or(name.as_str(), |(stem, _)| stem),
        };
        Self {
            item_type,
            slug: convert_filename_to_slug(slug_source),
            title: convert_filename_to_title(&name),
            name,
            description: None,
            sort_column: Column::Weight,
            sort_order: SortOrder::Asc,
            owner_id: None,
            captured: None,
            width: None,
            height: None,
            mime_type: None,
        }
    }

    pub fn album(name: impl Into<String>) -> Self {
        Self::new(ItemType::Album, name)
    }

    pub fn photo(name: impl Into<String>) -> Self {
        Self::new(ItemType::Photo, name)
    }

    pub fn movie(name: impl Into<String>) -> Self {
        Self::new(ItemType::Movie, name)
    }

    pub fn sorted_by(mut self, column: Column, order: SortOrder) -> Self {
        self.sort_column = column;
        self.sort_order = order;
        self
    }
}

/// Relative path of `item` given its ancestor chain (root first): each
/// non-root name rawurlencoded, joined with `/`. The root's path is empty.
pub fn recompute_relative_path(ancestors: &[Item], item: &Item) -> String {
    if item.is_root() {
        return String::new();
    }
    ancestors
        .iter()
        .filter(|a| !a.is_root())
        .chain(std::iter::once(item))
        .map(|i| urlencoding::encode(&i.name).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative url of `item` given its ancestor chain: non-root slugs joined with `/`.
pub fn recompute_relative_url(ancestors: &[Item], item: &Item) -> String {
    if item.is_root() {
        return String::new();
    }
    ancestors
        .iter()
        .filter(|a| !a.is_root())
        .chain(std::iter::once(item))
        .map(|i| i.slug.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

const ITEM_COLUMNS: &str = "items.id, items.parent_id, items.type, items.name, items.slug, \
     items.title, items.description, items.level, items.weight, items.sort_column, \
     items.sort_order, items.album_cover_item_id, items.relative_path_cache, \
     items.relative_url_cache, items.owner_id, items.captured, items.created, items.updated, \
     items.view_count, items.rand_key, items.width, items.height, items.mime_type";

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        item_type: row.get(2)?,
        name: row.get(3)?,
        slug: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        level: row.get(7)?,
        weight: row.get(8)?,
        sort_column: row.get(9)?,
        sort_order: row.get(10)?,
        album_cover_item_id: row.get(11)?,
        relative_path_cache: row.get(12)?,
        relative_url_cache: row.get(13)?,
        owner_id: row.get(14)?,
        captured: row.get(15)?,
        created: row.get(16)?,
        updated: row.get(17)?,
        view_count: row.get(18)?,
        rand_key: row.get(19)?,
        width: row.get(20)?,
        height: row.get(21)?,
        mime_type: row.get(22)?,
    })
}

/// `photo.jpg` -> `photo-2.jpg`; albums and extensionless names just get the suffix.
fn suffixed_name(name: &str, suffix: u32, item_type: ItemType) -> String {
    match (item_type, name.rsplit_once('.')) {
        (ItemType::Album, _) | (_, None) => format!("{}-{}", name, suffix),
        (_, Some((stem, ext))) => format!("{}-{}.{}", stem, suffix, ext),
    }
}

impl Database {
    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn get_item(&self, id: i64) -> Result<Option<Item>> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS),
                [id],
                row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    /// Like [`Database::get_item`], but a missing row is an error.
    pub fn load_item(&self, id: i64) -> Result<Item> {
        self.get_item(id)?.ok_or(GalleryError::ItemNotFound(id))
    }

    pub fn root(&self) -> Result<Item> {
        self.load_item(ROOT_ID)
    }

    pub fn parent(&self, item: &Item) -> Result<Option<Item>> {
        match item.parent_id {
            Some(id) => self.get_item(id),
            None => Ok(None),
        }
    }

    pub fn find_items(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        let (sql, params) = query.to_sql(ITEM_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(params), row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    pub fn find_item(&self, query: &ItemQuery) -> Result<Option<Item>> {
        let query = query.clone().limit(1);
        Ok(self.find_items(&query)?.into_iter().next())
    }

    pub fn find_item_ids(&self, query: &ItemQuery) -> Result<Vec<i64>> {
        let (sql, params) = query.to_sql("items.id");
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(params), |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    pub fn count_items(&self, query: &ItemQuery) -> Result<i64> {
        let (sql, params) = query.to_sql("COUNT(*)");
        let count = self
            .conn
            .query_row(&sql, params_from_iter(params), |row| row.get(0))?;
        Ok(count)
    }

    /// Ancestors of `item`, root first, not including the item itself.
    pub fn ancestors(&self, item: &Item) -> Result<Vec<Item>> {
        let mut chain: Vec<Item> = Vec::new();
        let mut next = item.parent_id;
        while let Some(id) = next {
            if id == item.id || chain.iter().any(|a| a.id == id) {
                return Err(GalleryError::InvalidValue {
                    field: "parent_id",
                    value: format!("cycle through item {}", id),
                });
            }
            let parent = self.load_item(id)?;
            next = parent.parent_id;
            chain.push(parent);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Highest weight in the table plus one.
    pub fn next_weight(&self) -> Result<i64> {
        let weight = self.conn.query_row(
            "SELECT COALESCE(MAX(weight), 0) + 1 FROM items",
            [],
            |row| row.get(0),
        )?;
        Ok(weight)
    }

    pub fn update_path_caches(&self, id: i64, path: &str, url: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE items SET relative_path_cache = ?1, relative_url_cache = ?2 WHERE id = ?3",
            params![path, url, id],
        )?;
        Ok(())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Add a child to `parent`. Name and slug are made unique among the
    /// siblings, the weight is the next global weight, and the new item
    /// inherits the parent's access grants.
    pub fn insert_item(&self, parent: &Item, new: NewItem) -> Result<Item> {
        if !parent.is_album() {
            return Err(GalleryError::NotAnAlbum(parent.id));
        }

        let now = Utc::now().timestamp();
        let mut item = Item {
            id: 0,
            parent_id: Some(parent.id),
            item_type: new.item_type,
            name: new.name,
            slug: new.slug,
            title: new.title,
            description: new.description,
            level: parent.level + 1,
            weight: self.next_weight()?,
            sort_column: new.sort_column,
            sort_order: new.sort_order,
            album_cover_item_id: None,
            relative_path_cache: None,
            relative_url_cache: None,
            owner_id: new.owner_id,
            captured: new.captured,
            created: now,
            updated: now,
            view_count: 0,
            rand_key: 0.0,
            width: new.width,
            height: new.height,
            mime_type: new.mime_type,
        };
        self.resolve_sibling_conflicts(parent.id, &mut item)?;

        let mut ancestors = self.ancestors(parent)?;
        ancestors.push(parent.clone());
        let path = recompute_relative_path(&ancestors, &item);
        let url = recompute_relative_url(&ancestors, &item);

        self.conn.execute(
            r#"
            INSERT INTO items (
                parent_id, type, name, slug, title, description, level, weight,
                sort_column, sort_order, relative_path_cache, relative_url_cache,
                owner_id, captured, created, updated, rand_key, width, height, mime_type
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15,
                (ABS(RANDOM()) % 1000000) / 1000000.0, ?16, ?17, ?18
            )
            "#,
            params![
                item.parent_id,
                item.item_type,
                item.name,
                item.slug,
                item.title,
                item.description,
                item.level,
                item.weight,
                item.sort_column,
                item.sort_order,
                path,
                url,
                item.owner_id,
                item.captured,
                now,
                item.width,
                item.height,
                item.mime_type,
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        self.conn.execute(
            r#"
            INSERT INTO access_cache (item_id, group_id, view, edit)
            SELECT ?1, group_id, view, edit FROM access_cache WHERE item_id = ?2
            "#,
            params![id, parent.id],
        )?;

        tracing::debug!(id, parent = parent.id, name = %item.name, "Inserted item");
        self.load_item(id)
    }

    /// Persist `item`. When it was reparented or renamed, conflicting sibling
    /// names are resolved by renaming `item`, its level and path caches are
    /// recomputed, and its descendants get fresh levels and cleared caches.
    pub fn save_item(&self, item: &mut Item) -> Result<()> {
        let stored = self.load_item(item.id)?;
        let reparented = stored.parent_id != item.parent_id;
        let renamed = stored.name != item.name || stored.slug != item.slug;

        if reparented || renamed {
            if let Some(parent_id) = item.parent_id {
                let parent = self.load_item(parent_id)?;
                if !parent.is_album() {
                    return Err(GalleryError::NotAnAlbum(parent_id));
                }
                self.resolve_sibling_conflicts(parent_id, item)?;
                item.level = parent.level + 1;
            }
            let ancestors = self.ancestors(item)?;
            item.relative_path_cache = Some(recompute_relative_path(&ancestors, item));
            item.relative_url_cache = Some(recompute_relative_url(&ancestors, item));
        }
        item.updated = Utc::now().timestamp();

        self.conn.execute(
            r#"
            UPDATE items SET
                parent_id = ?1, name = ?2, slug = ?3, title = ?4, description = ?5,
                level = ?6, weight = ?7, sort_column = ?8, sort_order = ?9,
                album_cover_item_id = ?10, relative_path_cache = ?11, relative_url_cache = ?12,
                owner_id = ?13, captured = ?14, updated = ?15, view_count = ?16,
                width = ?17, height = ?18, mime_type = ?19
            WHERE id = ?20
            "#,
            params![
                item.parent_id,
                item.name,
                item.slug,
                item.title,
                item.description,
                item.level,
                item.weight,
                item.sort_column,
                item.sort_order,
                item.album_cover_item_id,
                item.relative_path_cache,
                item.relative_url_cache,
                item.owner_id,
                item.captured,
                item.updated,
                item.view_count,
                item.width,
                item.height,
                item.mime_type,
                item.id,
            ],
        )?;

        if reparented || renamed {
            self.reset_descendants(item.id, item.level)?;
        }
        Ok(())
    }

    /// Rename `item` until no sibling under `parent_id` shares its name or slug.
    fn resolve_sibling_conflicts(&self, parent_id: i64, item: &mut Item) -> Result<()> {
        let base_name = item.name.clone();
        let base_slug = item.slug.clone();
        let mut suffix = 0;
        while self.has_sibling_conflict(parent_id, item.id, &item.name, &item.slug)? {
            suffix += 1;
            item.name = suffixed_name(&base_name, suffix, item.item_type);
            item.slug = format!("{}-{}", base_slug, suffix);
        }
        Ok(())
    }

    fn has_sibling_conflict(&self, parent_id: i64, id: i64, name: &str, slug: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM items
            WHERE parent_id = ?1 AND id != ?2 AND (name = ?3 OR slug = ?4)
            "#,
            params![parent_id, id, name, slug],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Walk the subtree below `id` level by level, fixing levels and clearing
    /// the path caches so they are recomputed on next use.
    fn reset_descendants(&self, id: i64, level: i64) -> Result<()> {
        let mut queue = VecDeque::from([(id, level)]);
        while let Some((parent_id, parent_level)) = queue.pop_front() {
            let child_ids: Vec<i64> = {
                let mut stmt = self.conn.prepare("SELECT id FROM items WHERE parent_id = ?")?;
                let ids = stmt
                    .query_map([parent_id], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<i64>>>()?;
                ids
            };
            if child_ids.is_empty() {
                continue;
            }
            self.conn.execute(
                r#"
                UPDATE items
                SET level = ?1, relative_path_cache = NULL, relative_url_cache = NULL
                WHERE parent_id = ?2
                "#,
                params![parent_level + 1, parent_id],
            )?;
            queue.extend(child_ids.into_iter().map(|child| (child, parent_level + 1)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Condition;
    use crate::test_support::{album, photo, test_db};

    #[test]
    fn test_root_is_seeded() {
        let db = test_db();
        let root = db.root().unwrap();
        assert_eq!(root.id, ROOT_ID);
        assert!(root.is_album());
        assert!(root.is_root());
        assert_eq!(root.level, 1);
        assert_eq!(root.relative_path_cache.as_deref(), Some(""));
    }

    #[test]
    fn test_insert_sets_level_weight_and_caches() {
        let db = test_db();
        let vacation = album(&db, ROOT_ID, "Vacation 2024");
        let beach = photo(&db, vacation.id, "beach day.jpg");

        assert_eq!(vacation.level, 2);
        assert_eq!(beach.level, 3);
        assert!(beach.weight > vacation.weight);
        assert_eq!(beach.slug, "beach-day");
        assert_eq!(beach.title, "beach day");
        assert_eq!(beach.relative_path_cache.as_deref(), Some("Vacation%202024/beach%20day.jpg"));
        assert_eq!(beach.relative_url_cache.as_deref(), Some("vacation-2024/beach-day"));
    }

    #[test]
    fn test_insert_into_photo_is_rejected() {
        let db = test_db();
        let pic = photo(&db, ROOT_ID, "a.jpg");
        let err = db.insert_item(&pic, NewItem::photo("b.jpg")).unwrap_err();
        assert!(matches!(err, GalleryError::NotAnAlbum(id) if id == pic.id));
    }

    #[test]
    fn test_insert_renames_on_conflict() {
        let db = test_db();
        let first = photo(&db, ROOT_ID, "dup.jpg");
        let second = photo(&db, ROOT_ID, "dup.jpg");
        let third = photo(&db, ROOT_ID, "dup.jpg");

        assert_eq!(first.name, "dup.jpg");
        assert_eq!(second.name, "dup-1.jpg");
        assert_eq!(second.slug, "dup-1");
        assert_eq!(third.name, "dup-2.jpg");
    }

    #[test]
    fn test_insert_inherits_parent_access() {
        let db = test_db();
        let child = album(&db, ROOT_ID, "Public");
        let query = ItemQuery::new()
            .where_eq(Column::Id, child.id)
            .viewable(&db.guest().unwrap());
        assert_eq!(db.count_items(&query).unwrap(), 1);
    }

    #[test]
    fn test_ancestors_root_first() {
        let db = test_db();
        let a = album(&db, ROOT_ID, "a");
        let b = album(&db, a.id, "b");
        let c = photo(&db, b.id, "c.jpg");

        let chain: Vec<i64> = db.ancestors(&c).unwrap().iter().map(|i| i.id).collect();
        assert_eq!(chain, vec![ROOT_ID, a.id, b.id]);
        assert!(db.ancestors(&db.root().unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_reparent_fixes_levels_and_clears_descendant_caches() {
        let db = test_db();
        let a = album(&db, ROOT_ID, "a");
        let b = album(&db, ROOT_ID, "b");
        let inner = album(&db, a.id, "inner");
        let leaf = photo(&db, inner.id, "leaf.jpg");

        let mut moved = db.load_item(inner.id).unwrap();
        moved.parent_id = Some(b.id);
        db.save_item(&mut moved).unwrap();

        let moved = db.load_item(inner.id).unwrap();
        assert_eq!(moved.level, 3);
        assert_eq!(moved.relative_path_cache.as_deref(), Some("b/inner"));

        let leaf = db.load_item(leaf.id).unwrap();
        assert_eq!(leaf.level, 4);
        assert!(leaf.relative_path_cache.is_none());
        assert!(leaf.relative_url_cache.is_none());
    }

    #[test]
    fn test_count_and_find_with_conditions() {
        let db = test_db();
        let a = album(&db, ROOT_ID, "a");
        photo(&db, a.id, "x.jpg");
        photo(&db, a.id, "y.png");
        album(&db, a.id, "sub");

        let photos = ItemQuery::new()
            .where_eq(Column::ParentId, a.id)
            .filter(Condition::Eq(Column::Type, Value::Text("photo".to_string())));
        assert_eq!(db.count_items(&photos).unwrap(), 2);

        let named = ItemQuery::new()
            .where_eq(Column::ParentId, a.id)
            .filter(Condition::StartsWith(Column::Name, "x.".to_string()));
        assert_eq!(db.find_item(&named).unwrap().map(|i| i.name), Some("x.jpg".to_string()));
    }

    #[test]
    fn test_recompute_paths_encode_names() {
        let db = test_db();
        let a = album(&db, ROOT_ID, "Año & más");
        let p = photo(&db, a.id, "50%.jpg");
        let ancestors = db.ancestors(&p).unwrap();
        assert_eq!(recompute_relative_path(&ancestors, &p), "A%C3%B1o%20%26%20m%C3%A1s/50%25.jpg");
        assert_eq!(recompute_relative_url(&ancestors, &p), format!("{}/{}", a.slug, p.slug));
    }

    #[test]
    fn test_next_weight() {
        let db = test_db();
        let w = db.next_weight().unwrap();
        let item = photo(&db, ROOT_ID, "w.jpg");
        assert_eq!(item.weight, w);
        assert_eq!(db.next_weight().unwrap(), w + 1);
    }
}
