//! Typed filters for `items` queries.
//!
//! Item helpers describe what they want (parent, sort column comparison,
//! viewable restriction, ordering) and [`ItemQuery::to_sql`] renders it with
//! positional parameters. Column names never come from caller strings: they
//! are always one of the [`Column`] variants.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::error::GalleryError;
use crate::identity::User;

/// Columns of the `items` table that can be filtered or sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    ParentId,
    Type,
    Name,
    Slug,
    Title,
    Level,
    Weight,
    AlbumCoverItemId,
    RelativePathCache,
    RelativeUrlCache,
    OwnerId,
    Captured,
    Created,
    Updated,
    ViewCount,
    RandKey,
}

impl Column {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ParentId => "parent_id",
            Self::Type => "type",
            Self::Name => "name",
            Self::Slug => "slug",
            Self::Title => "title",
            Self::Level => "level",
            Self::Weight => "weight",
            Self::AlbumCoverItemId => "album_cover_item_id",
            Self::RelativePathCache => "relative_path_cache",
            Self::RelativeUrlCache => "relative_url_cache",
            Self::OwnerId => "owner_id",
            Self::Captured => "captured",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::ViewCount => "view_count",
            Self::RandKey => "rand_key",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Column {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let column = match s.trim() {
            "id" => Self::Id,
            "parent_id" => Self::ParentId,
            "type" => Self::Type,
            "name" => Self::Name,
            "slug" => Self::Slug,
            "title" => Self::Title,
            "level" => Self::Level,
            "weight" => Self::Weight,
            "album_cover_item_id" => Self::AlbumCoverItemId,
            "relative_path_cache" => Self::RelativePathCache,
            "relative_url_cache" => Self::RelativeUrlCache,
            "owner_id" => Self::OwnerId,
            "captured" => Self::Captured,
            "created" => Self::Created,
            "updated" => Self::Updated,
            "view_count" => Self::ViewCount,
            "rand_key" => Self::RandKey,
            other => {
                return Err(GalleryError::InvalidValue {
                    field: "column",
                    value: other.to_string(),
                })
            }
        };
        Ok(column)
    }
}

/// Direction an album sorts its children in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortOrder {
    type Err = GalleryError;

    /// Anything that is not (case-insensitively) `DESC` sorts ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("DESC") {
            Ok(Self::Desc)
        } else {
            Ok(Self::Asc)
        }
    }
}

/// Binary comparison operators usable in a [`Condition::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    Greater,
}

impl Comparison {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::Greater => ">",
        }
    }
}

/// A single `WHERE` term. Terms are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Column, Value),
    Compare(Column, Comparison, Value),
    IsNull(Column),
    /// `column LIKE 'prefix%'`, with LIKE metacharacters in the prefix escaped.
    StartsWith(Column, String),
    /// Random threshold: `column < <random value in [0, 1)>`.
    BelowRandom(Column),
}

impl Condition {
    pub fn eq(column: Column, value: impl Into<Value>) -> Self {
        Self::Eq(column, value.into())
    }
}

/// Escape `%`, `_` and the escape character itself for use in a LIKE pattern
/// declared with `ESCAPE '\'`.
pub fn escape_for_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A filtered, ordered query over `items`.
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    conditions: Vec<Condition>,
    /// Group ids allowed to see the rows; `None` means unrestricted.
    viewable_groups: Option<Vec<i64>>,
    order_by: Vec<(Column, SortOrder)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filters(mut self, conditions: &[Condition]) -> Self {
        self.conditions.extend_from_slice(conditions);
        self
    }

    pub fn where_eq(self, column: Column, value: impl Into<Value>) -> Self {
        self.filter(Condition::eq(column, value))
    }

    /// Restrict to items the user can view. Admins see everything; a
    /// non-admin with no groups sees nothing.
    pub fn viewable(mut self, user: &User) -> Self {
        if !user.admin {
            self.viewable_groups = Some(user.group_ids.clone());
        }
        self
    }

    pub fn order_by(mut self, column: Column, order: SortOrder) -> Self {
        self.order_by.push((column, order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Render as SQL selecting `select` from `items`. Returns the statement
    /// and its positional parameters.
    pub fn to_sql(&self, select: &str) -> (String, Vec<Value>) {
        let mut params: Vec<Value> = Vec::new();
        let mut terms: Vec<String> = Vec::new();

        for condition in &self.conditions {
            match condition {
                Condition::Eq(column, value) => {
                    params.push(value.clone());
                    terms.push(format!("items.{} = ?{}", column, params.len()));
                }
                Condition::Compare(column, op, value) => {
                    params.push(value.clone());
                    terms.push(format!("items.{} {} ?{}", column, op.as_sql(), params.len()));
                }
                Condition::IsNull(column) => {
                    terms.push(format!("items.{} IS NULL", column));
                }
                Condition::StartsWith(column, prefix) => {
                    params.push(Value::Text(format!("{}%", escape_for_like(prefix))));
                    terms.push(format!("items.{} LIKE ?{} ESCAPE '\\'", column, params.len()));
                }
                Condition::BelowRandom(column) => {
                    terms.push(format!(
                        "items.{} < (ABS(RANDOM()) % 1000000) / 1000000.0",
                        column
                    ));
                }
            }
        }

        if let Some(groups) = &self.viewable_groups {
            if groups.is_empty() {
                terms.push("0".to_string());
            } else {
                let mut placeholders = Vec::with_capacity(groups.len());
                for group in groups {
                    params.push(Value::Integer(*group));
                    placeholders.push(format!("?{}", params.len()));
                }
                terms.push(format!(
                    "EXISTS (SELECT 1 FROM access_cache ac WHERE ac.item_id = items.id \
                     AND ac.view = 1 AND ac.group_id IN ({}))",
                    placeholders.join(", ")
                ));
            }
        }

        let mut sql = format!("SELECT {} FROM items", select);
        if !terms.is_empty() {
            let _ = write!(sql, " WHERE {}", terms.join(" AND "));
        }
        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, order)| format!("items.{} {}", column, order))
                .collect();
            let _ = write!(sql, " ORDER BY {}", order.join(", "));
        }
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                let _ = write!(sql, " LIMIT {} OFFSET {}", limit, offset);
            }
            (Some(limit), None) => {
                let _ = write!(sql, " LIMIT {}", limit);
            }
            (None, Some(offset)) => {
                let _ = write!(sql, " LIMIT -1 OFFSET {}", offset);
            }
            (None, None) => {}
        }

        (sql, params)
    }
}
