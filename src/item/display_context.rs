//! Per-session browsing context: which sibling list an item is being viewed
//! in, and its neighbours in that list.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::access::Permission;
use crate::context::RequestContext;
use crate::db::{Column, Condition, Database, Item, ItemType};
use crate::error::Result;
use crate::item::{album_children_query, get_position};

const CACHE_TAG: &str = "display_context";

/// Where the session's current sibling list comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextSource {
    /// Every child of the parent album.
    #[default]
    Album,
    /// Only children of one type, e.g. photos without sub-albums.
    AlbumOfType { item_type: ItemType },
}

impl ContextSource {
    pub fn filters(&self) -> Vec<Condition> {
        match self {
            Self::Album => Vec::new(),
            Self::AlbumOfType { item_type } => vec![Condition::Eq(
                Column::Type,
                Value::Text(item_type.as_str().to_string()),
            )],
        }
    }
}

/// An item's place in the sibling list the session is browsing.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayContext {
    pub source: ContextSource,
    /// 1-based.
    pub position: i64,
    pub sibling_count: i64,
    pub previous_item: Option<Item>,
    pub next_item: Option<Item>,
    /// Viewable ancestors, root first.
    pub parents: Vec<Item>,
}

fn cache_key(session_id: &str) -> String {
    format!("display_context_{}", session_id)
}

/// Remember `source` for this session. Robots get no context.
pub fn set_display_context(ctx: &RequestContext, source: &ContextSource, ttl_secs: Option<i64>) -> Result<()> {
    if ctx.session.is_robot() {
        return Ok(());
    }
    let value = serde_json::to_string(source)?;
    ctx.db
        .cache_set(&cache_key(&ctx.session.id), &value, &[CACHE_TAG], ttl_secs)
}

pub fn clear_display_context(ctx: &RequestContext) -> Result<()> {
    ctx.db.cache_delete(&cache_key(&ctx.session.id))
}

/// Drop the stored context of every session. Returns how many were removed.
pub fn purge_display_contexts(db: &Database) -> Result<usize> {
    let removed = db.cache_delete_tag(CACHE_TAG)?;
    tracing::debug!(removed, "Purged display contexts");
    Ok(removed)
}

fn load_source(ctx: &RequestContext) -> Result<ContextSource> {
    if ctx.session.is_robot() {
        return Ok(ContextSource::default());
    }
    let Some(raw) = ctx.db.cache_get(&cache_key(&ctx.session.id))? else {
        return Ok(ContextSource::default());
    };
    match serde_json::from_str(&raw) {
        Ok(source) => Ok(source),
        Err(e) => {
            tracing::warn!(session = %ctx.session.id, "Ignoring unreadable display context: {}", e);
            Ok(ContextSource::default())
        }
    }
}

/// Position, neighbours and breadcrumb of `item` within the session's
/// current sibling list.
pub fn get_display_context(ctx: &RequestContext, item: &Item) -> Result<DisplayContext> {
    let source = load_source(ctx)?;

    let mut parents = Vec::new();
    for ancestor in ctx.db.ancestors(item)? {
        if ctx.access.can(Permission::View, &ancestor)? {
            parents.push(ancestor);
        }
    }

    let Some(parent) = ctx.db.parent(item)? else {
        return Ok(DisplayContext {
            source,
            position: 1,
            sibling_count: 1,
            previous_item: None,
            next_item: None,
            parents,
        });
    };

    let filters = source.filters();
    let siblings = album_children_query(&parent)
        .viewable(ctx.user())
        .filters(&filters);
    let sibling_count = ctx.db.count_items(&siblings)?;
    let position = get_position(ctx, item, &filters)?;

    // The item and one neighbour on each side.
    let window = if position > 1 {
        siblings.offset((position - 2) as u32).limit(3)
    } else {
        siblings.offset(0).limit(2)
    };
    let window = ctx.db.find_items(&window)?;

    let (previous_item, next_item) = match window.iter().position(|i| i.id == item.id) {
        Some(index) => (
            index.checked_sub(1).and_then(|i| window.get(i)).cloned(),
            window.get(index + 1).cloned(),
        ),
        None => (None, None),
    };

    Ok(DisplayContext {
        source,
        position,
        sibling_count,
        previous_item,
        next_item,
        parents,
    })
}
