//! Item helpers: tree operations on albums, photos and movies.
//!
//! Lookups ([`find_by_path`], [`find_by_relative_url`]) leave permission
//! checks to the caller. Everything that writes checks the request's access
//! gate before touching the store.

pub mod cover;
pub mod display_context;
pub mod naming;
pub mod path;
pub mod position;

use crate::access::Permission;
use crate::context::RequestContext;
use crate::db::{Column, Condition, Database, Item, ItemQuery, SortOrder};
use crate::error::{GalleryError, Result};

pub use cover::{make_album_cover, move_item, remove_album_cover};
pub use display_context::{
    clear_display_context, get_display_context, purge_display_contexts, set_display_context, ContextSource,
    DisplayContext,
};
pub use naming::{convert_filename_to_slug, convert_filename_to_title};
pub use path::{find_by_path, find_by_relative_url, relative_path, relative_url, VarDir};
pub use position::get_position;

/// Next weight to hand out: one above the highest weight in use.
pub fn get_max_weight(db: &Database) -> Result<i64> {
    db.next_weight()
}

/// Children of `album` in the album's own sort order, ties broken by id.
pub fn album_children_query(album: &Item) -> ItemQuery {
    let query = ItemQuery::new()
        .where_eq(Column::ParentId, album.id)
        .order_by(album.sort_column, album.sort_order);
    if album.sort_column == Column::Id {
        query
    } else {
        query.order_by(Column::Id, SortOrder::Asc)
    }
}

/// Children of `album` the session user can see.
pub fn viewable_children(ctx: &RequestContext, album: &Item) -> Result<Vec<Item>> {
    ctx.db.find_items(&album_children_query(album).viewable(ctx.user()))
}

/// Reset all child weights of `album` to 1..n following the album's current
/// sort order.
pub fn resequence_child_weights(ctx: &RequestContext, album: &Item) -> Result<()> {
    ctx.access.required(Permission::Edit, album)?;
    if !album.is_album() {
        return Err(GalleryError::NotAnAlbum(album.id));
    }

    let children = ctx.db.find_items(&album_children_query(album))?;
    for (weight, mut child) in (1..).zip(children) {
        child.weight = weight;
        ctx.db.save_item(&mut child)?;
    }
    tracing::debug!(album = album.id, "Resequenced child weights");
    Ok(())
}

/// A random viewable item: the one with the nearest `rand_key` below a random
/// threshold. Small or heavily filtered galleries may come back empty; call
/// again in that case.
pub fn random_item(ctx: &RequestContext, filters: &[Condition]) -> Result<Option<Item>> {
    let query = ItemQuery::new()
        .viewable(ctx.user())
        .filters(filters)
        .filter(Condition::BelowRandom(Column::RandKey))
        .order_by(Column::RandKey, SortOrder::Desc);
    ctx.db.find_item(&query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ROOT_ID;
    use crate::test_support::{album, album_sorted, photo, Harness};

    #[test]
    fn test_children_follow_album_sort() {
        let h = Harness::admin();
        let a = album_sorted(&h.db, ROOT_ID, "a", Column::Name, SortOrder::Desc);
        photo(&h.db, a.id, "m.jpg");
        photo(&h.db, a.id, "z.jpg");
        photo(&h.db, a.id, "b.jpg");

        let names: Vec<String> = viewable_children(&h.ctx(), &a)
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["z.jpg", "m.jpg", "b.jpg"]);
    }

    #[test]
    fn test_resequence_child_weights() {
        let h = Harness::admin();
        let a = album_sorted(&h.db, ROOT_ID, "a", Column::Name, SortOrder::Asc);
        let c = photo(&h.db, a.id, "c.jpg");
        let b = photo(&h.db, a.id, "b.jpg");
        let d = photo(&h.db, a.id, "d.jpg");

        resequence_child_weights(&h.ctx(), &a).unwrap();

        assert_eq!(h.reload(b.id).weight, 1);
        assert_eq!(h.reload(c.id).weight, 2);
        assert_eq!(h.reload(d.id).weight, 3);
    }

    #[test]
    fn test_resequence_requires_edit() {
        let h = Harness::guest();
        let a = album(&h.db, ROOT_ID, "a");
        let err = resequence_child_weights(&h.ctx(), &a).unwrap_err();
        assert!(matches!(err, GalleryError::PermissionDenied { permission: Permission::Edit, .. }));
    }

    #[test]
    fn test_max_weight_grows() {
        let h = Harness::admin();
        let before = get_max_weight(&h.db).unwrap();
        photo(&h.db, ROOT_ID, "x.jpg");
        assert_eq!(get_max_weight(&h.db).unwrap(), before + 1);
    }

    #[test]
    fn test_random_item_is_viewable_when_found() {
        let h = Harness::guest();
        let a = album(&h.db, ROOT_ID, "a");
        for i in 0..20 {
            photo(&h.db, a.id, &format!("{}.jpg", i));
        }
        for _ in 0..10 {
            if let Some(item) = random_item(&h.ctx(), &[]).unwrap() {
                assert!(h.ctx().access.can(Permission::View, &item).unwrap());
            }
        }
    }
}
