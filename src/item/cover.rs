//! Album covers and moving items between albums.
//!
//! A cover always points at a photo or movie, never at an album: when an
//! album is made the cover of its parent, the parent takes the album's own
//! cover instead.

use tracing::{debug, info};

use crate::access::Permission;
use crate::context::RequestContext;
use crate::db::Item;
use crate::error::{GalleryError, Result};
use crate::item::album_children_query;

/// One album whose cover is about to change.
struct CoverStep {
    album: Item,
    previous_cover: Option<i64>,
}

/// Make `item` the cover of its parent album.
///
/// Going up from there, every ancestor that has no cover yet (and that the
/// user can edit) gets the same cover. Afterwards, ancestors still pointing
/// at the replaced cover are repointed too. Every permission is checked
/// before the first write.
pub fn make_album_cover(ctx: &RequestContext, item: &Item) -> Result<()> {
    let item = ctx.db.load_item(item.id)?;
    let parent = ctx
        .db
        .parent(&item)?
        .ok_or(GalleryError::NoParent(item.id))?;

    ctx.access.required(Permission::View, &item)?;
    ctx.access.required(Permission::View, &parent)?;
    ctx.access.required(Permission::Edit, &parent)?;

    let cover_id = if item.is_album() {
        item.album_cover_item_id
    } else {
        Some(item.id)
    };

    // Plan the walk up the tree first so a denied check leaves nothing
    // half-written.
    let mut steps = vec![CoverStep {
        previous_cover: parent.album_cover_item_id,
        album: parent,
    }];
    loop {
        let Some(current) = steps.last().map(|step| &step.album) else {
            break;
        };
        let Some(grandparent) = ctx.db.parent(current)? else {
            break;
        };
        if grandparent.album_cover_item_id.is_some()
            || !ctx.access.can(Permission::Edit, &grandparent)?
        {
            break;
        }
        ctx.access.required(Permission::View, current)?;
        ctx.access.required(Permission::View, &grandparent)?;
        steps.push(CoverStep {
            previous_cover: grandparent.album_cover_item_id,
            album: grandparent,
        });
    }

    for step in &mut steps {
        step.album.album_cover_item_id = cover_id;
        ctx.db.save_item(&mut step.album)?;
        ctx.graphics.generate(ctx.db, &step.album)?;
        debug!(album = step.album.id, cover = ?cover_id, "Set album cover");
    }

    // Ancestors may still point straight at a replaced cover.
    for step in steps.iter().rev() {
        let Some(previous) = step.previous_cover else {
            continue;
        };
        if Some(previous) == cover_id {
            continue;
        }
        for mut ancestor in ctx.db.ancestors(&step.album)? {
            if ancestor.album_cover_item_id != Some(previous)
                || !ctx.access.can(Permission::Edit, &ancestor)?
            {
                continue;
            }
            ancestor.album_cover_item_id = cover_id;
            ctx.db.save_item(&mut ancestor)?;
            ctx.graphics.generate(ctx.db, &ancestor)?;
            debug!(album = ancestor.id, previous, "Repointed stale album cover");
        }
    }

    Ok(())
}

/// Clear the cover of `album` and regenerate its thumbnail.
pub fn remove_album_cover(ctx: &RequestContext, album: &Item) -> Result<()> {
    ctx.access.required(Permission::View, album)?;
    ctx.access.required(Permission::Edit, album)?;

    let mut album = ctx.db.load_item(album.id)?;
    album.album_cover_item_id = None;
    ctx.db.save_item(&mut album)?;
    ctx.graphics.generate(ctx.db, &album)?;
    debug!(album = album.id, "Removed album cover");
    Ok(())
}

/// Move `source` into the album `target` and return the moved item.
///
/// If `source` was its old parent's cover, the parent gets another child as
/// cover (or none when `source` was its only child). If `target` has no
/// cover afterwards, `source` becomes it. A name clash in `target` renames
/// `source` and leaves an info message.
pub fn move_item(ctx: &RequestContext, source: &Item, target: &Item) -> Result<Item> {
    let source = ctx.db.load_item(source.id)?;
    let target = ctx.db.load_item(target.id)?;

    ctx.access.required(Permission::View, &source)?;
    ctx.access.required(Permission::View, &target)?;
    ctx.access.required(Permission::Edit, &source)?;
    ctx.access.required(Permission::Edit, &target)?;

    if !target.is_album() {
        return Err(GalleryError::NotAnAlbum(target.id));
    }
    let into_own_subtree = target.id == source.id
        || ctx
            .db
            .ancestors(&target)?
            .iter()
            .any(|ancestor| ancestor.id == source.id);
    if into_own_subtree {
        return Err(GalleryError::InvalidMove {
            source_id: source.id,
            target_id: target.id,
        });
    }

    let old_parent = ctx
        .db
        .parent(&source)?
        .ok_or(GalleryError::NoParent(source.id))?;

    if old_parent.album_cover_item_id == Some(source.id) {
        let siblings = album_children_query(&old_parent).viewable(ctx.user());
        if ctx.db.count_items(&siblings)? > 1 {
            let replacement = ctx
                .db
                .find_items(&siblings.limit(2))?
                .into_iter()
                .find(|child| child.id != source.id);
            match replacement {
                Some(child) => make_album_cover(ctx, &child)?,
                None => remove_album_cover(ctx, &old_parent)?,
            }
        } else {
            remove_album_cover(ctx, &old_parent)?;
        }
    }

    let mut moved = ctx.db.load_item(source.id)?;
    let old_name = moved.name.clone();
    moved.parent_id = Some(target.id);
    ctx.db.save_item(&mut moved)?;

    if moved.name != old_name {
        ctx.messages.info(format!(
            "{} {} renamed to {} to avoid a conflict",
            moved.item_type.label(),
            old_name,
            moved.name
        ));
    }

    let target = ctx.db.load_item(target.id)?;
    if target.album_cover_item_id.is_none() {
        make_album_cover(ctx, &moved)?;
    }

    info!(
        item = moved.id,
        from = old_parent.id,
        to = target.id,
        "Moved item"
    );
    ctx.db.load_item(moved.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ROOT_ID;
    use crate::identity::Session;
    use crate::item::{find_by_path, VarDir};
    use crate::message::Severity;
    use crate::test_support::{album, photo, Harness};

    /// A registered user who can view everything but edit only `editable`.
    fn limited_user(h: &mut Harness, editable: &[&Item]) {
        let user = h.db.create_user("limited", "Limited User", false).unwrap();
        let group = h.db.create_group("editors").unwrap();
        h.db.add_user_to_group(user.id, group).unwrap();
        for item in editable {
            h.db.conn
                .execute(
                    "INSERT INTO access_cache (item_id, group_id, view, edit) VALUES (?1, ?2, 1, 1)",
                    [item.id, group],
                )
                .unwrap();
        }
        let user = h.db.get_user(user.id).unwrap().unwrap();
        h.session = Session::new("limited-session", user);
    }

    #[test]
    fn test_cover_propagates_to_uncovered_ancestors() {
        let h = Harness::admin();
        let a = album(&h.db, ROOT_ID, "a");
        let b = album(&h.db, a.id, "b");
        let pic = photo(&h.db, b.id, "pic.jpg");

        make_album_cover(&h.ctx(), &pic).unwrap();

        assert_eq!(h.reload(b.id).album_cover_item_id, Some(pic.id));
        assert_eq!(h.reload(a.id).album_cover_item_id, Some(pic.id));
        assert_eq!(h.reload(ROOT_ID).album_cover_item_id, Some(pic.id));
        let generated = h.graphics.generated.borrow().clone();
        assert_eq!(generated, vec![b.id, a.id, ROOT_ID]);
    }

    #[test]
    fn test_propagation_stops_at_covered_ancestor() {
        let h = Harness::admin();
        let a = album(&h.db, ROOT_ID, "a");
        let b = album(&h.db, a.id, "b");
        let first = photo(&h.db, a.id, "first.jpg");
        let second = photo(&h.db, b.id, "second.jpg");
        make_album_cover(&h.ctx(), &first).unwrap();
        h.graphics.generated.borrow_mut().clear();

        make_album_cover(&h.ctx(), &second).unwrap();

        assert_eq!(h.reload(b.id).album_cover_item_id, Some(second.id));
        assert_eq!(h.reload(a.id).album_cover_item_id, Some(first.id));
    }

    #[test]
    fn test_album_item_contributes_its_own_cover() {
        let h = Harness::admin();
        let a = album(&h.db, ROOT_ID, "a");
        let b = album(&h.db, a.id, "b");
        let pic = photo(&h.db, b.id, "pic.jpg");
        make_album_cover(&h.ctx(), &pic).unwrap();
        let other = photo(&h.db, a.id, "other.jpg");
        make_album_cover(&h.ctx(), &other).unwrap();
        assert_eq!(h.reload(a.id).album_cover_item_id, Some(other.id));

        make_album_cover(&h.ctx(), &h.reload(b.id)).unwrap();

        assert_eq!(h.reload(a.id).album_cover_item_id, Some(pic.id));
    }

    #[test]
    fn test_stale_ancestor_references_are_backfilled() {
        let h = Harness::admin();
        let a = album(&h.db, ROOT_ID, "a");
        let b = album(&h.db, a.id, "b");
        let old = photo(&h.db, b.id, "old.jpg");
        let new = photo(&h.db, b.id, "new.jpg");
        make_album_cover(&h.ctx(), &old).unwrap();
        assert_eq!(h.reload(ROOT_ID).album_cover_item_id, Some(old.id));

        make_album_cover(&h.ctx(), &new).unwrap();

        for id in [b.id, a.id, ROOT_ID] {
            assert_eq!(h.reload(id).album_cover_item_id, Some(new.id));
        }
    }

    #[test]
    fn test_denied_cover_writes_nothing() {
        let mut h = Harness::admin();
        let a = album(&h.db, ROOT_ID, "a");
        let pic = photo(&h.db, a.id, "pic.jpg");
        limited_user(&mut h, &[]);

        let err = make_album_cover(&h.ctx(), &pic).unwrap_err();

        assert!(matches!(err, GalleryError::PermissionDenied { permission: Permission::Edit, .. }));
        assert_eq!(h.reload(a.id).album_cover_item_id, None);
        assert!(h.graphics.generated.borrow().is_empty());
    }

    #[test]
    fn test_propagation_skips_ancestors_without_edit() {
        let mut h = Harness::admin();
        let a = album(&h.db, ROOT_ID, "a");
        let b = album(&h.db, a.id, "b");
        let pic = photo(&h.db, b.id, "pic.jpg");
        limited_user(&mut h, &[&b, &pic]);

        make_album_cover(&h.ctx(), &pic).unwrap();

        assert_eq!(h.reload(b.id).album_cover_item_id, Some(pic.id));
        assert_eq!(h.reload(a.id).album_cover_item_id, None);
    }

    #[test]
    fn test_remove_album_cover() {
        let h = Harness::admin();
        let a = album(&h.db, ROOT_ID, "a");
        let pic = photo(&h.db, a.id, "pic.jpg");
        make_album_cover(&h.ctx(), &pic).unwrap();

        remove_album_cover(&h.ctx(), &a).unwrap();

        assert_eq!(h.reload(a.id).album_cover_item_id, None);
        assert_eq!(h.graphics.generated.borrow().last(), Some(&a.id));
    }

    #[test]
    fn test_move_reassigns_old_parent_cover() {
        let h = Harness::admin();
        let src = album(&h.db, ROOT_ID, "src");
        let dst = album(&h.db, ROOT_ID, "dst");
        let covered = photo(&h.db, src.id, "covered.jpg");
        let sibling = photo(&h.db, src.id, "sibling.jpg");
        make_album_cover(&h.ctx(), &covered).unwrap();

        let moved = move_item(&h.ctx(), &covered, &dst).unwrap();

        assert_eq!(moved.parent_id, Some(dst.id));
        assert_eq!(h.reload(src.id).album_cover_item_id, Some(sibling.id));
        assert_eq!(h.reload(dst.id).album_cover_item_id, Some(covered.id));
    }

    #[test]
    fn test_move_last_child_clears_cover() {
        let h = Harness::admin();
        let src = album(&h.db, ROOT_ID, "src");
        let dst = album(&h.db, ROOT_ID, "dst");
        let only = photo(&h.db, src.id, "only.jpg");
        make_album_cover(&h.ctx(), &only).unwrap();

        move_item(&h.ctx(), &only, &dst).unwrap();

        assert_eq!(h.reload(src.id).album_cover_item_id, None);
        assert_eq!(h.reload(dst.id).album_cover_item_id, Some(only.id));
    }

    #[test]
    fn test_move_album_into_uncovered_target_takes_its_cover() {
        let h = Harness::admin();
        let dst = album(&h.db, ROOT_ID, "dst");
        let x = album(&h.db, ROOT_ID, "x");
        let pic = photo(&h.db, x.id, "p.jpg");
        make_album_cover(&h.ctx(), &pic).unwrap();
        assert_eq!(h.reload(dst.id).album_cover_item_id, None);

        let moved = move_item(&h.ctx(), &x, &dst).unwrap();

        assert_eq!(moved.parent_id, Some(dst.id));
        assert_eq!(h.reload(dst.id).album_cover_item_id, Some(pic.id));
        assert_eq!(h.reload(x.id).album_cover_item_id, Some(pic.id));
        let found = find_by_path(&h.db, "dst/x/p.jpg", VarDir::Albums).unwrap();
        assert_eq!(found.map(|item| item.id), Some(pic.id));
    }

    #[test]
    fn test_move_keeps_existing_target_cover() {
        let h = Harness::admin();
        let src = album(&h.db, ROOT_ID, "src");
        let dst = album(&h.db, ROOT_ID, "dst");
        let existing = photo(&h.db, dst.id, "existing.jpg");
        make_album_cover(&h.ctx(), &existing).unwrap();
        let pic = photo(&h.db, src.id, "pic.jpg");

        move_item(&h.ctx(), &pic, &dst).unwrap();

        assert_eq!(h.reload(dst.id).album_cover_item_id, Some(existing.id));
    }

    #[test]
    fn test_move_rename_leaves_message() {
        let h = Harness::admin();
        let src = album(&h.db, ROOT_ID, "src");
        let dst = album(&h.db, ROOT_ID, "dst");
        photo(&h.db, dst.id, "same.jpg");
        let pic = photo(&h.db, src.id, "same.jpg");

        let moved = move_item(&h.ctx(), &pic, &dst).unwrap();

        assert_eq!(moved.name, "same-1.jpg");
        let messages = h.messages.take();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].severity, Severity::Info);
        assert_eq!(messages[0].text, "Photo same.jpg renamed to same-1.jpg to avoid a conflict");
    }

    #[test]
    fn test_move_into_own_subtree_is_rejected() {
        let h = Harness::admin();
        let a = album(&h.db, ROOT_ID, "a");
        let b = album(&h.db, a.id, "b");

        let err = move_item(&h.ctx(), &a, &b).unwrap_err();
        assert!(matches!(err, GalleryError::InvalidMove { .. }));
        let err = move_item(&h.ctx(), &a, &a).unwrap_err();
        assert!(matches!(err, GalleryError::InvalidMove { .. }));
        assert_eq!(h.reload(a.id).parent_id, Some(ROOT_ID));
    }

    #[test]
    fn test_move_into_photo_is_rejected() {
        let h = Harness::admin();
        let pic = photo(&h.db, ROOT_ID, "pic.jpg");
        let other = photo(&h.db, ROOT_ID, "other.jpg");
        let err = move_item(&h.ctx(), &pic, &other).unwrap_err();
        assert!(matches!(err, GalleryError::NotAnAlbum(id) if id == other.id));
    }

    #[test]
    fn test_move_requires_edit_on_both() {
        let mut h = Harness::admin();
        let src = album(&h.db, ROOT_ID, "src");
        let dst = album(&h.db, ROOT_ID, "dst");
        let pic = photo(&h.db, src.id, "pic.jpg");
        limited_user(&mut h, &[&pic]);

        let err = move_item(&h.ctx(), &pic, &dst).unwrap_err();
        assert!(matches!(err, GalleryError::PermissionDenied { item_id, .. } if item_id == dst.id));
        assert_eq!(h.reload(pic.id).parent_id, Some(src.id));
    }
}
