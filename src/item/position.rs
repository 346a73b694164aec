//! Where an item falls among its siblings.

use crate::context::RequestContext;
use crate::db::{Column, Comparison, Condition, Item, ItemQuery, SortOrder};
use crate::error::{GalleryError, Result};

/// 1-based position of `item` among the viewable children of its parent,
/// using the parent's sort column and order. `filters` narrow the sibling
/// set further (e.g. only photos). Ties on the sort column are broken by id,
/// lowest first, in both directions.
///
/// The root has no siblings and returns [`GalleryError::NoParent`].
pub fn get_position(ctx: &RequestContext, item: &Item, filters: &[Condition]) -> Result<i64> {
    let parent = ctx
        .db
        .parent(item)?
        .ok_or(GalleryError::NoParent(item.id))?;
    let column = parent.sort_column;
    let order = parent.sort_order;

    let siblings = || {
        ItemQuery::new()
            .viewable(ctx.user())
            .where_eq(Column::ParentId, parent.id)
            .filters(filters)
    };

    let nulls = ctx
        .db
        .count_items(&siblings().filter(Condition::IsNull(column)))?;

    if nulls == 0 {
        // Everything strictly before the item on the sort column, then the
        // tied items up to and including it.
        let value = item.sort_value(column);
        let comparison = match order {
            SortOrder::Asc => Comparison::Less,
            SortOrder::Desc => Comparison::Greater,
        };
        let before = ctx
            .db
            .count_items(&siblings().filter(Condition::Compare(column, comparison, value.clone())))?;

        let tied = ctx.db.find_item_ids(
            &siblings()
                .filter(Condition::Eq(column, value))
                .order_by(Column::Id, SortOrder::Asc),
        )?;
        let within_tie = tied
            .iter()
            .position(|&id| id == item.id)
            .map_or(tied.len(), |index| index + 1);

        Ok(before + within_tie as i64)
    } else {
        // NULLs don't compare, so walk the ordered list instead.
        let mut query = siblings().order_by(column, order);
        if column != Column::Id {
            query = query.order_by(Column::Id, SortOrder::Asc);
        }
        let ids = ctx.db.find_item_ids(&query)?;
        let position = ids
            .iter()
            .position(|&id| id == item.id)
            .map_or(ids.len(), |index| index + 1);
        Ok(position as i64)
    }
}
