//! Per-group grants in `access_cache`.

use rusqlite::{params, params_from_iter, types::Value};
use std::collections::VecDeque;

use super::{Database, Item};
use crate::access::Permission;
use crate::error::Result;

impl Database {
    /// Whether any of `group_ids` holds `permission` on the item.
    pub fn groups_have_permission(
        &self,
        group_ids: &[i64],
        item_id: i64,
        permission: Permission,
    ) -> Result<bool> {
        if group_ids.is_empty() {
            return Ok(false);
        }
        let placeholders: Vec<String> = (0..group_ids.len()).map(|i| format!("?{}", i + 2)).collect();
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM access_cache WHERE item_id = ?1 AND {} = 1 AND group_id IN ({}))",
            permission.column(),
            placeholders.join(", ")
        );
        let mut values = vec![Value::Integer(item_id)];
        values.extend(group_ids.iter().map(|id| Value::Integer(*id)));
        let allowed = self
            .conn
            .query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(allowed)
    }

    /// Grant or revoke `permission` for a group on `item` and everything below it.
    pub fn set_permission(
        &self,
        group_id: i64,
        permission: Permission,
        item: &Item,
        allowed: bool,
    ) -> Result<()> {
        let upsert = format!(
            r#"
            INSERT INTO access_cache (item_id, group_id, {col}) VALUES (?1, ?2, ?3)
            ON CONFLICT(item_id, group_id) DO UPDATE SET {col} = excluded.{col}
            "#,
            col = permission.column()
        );

        let mut queue = VecDeque::from([item.id]);
        while let Some(id) = queue.pop_front() {
            self.conn.execute(&upsert, params![id, group_id, allowed])?;

            let mut stmt = self.conn.prepare("SELECT id FROM items WHERE parent_id = ?")?;
            let children = stmt
                .query_map([id], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            queue.extend(children);
        }
        tracing::debug!(item = item.id, group_id, %permission, allowed, "Updated access");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::access::Permission;
    use crate::db::ROOT_ID;
    use crate::identity::{EVERYBODY_GROUP_ID, REGISTERED_GROUP_ID};
    use crate::test_support::{album, photo, test_db};

    #[test]
    fn test_set_permission_applies_to_subtree() {
        let db = test_db();
        let a = album(&db, ROOT_ID, "a");
        let p = photo(&db, a.id, "p.jpg");

        assert!(!db.groups_have_permission(&[REGISTERED_GROUP_ID], p.id, Permission::Edit).unwrap());
        db.set_permission(REGISTERED_GROUP_ID, Permission::Edit, &a, true).unwrap();
        assert!(db.groups_have_permission(&[REGISTERED_GROUP_ID], a.id, Permission::Edit).unwrap());
        assert!(db.groups_have_permission(&[REGISTERED_GROUP_ID], p.id, Permission::Edit).unwrap());
        assert!(!db.groups_have_permission(&[REGISTERED_GROUP_ID], ROOT_ID, Permission::Edit).unwrap());

        db.set_permission(EVERYBODY_GROUP_ID, Permission::View, &a, false).unwrap();
        assert!(!db.groups_have_permission(&[EVERYBODY_GROUP_ID], p.id, Permission::View).unwrap());
        // Revoking view left the edit grant alone.
        assert!(db.groups_have_permission(&[REGISTERED_GROUP_ID], p.id, Permission::Edit).unwrap());
    }

    #[test]
    fn test_no_groups_no_permission() {
        let db = test_db();
        assert!(!db.groups_have_permission(&[], ROOT_ID, Permission::View).unwrap());
    }
}
