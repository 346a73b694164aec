//! Permission checks guarding every mutating item operation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::{Database, Item};
use crate::error::{GalleryError, Result};
use crate::identity::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
}

impl Permission {
    /// Column of `access_cache` holding this grant.
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Answers "may the current user do this to that item".
pub trait AccessGate {
    /// Non-fatal check.
    fn can(&self, permission: Permission, item: &Item) -> Result<bool>;

    /// Fatal check: `Err(PermissionDenied)` when [`AccessGate::can`] says no.
    fn required(&self, permission: Permission, item: &Item) -> Result<()> {
        if self.can(permission, item)? {
            Ok(())
        } else {
            tracing::debug!(item = item.id, %permission, "Permission denied");
            Err(GalleryError::PermissionDenied {
                permission,
                item_id: item.id,
            })
        }
    }
}

/// Gate backed by the store's `access_cache` grants. Admins pass every check.
pub struct StoreAccess<'a> {
    db: &'a Database,
    user: &'a User,
}

impl<'a> StoreAccess<'a> {
    pub fn new(db: &'a Database, user: &'a User) -> Self {
        Self { db, user }
    }
}

impl AccessGate for StoreAccess<'_> {
    fn can(&self, permission: Permission, item: &Item) -> Result<bool> {
        if self.user.admin {
            return Ok(true);
        }
        self.db.groups_have_permission(&self.user.group_ids, item.id, permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ROOT_ID;
    use crate::test_support::{album, test_db};

    #[test]
    fn test_guest_can_view_but_not_edit_root() {
        let db = test_db();
        let guest = db.guest().unwrap();
        let root = db.root().unwrap();
        let access = StoreAccess::new(&db, &guest);

        assert!(access.can(Permission::View, &root).unwrap());
        assert!(!access.can(Permission::Edit, &root).unwrap());
        let err = access.required(Permission::Edit, &root).unwrap_err();
        assert!(matches!(
            err,
            GalleryError::PermissionDenied { permission: Permission::Edit, item_id: ROOT_ID }
        ));
    }

    #[test]
    fn test_admin_passes_everything() {
        let db = test_db();
        let admin = db.get_user_by_name("admin").unwrap().unwrap();
        let hidden = album(&db, ROOT_ID, "hidden");
        db.set_permission(crate::identity::EVERYBODY_GROUP_ID, Permission::View, &hidden, false)
            .unwrap();

        let access = StoreAccess::new(&db, &admin);
        assert!(access.can(Permission::View, &hidden).unwrap());
        assert!(access.can(Permission::Edit, &hidden).unwrap());
    }
}
