use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::{GalleryError, Result};
use crate::identity::{User, EVERYBODY_GROUP_ID, GUEST_USER_ID, REGISTERED_GROUP_ID};

impl Database {
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, full_name, admin, guest FROM users WHERE id = ?",
                [id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, bool>(3)?,
                        row.get::<_, bool>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, name, full_name, admin, guest)) => {
                let group_ids = self.group_ids_for_user(id, guest)?;
                Ok(Some(User {
                    id,
                    name,
                    full_name,
                    admin,
                    guest,
                    group_ids,
                }))
            }
            None => Ok(None),
        }
    }

    pub fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let id: Option<i64> = self
            .conn
            .query_row("SELECT id FROM users WHERE name = ?", [name], |row| row.get(0))
            .optional()?;
        match id {
            Some(id) => self.get_user(id),
            None => Ok(None),
        }
    }

    pub fn guest(&self) -> Result<User> {
        self.get_user(GUEST_USER_ID)?
            .ok_or_else(|| GalleryError::InvalidValue {
                field: "user",
                value: "guest user missing; database not initialized".to_string(),
            })
    }

    pub fn create_user(&self, name: &str, full_name: &str, admin: bool) -> Result<User> {
        self.conn.execute(
            "INSERT INTO users (name, full_name, admin, guest) VALUES (?, ?, ?, 0)",
            params![name, full_name, admin],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_user(id)?.ok_or(GalleryError::InvalidValue {
            field: "user",
            value: name.to_string(),
        })
    }

    pub fn create_group(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO groups (name, special) VALUES (?, 0)", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn add_user_to_group(&self, user_id: i64, group_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO groups_users (group_id, user_id) VALUES (?, ?)",
            params![group_id, user_id],
        )?;
        Ok(())
    }

    /// Everybody, Registered Users for non-guests, then explicit memberships.
    fn group_ids_for_user(&self, user_id: i64, guest: bool) -> Result<Vec<i64>> {
        let mut ids = vec![EVERYBODY_GROUP_ID];
        if !guest {
            ids.push(REGISTERED_GROUP_ID);
        }
        let mut stmt = self
            .conn
            .prepare("SELECT group_id FROM groups_users WHERE user_id = ? ORDER BY group_id")?;
        let explicit = stmt
            .query_map([user_id], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for id in explicit {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use crate::identity::{ADMIN_USER_ID, EVERYBODY_GROUP_ID, REGISTERED_GROUP_ID};
    use crate::test_support::test_db;

    #[test]
    fn test_seeded_users() {
        let db = test_db();
        let guest = db.guest().unwrap();
        assert!(guest.guest);
        assert_eq!(guest.group_ids, vec![EVERYBODY_GROUP_ID]);

        let admin = db.get_user(ADMIN_USER_ID).unwrap().unwrap();
        assert!(admin.admin);
        assert_eq!(admin.group_ids, vec![EVERYBODY_GROUP_ID, REGISTERED_GROUP_ID]);
    }

    #[test]
    fn test_explicit_group_membership() {
        let db = test_db();
        let user = db.create_user("carol", "Carol", false).unwrap();
        let family = db.create_group("Family").unwrap();
        db.add_user_to_group(user.id, family).unwrap();

        let user = db.get_user_by_name("carol").unwrap().unwrap();
        assert_eq!(user.group_ids, vec![EVERYBODY_GROUP_ID, REGISTERED_GROUP_ID, family]);
        assert!(db.get_user_by_name("nobody").unwrap().is_none());
    }
}
