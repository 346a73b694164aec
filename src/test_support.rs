//! Fixtures shared by the unit tests.

use std::cell::RefCell;

use crate::context::RequestContext;
use crate::db::{Column, Database, Item, NewItem, SortOrder};
use crate::error::Result;
use crate::graphics::DerivativeGenerator;
use crate::identity::{Session, ADMIN_USER_ID};
use crate::message::Messages;

pub fn test_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.initialize().unwrap();
    db
}

fn insert(db: &Database, parent_id: i64, new: NewItem) -> Item {
    let parent = db.load_item(parent_id).unwrap();
    db.insert_item(&parent, new).unwrap()
}

pub fn album(db: &Database, parent_id: i64, name: &str) -> Item {
    insert(db, parent_id, NewItem::album(name))
}

pub fn album_sorted(db: &Database, parent_id: i64, name: &str, column: Column, order: SortOrder) -> Item {
    insert(db, parent_id, NewItem::album(name).sorted_by(column, order))
}

pub fn photo(db: &Database, parent_id: i64, name: &str) -> Item {
    insert(db, parent_id, NewItem::photo(name))
}

pub fn movie(db: &Database, parent_id: i64, name: &str) -> Item {
    insert(db, parent_id, NewItem::movie(name))
}

/// Records which items were regenerated instead of touching the disk.
#[derive(Default)]
pub struct RecordingGenerator {
    pub generated: RefCell<Vec<i64>>,
}

impl DerivativeGenerator for RecordingGenerator {
    fn generate(&self, _db: &Database, item: &Item) -> Result<()> {
        self.generated.borrow_mut().push(item.id);
        Ok(())
    }
}

/// A seeded database plus everything needed to build a request context.
pub struct Harness {
    pub db: Database,
    pub session: Session,
    pub graphics: RecordingGenerator,
    pub messages: Messages,
}

impl Harness {
    pub fn admin() -> Self {
        let db = test_db();
        let user = db.get_user(ADMIN_USER_ID).unwrap().unwrap();
        Self::with_user(db, user)
    }

    pub fn guest() -> Self {
        let db = test_db();
        let user = db.guest().unwrap();
        Self::with_user(db, user)
    }

    fn with_user(db: Database, user: crate::identity::User) -> Self {
        Self {
            db,
            session: Session::new("test-session", user),
            graphics: RecordingGenerator::default(),
            messages: Messages::new(),
        }
    }

    pub fn ctx(&self) -> RequestContext<'_> {
        RequestContext::new(&self.db, &self.session, &self.graphics, &self.messages)
    }

    pub fn reload(&self, id: i64) -> Item {
        self.db.load_item(id).unwrap()
    }
}
