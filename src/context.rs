//! The collaborators one request works with.

use crate::access::{AccessGate, StoreAccess};
use crate::db::Database;
use crate::graphics::DerivativeGenerator;
use crate::identity::{Session, User};
use crate::message::MessageSink;

/// Everything an item operation needs, passed explicitly instead of living in
/// process-wide state. Built once per request and dropped with it.
pub struct RequestContext<'a> {
    pub db: &'a Database,
    pub session: &'a Session,
    pub access: Box<dyn AccessGate + 'a>,
    pub graphics: &'a dyn DerivativeGenerator,
    pub messages: &'a dyn MessageSink,
}

impl<'a> RequestContext<'a> {
    /// Context whose access gate reads the store's grants for the session user.
    pub fn new(
        db: &'a Database,
        session: &'a Session,
        graphics: &'a dyn DerivativeGenerator,
        messages: &'a dyn MessageSink,
    ) -> Self {
        Self {
            db,
            session,
            access: Box::new(StoreAccess::new(db, &session.user)),
            graphics,
            messages,
        }
    }

    pub fn user(&self) -> &User {
        &self.session.user
    }
}
