//! Users, groups and the per-request session.

use serde::{Deserialize, Serialize};

/// Group every user (including the guest) belongs to.
pub const EVERYBODY_GROUP_ID: i64 = 1;
/// Group every logged-in user belongs to.
pub const REGISTERED_GROUP_ID: i64 = 2;

pub const GUEST_USER_ID: i64 = 1;
pub const ADMIN_USER_ID: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub admin: bool,
    pub guest: bool,
    pub group_ids: Vec<i64>,
}

/// Identity of the caller for the length of one request.
///
/// The session id keys per-session cache entries such as the display context.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user: User,
    pub user_agent: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<String>, user: User) -> Self {
        Self {
            id: id.into(),
            user,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// The logged-in user, or `None` for guests.
    pub fn logged_in_user(&self) -> Option<&User> {
        if self.user.guest {
            None
        } else {
            Some(&self.user)
        }
    }

    /// Crawlers don't get a display context; their requests are stateless.
    pub fn is_robot(&self) -> bool {
        const MARKERS: &[&str] = &["bot", "crawler", "spider", "slurp", "archiver"];
        match &self.user_agent {
            Some(agent) => {
                let agent = agent.to_ascii_lowercase();
                MARKERS.iter().any(|marker| agent.contains(marker))
            }
            None => false,
        }
    }
}
