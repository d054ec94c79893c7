//! Reactive session holder
//!
//! Publishes the committed session value through a watch channel:
//! subscribers always read the latest fully committed value, never a
//! partially applied mutation, and observe changes in commit order.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;
use vireo_common::db::{Server, User};

use crate::remote::UserProfile;

/// Who is logged in right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum Session {
    Empty,
    Active {
        server: Server,
        user: User,
        profile: UserProfile,
    },
}

impl Session {
    pub fn is_active(&self) -> bool {
        matches!(self, Session::Active { .. })
    }

    pub fn active_server_id(&self) -> Option<Uuid> {
        match self {
            Session::Active { server, .. } => Some(server.id),
            Session::Empty => None,
        }
    }

    pub fn active_user_id(&self) -> Option<Uuid> {
        match self {
            Session::Active { user, .. } => Some(user.id),
            Session::Empty => None,
        }
    }
}

/// Single-writer publisher of the current session
pub struct SessionHolder {
    tx: watch::Sender<Session>,
}

impl SessionHolder {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Session::Empty);
        Self { tx }
    }

    /// Commit a new session value, waking all subscribers
    pub fn publish(&self, session: Session) {
        debug!(
            active = session.is_active(),
            subscribers = self.tx.receiver_count(),
            "publishing session"
        );
        self.tx.send_replace(session);
    }

    /// Last fully committed session
    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Subscribe with read-latest semantics
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }
}

impl Default for SessionHolder {
    fn default() -> Self {
        Self::new()
    }
}
