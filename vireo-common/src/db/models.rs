//! Database models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A known remote media server.
///
/// `name` and `version` are refreshed from the server's public info
/// endpoint during authentication and may lag reality between logins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: Uuid,
    pub name: Option<String>,
    pub url: String,
    pub version: Option<String>,
}

impl Server {
    /// Server known only by its address, before first authentication
    pub fn new(id: Uuid, url: impl Into<String>) -> Self {
        Self {
            id,
            name: None,
            url: url.into(),
            version: None,
        }
    }
}

/// A user account on one server.
///
/// `server_id` is immutable once set: a user belongs to exactly one
/// server. `access_token` is None once revoked or never granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub server_id: Uuid,
    pub access_token: Option<String>,
    pub pin: Option<String>,
}
