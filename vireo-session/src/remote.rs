//! Remote media server API
//!
//! The coordinator issues exactly three remote calls: the login
//! exchange (performed by an external flow, surfaced here as
//! `AuthenticateResult`), the authenticated current-user profile
//! fetch, and the public server info fetch. The seam is a trait so
//! coordinator tests can run against a scripted remote.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use vireo_common::{Error, Result};

use crate::handle::ApiHandle;

/// Canonical identity of the logged-in user, as the server reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub server_id: Uuid,
}

/// Public (unauthenticated) server metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicServerInfo {
    pub name: String,
    pub version: String,
}

/// Output of a completed login exchange, consumed by
/// `SessionCoordinator::login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateResult {
    pub access_token: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub server_id: Uuid,
}

/// The three remote calls the session coordinator depends on
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetch the profile of the user owning the handle's current
    /// token. Fails with `AuthenticationFailed` on a rejected
    /// credential.
    async fn current_user_profile(&self) -> Result<UserProfile>;

    /// Fetch public server metadata (name, version)
    async fn public_server_info(&self) -> Result<PublicServerInfo>;
}

/// HTTP implementation over reqwest
///
/// Re-reads the shared `ApiHandle` on every call; a configuration
/// change between two calls is picked up by the second one.
pub struct HttpRemote {
    client: reqwest::Client,
    handle: Arc<ApiHandle>,
}

impl HttpRemote {
    pub fn new(handle: Arc<ApiHandle>) -> Self {
        Self {
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn base_url(&self) -> Result<String> {
        self.handle
            .snapshot()
            .base_url
            .ok_or_else(|| Error::Remote("no server configured".to_string()))
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn current_user_profile(&self) -> Result<UserProfile> {
        let base = self.base_url()?;
        let auth = self
            .handle
            .authorization()
            .ok_or_else(|| Error::AuthenticationFailed("no access token".to_string()))?;

        debug!("fetching current user profile from {base}");
        let response = self
            .client
            .get(format!("{}/api/users/me", base.trim_end_matches('/')))
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| Error::Remote(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<UserProfile>()
                .await
                .map_err(|e| Error::Remote(e.to_string()))
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(Error::AuthenticationFailed(format!(
                "server rejected token ({status})"
            )))
        } else {
            Err(Error::Remote(format!("profile fetch returned {status}")))
        }
    }

    async fn public_server_info(&self) -> Result<PublicServerInfo> {
        let base = self.base_url()?;

        debug!("fetching public server info from {base}");
        let response = self
            .client
            .get(format!("{}/api/system/info/public", base.trim_end_matches('/')))
            .send()
            .await
            .map_err(|e| Error::Remote(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Remote(format!(
                "server info fetch returned {}",
                response.status()
            )));
        }

        response
            .json::<PublicServerInfo>()
            .await
            .map_err(|e| Error::Remote(e.to_string()))
    }
}
