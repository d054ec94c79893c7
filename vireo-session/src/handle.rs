//! Shared network client configuration
//!
//! One `ApiHandle` is shared by every outgoing request builder. The
//! session coordinator is its sole writer; readers must take a fresh
//! snapshot per request because the configuration can change between
//! request construction and dispatch.
//!
//! Read-frequently, write-rarely access pattern using RwLock.

use std::sync::{Arc, RwLock};

/// Base URL and bearer token for outgoing requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub access_token: Option<String>,
}

/// Shared mutable network configuration
#[derive(Debug, Default)]
pub struct ApiHandle {
    config: RwLock<ApiConfig>,
}

impl ApiHandle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Point the handle at a server, with or without a credential
    pub fn configure(&self, base_url: Option<String>, access_token: Option<String>) {
        let mut config = self.config.write().unwrap();
        config.base_url = base_url;
        config.access_token = access_token;
    }

    /// Drop the credential, keeping the base URL
    pub fn clear_token(&self) {
        self.config.write().unwrap().access_token = None;
    }

    /// Drop both the base URL and the credential
    pub fn clear(&self) {
        *self.config.write().unwrap() = ApiConfig::default();
    }

    /// Current configuration, copied out for one request
    pub fn snapshot(&self) -> ApiConfig {
        self.config.read().unwrap().clone()
    }

    /// Put back a previously taken snapshot
    pub fn restore(&self, snapshot: ApiConfig) {
        *self.config.write().unwrap() = snapshot;
    }

    /// Value for the `Authorization` header of the next request, if a
    /// credential is present. Re-read per request by the interceptor.
    pub fn authorization(&self) -> Option<String> {
        self.config
            .read()
            .unwrap()
            .access_token
            .as_ref()
            .map(|token| format!("Bearer {token}"))
    }
}
