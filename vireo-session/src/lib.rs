//! # Vireo Session Service
//!
//! Tracks which remote server and which user are "current", keeps
//! that fact consistent across the entity store, the preference
//! document and the bootstrap mirror, and republishes every change to
//! subscribers and to the shared network client handle.

pub mod bootstrap;
pub mod coordinator;
pub mod handle;
pub mod holder;
pub mod remote;

pub use coordinator::SessionCoordinator;
pub use handle::{ApiConfig, ApiHandle};
pub use holder::Session;
pub use remote::{AuthenticateResult, HttpRemote, PublicServerInfo, RemoteApi, UserProfile};
