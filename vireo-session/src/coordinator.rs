//! Session coordinator
//!
//! Owns the in-memory session and orchestrates every mutation across
//! the entity store, the preference document, the bootstrap mirror
//! and the network handle. There is no cross-store transaction;
//! consistency comes from operation ordering: no durable or cached
//! state is touched before a credential is proven valid, and
//! destructive operations invalidate the session, pointers and handle
//! before the row disappears.
//!
//! All mutating operations serialize on one lock, and the session is
//! published while that lock is held, so subscribers observe a
//! totally ordered sequence of committed sessions.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};
use uuid::Uuid;
use vireo_common::db::{self, Server, User};
use vireo_common::prefs::PreferenceStore;
use vireo_common::{Error, Result};

use crate::bootstrap::BootstrapMirror;
use crate::handle::ApiHandle;
use crate::holder::{Session, SessionHolder};
use crate::remote::{AuthenticateResult, RemoteApi};

/// Single instance constructed at process start and passed to every
/// consumer
pub struct SessionCoordinator {
    pool: sqlx::SqlitePool,
    prefs: PreferenceStore,
    mirror: BootstrapMirror,
    handle: Arc<ApiHandle>,
    remote: Arc<dyn RemoteApi>,
    holder: SessionHolder,
    // Serializes all mutating operations; held across publication
    op_lock: Mutex<()>,
}

impl SessionCoordinator {
    pub fn new(
        pool: sqlx::SqlitePool,
        prefs: PreferenceStore,
        mirror: BootstrapMirror,
        handle: Arc<ApiHandle>,
        remote: Arc<dyn RemoteApi>,
    ) -> Self {
        Self {
            pool,
            prefs,
            mirror,
            handle,
            remote,
            holder: SessionHolder::new(),
            op_lock: Mutex::new(()),
        }
    }

    /// Last fully committed session
    pub fn current_session(&self) -> Session {
        self.holder.current()
    }

    /// Subscribe to committed session values
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.holder.subscribe()
    }

    /// The shared network configuration this coordinator writes
    pub fn handle(&self) -> &Arc<ApiHandle> {
        &self.handle
    }

    /// Register a server and point the network handle at it, with no
    /// credential. Logs out any prior user; switching servers
    /// invalidates the active identity. Persisted pointers are left
    /// alone until a user authenticates.
    pub async fn add_server(&self, server: &Server) -> Result<Server> {
        let _guard = self.op_lock.lock().await;

        let stored = db::upsert_server(&self.pool, server).await?;
        self.handle.configure(Some(stored.url.clone()), None);
        self.holder.publish(Session::Empty);

        info!(server = %stored.id, url = %stored.url, "server registered");
        Ok(stored)
    }

    /// Establish a session for `candidate` on `server`
    pub async fn authenticate(&self, server: &Server, candidate: &User) -> Result<Session> {
        let _guard = self.op_lock.lock().await;
        self.authenticate_locked(server, candidate).await
    }

    /// Sibling entry point fed by a completed login exchange
    pub async fn login(&self, server: &Server, auth: AuthenticateResult) -> Result<Session> {
        let candidate = User {
            id: auth.user_id,
            name: auth.user_name,
            server_id: auth.server_id,
            access_token: Some(auth.access_token),
            pin: None,
        };

        let _guard = self.op_lock.lock().await;
        self.authenticate_locked(server, &candidate).await
    }

    async fn authenticate_locked(&self, server: &Server, candidate: &User) -> Result<Session> {
        if candidate.server_id != server.id {
            return Err(Error::InvariantViolation(format!(
                "user {} belongs to server {}, not {}",
                candidate.id, candidate.server_id, server.id
            )));
        }

        let Some(token) = candidate.access_token.clone() else {
            return Err(Error::AuthenticationFailed(format!(
                "user {} has no access token",
                candidate.id
            )));
        };

        // The profile fetch gates everything below: nothing durable
        // is mutated until the credential is proven valid.
        let previous = self.handle.snapshot();
        self.handle
            .configure(Some(server.url.clone()), Some(token));

        let profile = match self.remote.current_user_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                // Do not leave an unproven token on the shared handle
                self.handle.restore(previous);
                self.holder.publish(Session::Empty);
                warn!(server = %server.id, "authentication failed: {e}");
                return Err(e);
            }
        };

        // Best-effort metadata refresh; stale name/version is fine
        let mut server = server.clone();
        match self.remote.public_server_info().await {
            Ok(information) => {
                server.name = Some(information.name);
                server.version = Some(information.version);
            }
            Err(e) => {
                warn!(server = %server.id, "keeping stale server metadata: {e}");
            }
        }

        // The remote profile carries the canonical identity and name
        let mut candidate = candidate.clone();
        candidate.id = profile.id;
        candidate.name = profile.name.clone();

        let server = db::upsert_server(&self.pool, &server).await?;
        let user = db::upsert_user(&self.pool, &candidate).await?;

        self.prefs
            .update_pointers(Some(server.id), Some(user.id))
            .await?;

        let session = Session::Active {
            server: server.clone(),
            user: user.clone(),
            profile,
        };
        self.holder.publish(session.clone());

        // The mirror is a redundant fast path; a write failure must
        // not unwind an already committed session.
        if let Err(e) = self
            .mirror
            .put(Some(&server.url), user.access_token.as_deref())
        {
            warn!("bootstrap mirror write failed: {e}");
        }

        info!(server = %server.id, user = %user.id, "session established");
        Ok(session)
    }

    /// Re-establish the last session from persisted pointers.
    /// Best-effort: any lookup miss yields an empty session, not an
    /// error.
    pub async fn restore_session(
        &self,
        server_id: Option<Uuid>,
        user_id: Option<Uuid>,
    ) -> Result<Session> {
        let _guard = self.op_lock.lock().await;

        let (Some(server_id), Some(user_id)) = (server_id, user_id) else {
            self.holder.publish(Session::Empty);
            return Ok(Session::Empty);
        };

        let Some((server, users)) = db::get_server_with_users(&self.pool, server_id).await? else {
            warn!(server = %server_id, "cannot restore session: server unknown");
            self.holder.publish(Session::Empty);
            return Ok(Session::Empty);
        };

        let Some(user) = users.into_iter().find(|u| u.id == user_id) else {
            warn!(user = %user_id, "cannot restore session: user unknown");
            self.holder.publish(Session::Empty);
            return Ok(Session::Empty);
        };

        self.authenticate_locked(&server, &user).await
    }

    /// Return to the server/user picker: clear the handle and both
    /// persisted pointers, so a subsequent restore starts from empty
    pub async fn switch_server_or_user(&self) -> Result<()> {
        let _guard = self.op_lock.lock().await;

        self.handle.clear();
        self.prefs.update_pointers(None, None).await?;
        self.holder.publish(Session::Empty);

        info!("returned to server/user selection");
        Ok(())
    }

    /// Delete a user. If the user is active, the session, the user
    /// pointer and the handle credential are cleared before the row
    /// disappears, so no observer or outgoing request can reference a
    /// user about to vanish.
    pub async fn remove_user(&self, user: &User) -> Result<()> {
        let _guard = self.op_lock.lock().await;

        if self.holder.current().active_user_id() == Some(user.id) {
            self.holder.publish(Session::Empty);
            self.prefs.update(|doc| doc.current_user_id = None).await?;
            self.handle.clear_token();
        }

        db::delete_user(&self.pool, user.server_id, user.id).await?;

        info!(user = %user.id, "user removed");
        Ok(())
    }

    /// Delete a server and, by cascade, its users. If the server is
    /// active, the session, both pointers and the whole handle are
    /// cleared before the row disappears.
    pub async fn remove_server(&self, server: &Server) -> Result<()> {
        let _guard = self.op_lock.lock().await;

        if self.holder.current().active_server_id() == Some(server.id) {
            self.holder.publish(Session::Empty);
            self.prefs.update_pointers(None, None).await?;
            self.handle.clear();
        }

        db::delete_server(&self.pool, server.id).await?;

        info!(server = %server.id, "server removed");
        Ok(())
    }

    /// Update a user's local PIN. If the user is active, republish
    /// the session with the updated user embedded, keeping the
    /// existing server and profile snapshot.
    pub async fn set_user_pin(&self, user: &User, pin: Option<&str>) -> Result<User> {
        let _guard = self.op_lock.lock().await;

        let updated = db::set_user_pin(&self.pool, user.server_id, user.id, pin).await?;

        if let Session::Active {
            server,
            user: active,
            profile,
        } = self.holder.current()
        {
            if active.id == updated.id {
                self.holder.publish(Session::Active {
                    server,
                    user: updated.clone(),
                    profile,
                });
            }
        }

        Ok(updated)
    }

    /// Lightweight UI-level sign-out: clears the in-memory session
    /// only. Persisted pointers and the handle are left alone;
    /// callers wanting full cleanup also call
    /// `switch_server_or_user`.
    pub async fn close_session(&self) {
        let _guard = self.op_lock.lock().await;
        self.holder.publish(Session::Empty);
    }
}
