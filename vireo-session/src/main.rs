//! Vireo session service startup path
//!
//! Seeds the network handle from the bootstrap mirror before the
//! database is opened, then opens the store and attempts a
//! best-effort restore of the last active session.

use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vireo_common::prefs::PreferenceStore;
use vireo_common::{config, db};
use vireo_session::bootstrap::BootstrapMirror;
use vireo_session::remote::HttpRemote;
use vireo_session::{ApiHandle, Session, SessionCoordinator};

#[derive(Parser, Debug)]
#[command(name = "vireo-session", about = "Vireo session service")]
struct Args {
    /// Root data folder (overrides VIREO_ROOT and the config file)
    #[arg(long)]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let root = config::resolve_root_folder(args.root_folder.as_deref())?;
    info!("root folder: {}", root.display());

    // Earliest startup: the mirror is readable before the database
    let handle = ApiHandle::new();
    let mirror = BootstrapMirror::new(config::bootstrap_path(&root));
    mirror.seed(&handle);

    let pool = db::init_database(&config::database_path(&root)).await?;
    let prefs = PreferenceStore::new(pool.clone());

    let remote = Arc::new(HttpRemote::new(handle.clone()));
    let coordinator =
        SessionCoordinator::new(pool, prefs.clone(), mirror, handle, remote);

    let doc = prefs.load().await?;
    match coordinator
        .restore_session(doc.current_server_id, doc.current_user_id)
        .await
    {
        Ok(Session::Active { server, user, .. }) => {
            info!(server = %server.id, user = %user.id, "session restored");
        }
        Ok(Session::Empty) => {
            info!("no session to restore; manual login required");
        }
        Err(e) => {
            warn!("session restore failed: {e}");
        }
    }

    Ok(())
}
