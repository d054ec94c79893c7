//! Preference document store
//!
//! A single versioned JSON document holding the two durable session
//! pointers (current server id, current user id) plus UI-remember
//! state this crate stores but never interprets. Every write is a
//! read-modify-write inside one transaction, so a pointer update can
//! never clobber unrelated fields and readers never see a torn
//! document.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// The persisted preference document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceDoc {
    /// Identity of the server of the last committed session
    pub current_server_id: Option<Uuid>,
    /// Identity of the user of the last committed session
    pub current_user_id: Option<Uuid>,

    // UI-remember state, opaque to the session coordinator
    #[serde(default)]
    pub volume_level: Option<f64>,
    #[serde(default)]
    pub theme: Option<String>,

    pub updated_at: DateTime<Utc>,
}

impl Default for PreferenceDoc {
    fn default() -> Self {
        Self {
            current_server_id: None,
            current_user_id: None,
            volume_level: None,
            theme: None,
            updated_at: Utc::now(),
        }
    }
}

/// Versioned store for the preference document
#[derive(Clone)]
pub struct PreferenceStore {
    pool: SqlitePool,
}

impl PreferenceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read the current document; a missing row reads as the default
    pub async fn load(&self) -> Result<PreferenceDoc> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT doc FROM preferences WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((doc,)) => {
                serde_json::from_str(&doc).map_err(|e| Error::Internal(e.to_string()))
            }
            None => Ok(PreferenceDoc::default()),
        }
    }

    /// Current document version (0 if never written)
    pub async fn version(&self) -> Result<i64> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT version FROM preferences WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(v,)| v).unwrap_or(0))
    }

    /// Atomically set both session pointers
    pub async fn update_pointers(
        &self,
        server_id: Option<Uuid>,
        user_id: Option<Uuid>,
    ) -> Result<PreferenceDoc> {
        debug!(?server_id, ?user_id, "updating session pointers");
        self.update(|doc| {
            doc.current_server_id = server_id;
            doc.current_user_id = user_id;
        })
        .await
    }

    /// Read-modify-write the document inside one transaction,
    /// bumping its version
    pub async fn update<F>(&self, mutate: F) -> Result<PreferenceDoc>
    where
        F: FnOnce(&mut PreferenceDoc),
    {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT doc, version FROM preferences WHERE id = 1")
                .fetch_optional(&mut *tx)
                .await?;

        let (mut doc, version) = match row {
            Some((doc, version)) => (
                serde_json::from_str::<PreferenceDoc>(&doc)
                    .map_err(|e| Error::Internal(e.to_string()))?,
                version,
            ),
            None => (PreferenceDoc::default(), 0),
        };

        mutate(&mut doc);
        doc.updated_at = Utc::now();

        let encoded =
            serde_json::to_string(&doc).map_err(|e| Error::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO preferences (id, doc, version)
            VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                doc = excluded.doc,
                version = excluded.version
            "#,
        )
        .bind(&encoded)
        .bind(version + 1)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;

    async fn test_store() -> (tempfile::TempDir, PreferenceStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("vireo.db")).await.unwrap();
        (dir, PreferenceStore::new(pool))
    }

    #[tokio::test]
    async fn load_without_row_yields_default() {
        let (_dir, store) = test_store().await;

        let doc = store.load().await.unwrap();
        assert_eq!(doc.current_server_id, None);
        assert_eq!(doc.current_user_id, None);
        assert_eq!(store.version().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_pointers_round_trips() {
        let (_dir, store) = test_store().await;
        let server = Uuid::new_v4();
        let user = Uuid::new_v4();

        store.update_pointers(Some(server), Some(user)).await.unwrap();

        let doc = store.load().await.unwrap();
        assert_eq!(doc.current_server_id, Some(server));
        assert_eq!(doc.current_user_id, Some(user));
        assert_eq!(store.version().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn pointer_update_preserves_ui_state() {
        let (_dir, store) = test_store().await;

        store
            .update(|doc| {
                doc.volume_level = Some(0.7);
                doc.theme = Some("dark".to_string());
            })
            .await
            .unwrap();

        store
            .update_pointers(Some(Uuid::new_v4()), Some(Uuid::new_v4()))
            .await
            .unwrap();

        let doc = store.load().await.unwrap();
        assert_eq!(doc.volume_level, Some(0.7));
        assert_eq!(doc.theme.as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn each_write_bumps_version() {
        let (_dir, store) = test_store().await;

        for expected in 1..=3 {
            store.update_pointers(None, None).await.unwrap();
            assert_eq!(store.version().await.unwrap(), expected);
        }
    }
}
