//! Queries over the servers and users tables
//!
//! All writes to these tables funnel through the session coordinator;
//! nothing else in the client mutates them.

use crate::db::models::{Server, User};
use crate::uuid_utils::parse_db_id;
use crate::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

type ServerRow = (String, Option<String>, String, Option<String>);
type UserRow = (String, String, String, Option<String>, Option<String>);

fn server_from_row(row: ServerRow) -> Result<Server> {
    Ok(Server {
        id: parse_db_id(&row.0)?,
        name: row.1,
        url: row.2,
        version: row.3,
    })
}

fn user_from_row(row: UserRow) -> Result<User> {
    Ok(User {
        id: parse_db_id(&row.0)?,
        name: row.1,
        server_id: parse_db_id(&row.2)?,
        access_token: row.3,
        pin: row.4,
    })
}

/// Insert or update a server by id, returning the persisted row
pub async fn upsert_server(pool: &SqlitePool, server: &Server) -> Result<Server> {
    sqlx::query(
        r#"
        INSERT INTO servers (id, name, url, version)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            url = excluded.url,
            version = excluded.version,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(server.id.to_string())
    .bind(&server.name)
    .bind(&server.url)
    .bind(&server.version)
    .execute(pool)
    .await?;

    get_server(pool, server.id)
        .await?
        .ok_or_else(|| Error::Internal(format!("server {} vanished after upsert", server.id)))
}

/// Insert or update a user by id, returning the persisted row
pub async fn upsert_user(pool: &SqlitePool, user: &User) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, server_id, access_token, pin)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            access_token = excluded.access_token,
            pin = excluded.pin,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(user.id.to_string())
    .bind(&user.name)
    .bind(user.server_id.to_string())
    .bind(&user.access_token)
    .bind(&user.pin)
    .execute(pool)
    .await?;

    get_user(pool, user.server_id, user.id)
        .await?
        .ok_or_else(|| Error::Internal(format!("user {} vanished after upsert", user.id)))
}

/// Look up a server by id
pub async fn get_server(pool: &SqlitePool, id: Uuid) -> Result<Option<Server>> {
    let row: Option<ServerRow> =
        sqlx::query_as("SELECT id, name, url, version FROM servers WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;

    row.map(server_from_row).transpose()
}

/// Look up a user by id on one server
pub async fn get_user(pool: &SqlitePool, server_id: Uuid, user_id: Uuid) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id, name, server_id, access_token, pin FROM users WHERE id = ? AND server_id = ?",
    )
    .bind(user_id.to_string())
    .bind(server_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(user_from_row).transpose()
}

/// Fetch a server together with all of its known users
pub async fn get_server_with_users(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<(Server, Vec<User>)>> {
    let Some(server) = get_server(pool, id).await? else {
        return Ok(None);
    };

    let rows: Vec<UserRow> = sqlx::query_as(
        "SELECT id, name, server_id, access_token, pin FROM users WHERE server_id = ? ORDER BY name",
    )
    .bind(id.to_string())
    .fetch_all(pool)
    .await?;

    let users = rows.into_iter().map(user_from_row).collect::<Result<_>>()?;

    Ok(Some((server, users)))
}

/// Delete a user row; a no-op if the row is already gone
pub async fn delete_user(pool: &SqlitePool, server_id: Uuid, user_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ? AND server_id = ?")
        .bind(user_id.to_string())
        .bind(server_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete a server row; its users follow via the delete cascade
pub async fn delete_server(pool: &SqlitePool, id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM servers WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Update a user's local PIN, returning the persisted row
pub async fn set_user_pin(
    pool: &SqlitePool,
    server_id: Uuid,
    user_id: Uuid,
    pin: Option<&str>,
) -> Result<User> {
    let result = sqlx::query(
        "UPDATE users SET pin = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND server_id = ?",
    )
    .bind(pin)
    .bind(user_id.to_string())
    .bind(server_id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("user {user_id}")));
    }

    get_user(pool, server_id, user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
}
