// src/db/users.rs
use crate::auth::policy::{Actor, Role};
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension};

pub fn create_user(
    conn: &Connection,
    username: &str,
    email: &str,
    role: Role,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert into users (username, email, role, created_at) values (?, ?, ?, ?)",
        params![username, email, role, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert user failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_actor(conn: &Connection, user_id: i64) -> Result<Option<Actor>, ServerError> {
    conn.query_row(
        "select id, username, role from users where id = ?",
        params![user_id],
        |r| {
            Ok(Actor {
                user_id: r.get(0)?,
                username: r.get(1)?,
                role: r.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<Actor>, ServerError> {
    conn.query_row(
        "select id, username, role from users where username = ?",
        params![username],
        |r| {
            Ok(Actor {
                user_id: r.get(0)?,
                username: r.get(1)?,
                role: r.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))
}

pub fn set_role(conn: &Connection, user_id: i64, role: Role) -> Result<(), ServerError> {
    let n = conn
        .execute("update users set role = ? where id = ?", params![role, user_id])
        .map_err(|e| ServerError::DbError(format!("update role failed: {e}")))?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}
