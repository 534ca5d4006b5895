//! Operator tasks run from the command line: accounts, sessions, categories.
//!
//! There is no sign-up or login page; an operator creates accounts here and
//! hands out session tokens.

use rusqlite::Connection;

use crate::auth::policy::Role;
use crate::auth::sessions;
use crate::db::{disasters, users};
use crate::domain::status::CategoryType;
use crate::errors::ServerError;

pub fn add_user(
    conn: &Connection,
    username: &str,
    email: &str,
    role: Role,
    now: i64,
) -> Result<i64, ServerError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ServerError::BadRequest("username is required".into()));
    }
    if users::find_by_username(conn, username)?.is_some() {
        return Err(ServerError::BadRequest(format!("user '{username}' already exists")));
    }
    let id = users::create_user(conn, username, email.trim(), role, now)?;
    tracing::info!(user = id, %role, "user created");
    Ok(id)
}

/// Opens a session for `username` and returns the raw cookie value.
pub fn issue_session(conn: &Connection, username: &str, now: i64) -> Result<String, ServerError> {
    let user = users::find_by_username(conn, username)?.ok_or(ServerError::NotFound)?;
    let token = sessions::create_session(conn, user.user_id, now)?;
    tracing::info!(user = user.user_id, "session issued");
    Ok(token)
}

pub fn change_role(conn: &Connection, username: &str, role: Role) -> Result<(), ServerError> {
    let user = users::find_by_username(conn, username)?.ok_or(ServerError::NotFound)?;
    users::set_role(conn, user.user_id, role)?;
    tracing::info!(user = user.user_id, from = %user.role, to = %role, "role changed");
    Ok(())
}

pub fn add_category(
    conn: &Connection,
    name: &str,
    category_type: CategoryType,
    icon: &str,
) -> Result<i64, ServerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServerError::BadRequest("category name is required".into()));
    }
    let exists = disasters::list_categories(conn, None)?
        .iter()
        .any(|c| c.name.eq_ignore_ascii_case(name));
    if exists {
        return Err(ServerError::BadRequest(format!("category '{name}' already exists")));
    }
    disasters::insert_category(conn, name, category_type, icon)
}
