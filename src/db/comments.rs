// src/db/comments.rs
//
// Discussion and documentation attached to a Need: comments and photos.
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub need_id: i64,
    pub user_id: Option<i64>,
    pub text: String,
    pub is_status_update: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Photo {
    pub id: i64,
    pub need_id: i64,
    pub image_path: String,
    pub caption: String,
    pub uploaded_by: Option<i64>,
    pub uploaded_at: i64,
}

pub fn insert_comment(
    conn: &Connection,
    need_id: i64,
    user_id: Option<i64>,
    text: &str,
    is_status_update: bool,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into comments (need_id, user_id, text, is_status_update, created_at, updated_at)
        values (?1, ?2, ?3, ?4, ?5, ?5)
        "#,
        params![need_id, user_id, text, is_status_update, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert comment failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

/// Comments on a need, oldest first.
pub fn list_comments(conn: &Connection, need_id: i64) -> Result<Vec<Comment>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select id, need_id, user_id, text, is_status_update, created_at
        from comments where need_id = ?
        order by created_at, id
        "#,
    )?;
    let rows = stmt.query_map(params![need_id], |r| {
        Ok(Comment {
            id: r.get(0)?,
            need_id: r.get(1)?,
            user_id: r.get(2)?,
            text: r.get(3)?,
            is_status_update: r.get(4)?,
            created_at: r.get(5)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Records an uploaded image. Storing the file itself happens outside the app.
pub fn insert_photo(
    conn: &Connection,
    need_id: i64,
    image_path: &str,
    caption: &str,
    uploaded_by: Option<i64>,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into photos (need_id, image_path, caption, uploaded_by, uploaded_at)
        values (?, ?, ?, ?, ?)
        "#,
        params![need_id, image_path, caption, uploaded_by, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert photo failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn list_photos(conn: &Connection, need_id: i64) -> Result<Vec<Photo>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select id, need_id, image_path, caption, uploaded_by, uploaded_at
        from photos where need_id = ?
        order by uploaded_at, id
        "#,
    )?;
    let rows = stmt.query_map(params![need_id], |r| {
        Ok(Photo {
            id: r.get(0)?,
            need_id: r.get(1)?,
            image_path: r.get(2)?,
            caption: r.get(3)?,
            uploaded_by: r.get(4)?,
            uploaded_at: r.get(5)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
