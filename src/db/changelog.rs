// src/db/changelog.rs
use rusqlite::{params, Connection};

use crate::domain::changes::{ChangeLogEntry, FieldChanges};
use crate::domain::status::ChangeAction;
use crate::domain::target::Target;
use crate::errors::ServerError;

/// Appends one audit entry and returns its id.
/// Ids come from AUTOINCREMENT, so they never repeat and only grow.
pub fn record(
    conn: &Connection,
    action: ChangeAction,
    target: Target,
    user_id: Option<i64>,
    field_changes: &FieldChanges,
    description: &str,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into change_log (target_kind, target_id, user_id, action, field_changes, description, timestamp)
        values (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            target.kind,
            target.id,
            user_id,
            action,
            field_changes.to_json(),
            description,
            now
        ],
    )
    .map_err(|e| ServerError::DbError(format!("append change log failed: {e}")))?;

    tracing::debug!(%target, action = %action, "change recorded");
    Ok(conn.last_insert_rowid())
}

/// Full history of a target, ordered by (timestamp, id).
pub fn history(conn: &Connection, target: Target) -> Result<Vec<ChangeLogEntry>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select id, target_kind, target_id, user_id, action, field_changes, description, timestamp
        from change_log
        where target_kind = ? and target_id = ?
        order by timestamp, id
        "#,
    )?;

    let rows = stmt.query_map(params![target.kind, target.id], |r| {
        let raw: String = r.get(5)?;
        let field_changes = FieldChanges::from_json(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(ChangeLogEntry {
            id: r.get(0)?,
            target: Target::new(r.get(1)?, r.get(2)?),
            user_id: r.get(3)?,
            action: r.get(4)?,
            field_changes,
            description: r.get(6)?,
            timestamp: r.get(7)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
pub fn count_for_target(conn: &Connection, target: Target) -> Result<i64, ServerError> {
    let n = conn.query_row(
        "select count(*) from change_log where target_kind = ? and target_id = ?",
        params![target.kind, target.id],
        |r| r.get(0),
    )?;
    Ok(n)
}
