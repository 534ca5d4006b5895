// src/db/fields.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::need::{Field, FieldType};
use crate::errors::{is_constraint_violation, ServerError};

/// Adds a field; a second field with the same key on the same need is a conflict.
pub fn add_field(
    conn: &Connection,
    need_id: i64,
    key: &str,
    value: &str,
    field_type: FieldType,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert into fields (need_id, key, value, field_type) values (?, ?, ?, ?)",
        params![need_id, key, value, field_type],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            ServerError::FieldKeyConflict {
                need_id,
                key: key.to_string(),
            }
        } else {
            ServerError::DbError(format!("insert field failed: {e}"))
        }
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn get_field(conn: &Connection, need_id: i64, key: &str) -> Result<Option<Field>, ServerError> {
    conn.query_row(
        "select id, need_id, key, value, field_type from fields where need_id = ? and key = ?",
        params![need_id, key],
        |r| {
            Ok(Field {
                id: r.get(0)?,
                need_id: r.get(1)?,
                key: r.get(2)?,
                value: r.get(3)?,
                field_type: r.get(4)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select field failed: {e}")))
}

pub fn update_field_value(
    conn: &Connection,
    field_id: i64,
    value: &str,
    field_type: FieldType,
) -> Result<(), ServerError> {
    conn.execute(
        "update fields set value = ?, field_type = ? where id = ?",
        params![value, field_type, field_id],
    )?;
    Ok(())
}

pub fn list_fields(conn: &Connection, need_id: i64) -> Result<Vec<Field>, ServerError> {
    let mut stmt = conn.prepare(
        "select id, need_id, key, value, field_type from fields where need_id = ? order by key",
    )?;
    let rows = stmt.query_map(params![need_id], |r| {
        Ok(Field {
            id: r.get(0)?,
            need_id: r.get(1)?,
            key: r.get(2)?,
            value: r.get(3)?,
            field_type: r.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
