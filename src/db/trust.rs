// src/db/trust.rs
//
// Verification and flag columns, addressed generically through the target registry.
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::target::Target;
use crate::domain::trust::TrustState;
use crate::errors::ServerError;

/// Reads the trust columns the target's kind carries.
pub fn load_trust_state(conn: &Connection, target: Target) -> Result<TrustState, ServerError> {
    let entry = target.kind.entry();
    let mut state = TrustState::unflagged(target);

    if !entry.verifiable && !entry.flaggable {
        target.ensure_exists(conn)?;
        return Ok(state);
    }

    // Unused column slots are filled with nulls so the row shape stays fixed.
    let verify_cols = if entry.verifiable {
        "is_verified, verified_by, verified_at, verification_notes"
    } else {
        "null, null, null, null"
    };
    let flag_cols = if entry.flaggable {
        "flag_count, is_flagged"
    } else {
        "null, null"
    };
    let sql = format!(
        "select {verify_cols}, {flag_cols} from {} where id = ?",
        entry.table
    );

    let row = conn
        .query_row(&sql, params![target.id], |r| {
            Ok((
                r.get::<_, Option<bool>>(0)?,
                r.get::<_, Option<i64>>(1)?,
                r.get::<_, Option<i64>>(2)?,
                r.get::<_, Option<String>>(3)?,
                r.get::<_, Option<i64>>(4)?,
                r.get::<_, Option<bool>>(5)?,
            ))
        })
        .optional()
        .map_err(|e| ServerError::DbError(format!("select trust state failed: {e}")))?;

    let Some((is_verified, verified_by, verified_at, notes, flag_count, is_flagged)) = row else {
        return Err(ServerError::TargetNotFound(target));
    };

    state.is_verified = is_verified;
    state.verified_by = verified_by;
    state.verified_at = verified_at;
    state.verification_notes = notes;
    state.flag_count = flag_count;
    state.is_flagged = is_flagged;
    Ok(state)
}

/// Marks a verifiable target as verified (last writer wins).
pub fn write_verification(
    conn: &Connection,
    target: Target,
    verified_by: i64,
    notes: &str,
    now: i64,
) -> Result<(), ServerError> {
    let entry = target.kind.entry();
    if !entry.verifiable {
        return Err(ServerError::BadRequest(format!("{} cannot be verified", target.kind)));
    }
    let sql = format!(
        r#"
        update {} set is_verified = 1, verified_by = ?, verified_at = ?,
                      verification_notes = ?, updated_at = ?
        where id = ?
        "#,
        entry.table
    );
    let n = conn.execute(&sql, params![verified_by, now, notes, now, target.id])?;
    if n == 0 {
        return Err(ServerError::TargetNotFound(target));
    }
    Ok(())
}

/// Adds one flag in a single statement and returns the new count.
pub fn increment_flags(conn: &Connection, target: Target, now: i64) -> Result<i64, ServerError> {
    let entry = target.kind.entry();
    if !entry.flaggable {
        return Err(ServerError::BadRequest(format!("{} has no flag counter", target.kind)));
    }
    let sql = format!(
        r#"
        update {} set flag_count = flag_count + 1, is_flagged = 1, updated_at = ?
        where id = ?
        returning flag_count
        "#,
        entry.table
    );
    conn.query_row(&sql, params![now, target.id], |r| r.get(0))
        .optional()?
        .ok_or(ServerError::TargetNotFound(target))
}

/// Resets the counter and the flagged marker together.
pub fn reset_flags(conn: &Connection, target: Target, now: i64) -> Result<(), ServerError> {
    let entry = target.kind.entry();
    if !entry.flaggable {
        return Err(ServerError::BadRequest(format!("{} has no flag counter", target.kind)));
    }
    let sql = format!(
        "update {} set flag_count = 0, is_flagged = 0, updated_at = ? where id = ?",
        entry.table
    );
    let n = conn.execute(&sql, params![now, target.id])?;
    if n == 0 {
        return Err(ServerError::TargetNotFound(target));
    }
    Ok(())
}
