// src/db/reports.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::report::{NewReport, Report, ReportReview};
use crate::domain::status::ReportStatus;
use crate::domain::target::Target;
use crate::errors::{is_constraint_violation, ServerError};

const REPORT_COLUMNS: &str = "id, target_kind, target_id, report_type, description, evidence, \
     reported_by, reporter_email, status, reviewed_by, review_notes, action_taken, \
     created_at, reviewed_at";

fn report_from_row(r: &Row) -> rusqlite::Result<Report> {
    Ok(Report {
        id: r.get(0)?,
        target: Target::new(r.get(1)?, r.get(2)?),
        report_type: r.get(3)?,
        description: r.get(4)?,
        evidence: r.get(5)?,
        reported_by: r.get(6)?,
        reporter_email: r.get(7)?,
        status: r.get(8)?,
        reviewed_by: r.get(9)?,
        review_notes: r.get(10)?,
        action_taken: r.get(11)?,
        created_at: r.get(12)?,
        reviewed_at: r.get(13)?,
    })
}

/// True when `reporter` already has a report on `target`. Anonymous reporters never match.
pub fn has_reported(conn: &Connection, target: Target, reporter: Option<i64>) -> Result<bool, ServerError> {
    let Some(user_id) = reporter else {
        return Ok(false);
    };
    let n: i64 = conn.query_row(
        "select count(*) from reports where target_kind = ? and target_id = ? and reported_by = ?",
        params![target.kind, target.id, user_id],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

/// Inserts a pending report. The unique index backs up the duplicate check.
pub fn insert_report(conn: &Connection, r: &NewReport, now: i64) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into reports (target_kind, target_id, report_type, description, evidence,
                             reported_by, reporter_email, status, created_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            r.target.kind,
            r.target.id,
            r.report_type,
            r.description,
            r.evidence,
            r.reported_by,
            r.reporter_email,
            ReportStatus::Pending,
            now
        ],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            ServerError::DuplicateReport { target: r.target }
        } else {
            ServerError::DbError(format!("insert report failed: {e}"))
        }
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn get_report(conn: &Connection, id: i64) -> Result<Option<Report>, ServerError> {
    let sql = format!("select {REPORT_COLUMNS} from reports where id = ?");
    conn.query_row(&sql, params![id], report_from_row)
        .optional()
        .map_err(|e| ServerError::DbError(format!("select report failed: {e}")))
}

/// Writes a review decision onto a report.
pub fn update_review(
    conn: &Connection,
    id: i64,
    review: &ReportReview,
    reviewed_by: i64,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        r#"
        update reports
        set status = ?, reviewed_by = ?, review_notes = ?, action_taken = ?, reviewed_at = ?
        where id = ?
        "#,
        params![
            review.status,
            reviewed_by,
            review.review_notes,
            review.action_taken,
            now,
            id
        ],
    )?;
    Ok(())
}

/// Reports on one target, newest first.
#[cfg(test)]
pub fn list_reports_for_target(conn: &Connection, target: Target) -> Result<Vec<Report>, ServerError> {
    let sql = format!(
        "select {REPORT_COLUMNS} from reports where target_kind = ? and target_id = ? \
         order by created_at desc, id desc"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![target.kind, target.id], report_from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Reports still awaiting a decision, oldest first.
pub fn list_open_reports(conn: &Connection) -> Result<Vec<Report>, ServerError> {
    let sql = format!(
        "select {REPORT_COLUMNS} from reports where status in ('pending', 'investigating') \
         order by created_at, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], report_from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_open_reports_for_target(conn: &Connection, target: Target) -> Result<i64, ServerError> {
    let n = conn.query_row(
        r#"
        select count(*) from reports
        where target_kind = ? and target_id = ? and status in ('pending', 'investigating')
        "#,
        params![target.kind, target.id],
        |r| r.get(0),
    )?;
    Ok(n)
}
