// src/db/needs.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::need::{Need, NeedSummary, NewNeed};
use crate::domain::status::{CategoryType, NeedStatus};
use crate::errors::ServerError;

/// Column list shared by every query that materializes a `Need`.
const NEED_COLUMNS: &str = "n.id, n.disaster_id, n.category_id, n.title, n.description, \
     n.location, n.latitude, n.longitude, n.city, n.contact_person, n.contact_phone, \
     n.status, n.priority, n.reported_by, n.assigned_to, \
     n.is_verified, n.verified_by, n.verified_at, n.verification_notes, n.flag_count, n.is_flagged, \
     n.created_at, n.updated_at, n.resolved_at";

const NEED_COLUMN_COUNT: usize = 24;

fn need_from_row(r: &Row) -> rusqlite::Result<Need> {
    Ok(Need {
        id: r.get(0)?,
        disaster_id: r.get(1)?,
        category_id: r.get(2)?,
        title: r.get(3)?,
        description: r.get(4)?,
        location: r.get(5)?,
        latitude: r.get(6)?,
        longitude: r.get(7)?,
        city: r.get(8)?,
        contact_person: r.get(9)?,
        contact_phone: r.get(10)?,
        status: r.get(11)?,
        priority: r.get(12)?,
        reported_by: r.get(13)?,
        assigned_to: r.get(14)?,
        is_verified: r.get(15)?,
        verified_by: r.get(16)?,
        verified_at: r.get(17)?,
        verification_notes: r.get(18)?,
        flag_count: r.get(19)?,
        is_flagged: r.get(20)?,
        created_at: r.get(21)?,
        updated_at: r.get(22)?,
        resolved_at: r.get(23)?,
    })
}

fn summary_from_row(r: &Row) -> rusqlite::Result<NeedSummary> {
    Ok(NeedSummary {
        need: need_from_row(r)?,
        disaster_name: r.get(NEED_COLUMN_COUNT)?,
        category_name: r.get(NEED_COLUMN_COUNT + 1)?,
        category_type: r.get(NEED_COLUMN_COUNT + 2)?,
    })
}

/// Inserts a need in status `open`. Change logging is the caller's job.
pub fn insert_need(conn: &Connection, n: &NewNeed, now: i64) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into needs (
            disaster_id, category_id, title, description, location, latitude, longitude,
            city, contact_person, contact_phone, status, priority, reported_by,
            created_at, updated_at
        ) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
        "#,
        params![
            n.disaster_id,
            n.category_id,
            n.title,
            n.description,
            n.location,
            n.latitude,
            n.longitude,
            n.city,
            n.contact_person,
            n.contact_phone,
            NeedStatus::Open,
            n.priority,
            n.reported_by,
            now,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert need failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_need(conn: &Connection, id: i64) -> Result<Option<Need>, ServerError> {
    let sql = format!("select {NEED_COLUMNS} from needs n where n.id = ?");
    conn.query_row(&sql, params![id], need_from_row)
        .optional()
        .map_err(|e| ServerError::DbError(format!("select need failed: {e}")))
}

pub fn get_need_summary(conn: &Connection, id: i64) -> Result<Option<NeedSummary>, ServerError> {
    let sql = format!(
        r#"
        select {NEED_COLUMNS}, d.name, c.name, c.category_type
        from needs n
        join disasters d on d.id = n.disaster_id
        left join categories c on c.id = n.category_id
        where n.id = ?
        "#
    );
    conn.query_row(&sql, params![id], summary_from_row)
        .optional()
        .map_err(|e| ServerError::DbError(format!("select need failed: {e}")))
}

/// Filters for need listings. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct NeedFilter {
    pub entry_type: Option<CategoryType>,
    pub category_id: Option<i64>,
    pub disaster_id: Option<i64>,
    pub status: Option<NeedStatus>,
    pub geolocated_only: bool,
    pub limit: Option<i64>,
}

/// Needs matching the filter, newest first.
pub fn list_needs(conn: &Connection, filter: &NeedFilter) -> Result<Vec<NeedSummary>, ServerError> {
    let geo = if filter.geolocated_only {
        "and n.latitude is not null and n.longitude is not null"
    } else {
        ""
    };
    let sql = format!(
        r#"
        select {NEED_COLUMNS}, d.name, c.name, c.category_type
        from needs n
        join disasters d on d.id = n.disaster_id
        left join categories c on c.id = n.category_id
        where (?1 is null or c.category_type = ?1)
          and (?2 is null or n.category_id = ?2)
          and (?3 is null or n.disaster_id = ?3)
          and (?4 is null or n.status = ?4)
          {geo}
        order by n.created_at desc, n.id desc
        limit ?5
        "#
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            filter.entry_type,
            filter.category_id,
            filter.disaster_id,
            filter.status,
            filter.limit.unwrap_or(-1),
        ],
        summary_from_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Number of needs with the given status per category type.
pub fn count_by_entry_type(
    conn: &Connection,
    status: NeedStatus,
    entry_type: CategoryType,
) -> Result<i64, ServerError> {
    conn.query_row(
        r#"
        select count(*)
        from needs n
        join categories c on c.id = n.category_id
        where n.status = ? and c.category_type = ?
        "#,
        params![status, entry_type],
        |r| r.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("count needs failed: {e}")))
}

/// Writes the editable descriptive columns from an already-updated need.
pub fn update_need_fields(conn: &Connection, need: &Need, now: i64) -> Result<(), ServerError> {
    conn.execute(
        r#"
        update needs set
            title = ?1, description = ?2, location = ?3, latitude = ?4, longitude = ?5,
            city = ?6, contact_person = ?7, contact_phone = ?8, priority = ?9,
            category_id = ?10, updated_at = ?11
        where id = ?12
        "#,
        params![
            need.title,
            need.description,
            need.location,
            need.latitude,
            need.longitude,
            need.city,
            need.contact_person,
            need.contact_phone,
            need.priority,
            need.category_id,
            now,
            need.id,
        ],
    )?;
    Ok(())
}

pub fn set_status(
    conn: &Connection,
    need_id: i64,
    status: NeedStatus,
    resolved_at: Option<i64>,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "update needs set status = ?, resolved_at = ?, updated_at = ? where id = ?",
        params![status, resolved_at, now, need_id],
    )?;
    Ok(())
}

pub fn set_assignee(
    conn: &Connection,
    need_id: i64,
    assignee: Option<i64>,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "update needs set assigned_to = ?, updated_at = ? where id = ?",
        params![assignee, now, need_id],
    )?;
    Ok(())
}
