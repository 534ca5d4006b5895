// src/db/disasters.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::disaster::{Category, Disaster, NewDisaster};
use crate::domain::status::CategoryType;
use crate::errors::ServerError;

const DISASTER_COLUMNS: &str = "id, name, slug, description, affected_areas, severity, \
     start_date, end_date, created_by, created_at, updated_at";

fn disaster_from_row(r: &Row) -> rusqlite::Result<Disaster> {
    Ok(Disaster {
        id: r.get(0)?,
        name: r.get(1)?,
        slug: r.get(2)?,
        description: r.get(3)?,
        affected_areas: r.get(4)?,
        severity: r.get(5)?,
        start_date: r.get(6)?,
        end_date: r.get(7)?,
        created_by: r.get(8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub fn insert_disaster(conn: &Connection, d: &NewDisaster, now: i64) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into disasters (name, slug, description, affected_areas, severity,
                               start_date, end_date, created_by, created_at, updated_at)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            d.name,
            d.slug,
            d.description,
            d.affected_areas,
            d.severity,
            d.start_date,
            d.end_date,
            d.created_by,
            now,
            now
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert disaster failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_disaster(conn: &Connection, id: i64) -> Result<Option<Disaster>, ServerError> {
    let sql = format!("select {DISASTER_COLUMNS} from disasters where id = ?");
    conn.query_row(&sql, params![id], disaster_from_row)
        .optional()
        .map_err(|e| ServerError::DbError(format!("select disaster failed: {e}")))
}

pub fn get_disaster_by_slug(conn: &Connection, slug: &str) -> Result<Option<Disaster>, ServerError> {
    let sql = format!("select {DISASTER_COLUMNS} from disasters where slug = ?");
    conn.query_row(&sql, params![slug], disaster_from_row)
        .optional()
        .map_err(|e| ServerError::DbError(format!("select disaster failed: {e}")))
}

/// All disasters, most recent start first. `active_only` drops ended ones.
pub fn list_disasters(conn: &Connection, active_only: bool) -> Result<Vec<Disaster>, ServerError> {
    let filter = if active_only { "where end_date is null" } else { "" };
    let sql = format!("select {DISASTER_COLUMNS} from disasters {filter} order by start_date desc");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], disaster_from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Deletes a disaster; its needs and their satellites go with it.
pub fn delete_disaster(conn: &Connection, id: i64) -> Result<(), ServerError> {
    let n = conn
        .execute("delete from disasters where id = ?", params![id])
        .map_err(|e| ServerError::DbError(format!("delete disaster failed: {e}")))?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

fn category_from_row(r: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        description: r.get(2)?,
        category_type: r.get(3)?,
        icon: r.get(4)?,
    })
}

pub fn insert_category(
    conn: &Connection,
    name: &str,
    category_type: CategoryType,
    icon: &str,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert into categories (name, category_type, icon) values (?, ?, ?)",
        params![name, category_type, icon],
    )
    .map_err(|e| ServerError::DbError(format!("insert category failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_category(conn: &Connection, id: i64) -> Result<Option<Category>, ServerError> {
    conn.query_row(
        "select id, name, description, category_type, icon from categories where id = ?",
        params![id],
        category_from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select category failed: {e}")))
}

/// Categories ordered by type then name, optionally restricted to one type.
pub fn list_categories(
    conn: &Connection,
    category_type: Option<CategoryType>,
) -> Result<Vec<Category>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select id, name, description, category_type, icon
        from categories
        where ?1 is null or category_type = ?1
        order by category_type, name
        "#,
    )?;
    let rows = stmt.query_map(params![category_type], category_from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
