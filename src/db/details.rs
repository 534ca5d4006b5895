// src/db/details.rs
//
// Problem and Service detail rows, one-to-one with a Need.
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::need::{ProblemDetails, ServiceDetails};
use crate::errors::ServerError;

pub fn insert_problem(conn: &Connection, p: &ProblemDetails) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into problems (need_id, severity, affected_population, infrastructure_type,
                              estimated_repair_cost, repair_time_estimate, blocks_access_to)
        values (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            p.need_id,
            p.severity,
            p.affected_population,
            p.infrastructure_type,
            p.estimated_repair_cost,
            p.repair_time_estimate,
            p.blocks_access_to
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert problem failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_problem(conn: &Connection, need_id: i64) -> Result<Option<ProblemDetails>, ServerError> {
    conn.query_row(
        r#"
        select id, need_id, severity, affected_population, infrastructure_type,
               estimated_repair_cost, repair_time_estimate, blocks_access_to
        from problems where need_id = ?
        "#,
        params![need_id],
        |r| {
            Ok(ProblemDetails {
                id: r.get(0)?,
                need_id: r.get(1)?,
                severity: r.get(2)?,
                affected_population: r.get(3)?,
                infrastructure_type: r.get(4)?,
                estimated_repair_cost: r.get(5)?,
                repair_time_estimate: r.get(6)?,
                blocks_access_to: r.get(7)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select problem failed: {e}")))
}

/// Records that `problem_id` cannot be solved before `depends_on_id`.
/// Returns false when the dependency was already recorded.
pub fn add_problem_dependency(
    conn: &Connection,
    problem_id: i64,
    depends_on_id: i64,
) -> Result<bool, ServerError> {
    if problem_id == depends_on_id {
        return Err(ServerError::BadRequest("a problem cannot depend on itself".into()));
    }
    let n = conn.execute(
        "insert or ignore into problem_dependencies (problem_id, depends_on_id) values (?, ?)",
        params![problem_id, depends_on_id],
    )?;
    Ok(n > 0)
}

/// Needs (id, title) whose problems must be solved before this need's problem.
pub fn blocking_needs(conn: &Connection, need_id: i64) -> Result<Vec<(i64, String)>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select n.id, n.title
        from problems p
        join problem_dependencies d on d.problem_id = p.id
        join problems blocker on blocker.id = d.depends_on_id
        join needs n on n.id = blocker.need_id
        where p.need_id = ?
        order by n.id
        "#,
    )?;
    let rows = stmt.query_map(params![need_id], |r| Ok((r.get(0)?, r.get(1)?)))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_service(conn: &Connection, s: &ServiceDetails) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into services (need_id, service_type, capacity, current_occupancy, operating_hours,
                              start_date, end_date, eligibility_criteria, requirements,
                              provider_organization_id)
        values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            s.need_id,
            s.service_type,
            s.capacity,
            s.current_occupancy,
            s.operating_hours,
            s.start_date,
            s.end_date,
            s.eligibility_criteria,
            s.requirements,
            s.provider_organization_id
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert service failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_service(conn: &Connection, need_id: i64) -> Result<Option<ServiceDetails>, ServerError> {
    conn.query_row(
        r#"
        select id, need_id, service_type, capacity, current_occupancy, operating_hours,
               start_date, end_date, eligibility_criteria, requirements, provider_organization_id
        from services where need_id = ?
        "#,
        params![need_id],
        |r| {
            Ok(ServiceDetails {
                id: r.get(0)?,
                need_id: r.get(1)?,
                service_type: r.get(2)?,
                capacity: r.get(3)?,
                current_occupancy: r.get(4)?,
                operating_hours: r.get(5)?,
                start_date: r.get(6)?,
                end_date: r.get(7)?,
                eligibility_criteria: r.get(8)?,
                requirements: r.get(9)?,
                provider_organization_id: r.get(10)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select service failed: {e}")))
}
