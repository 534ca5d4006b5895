// src/db/organizations.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::resource::{NewOrganization, Organization};
use crate::errors::ServerError;

pub fn insert_organization(
    conn: &Connection,
    o: &NewOrganization,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into organizations (name, organization_type, description, contact_person, phone,
                                   email, website, address, created_by, created_at, updated_at)
        values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
        "#,
        params![
            o.name,
            o.organization_type,
            o.description,
            o.contact_person,
            o.phone,
            o.email,
            o.website,
            o.address,
            o.created_by,
            now
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert organization failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_organization(conn: &Connection, id: i64) -> Result<Option<Organization>, ServerError> {
    conn.query_row(
        r#"
        select id, name, organization_type, description, contact_person, phone, email, website,
               address, is_verified, verified_by, verified_at, verification_notes, created_by,
               created_at, updated_at
        from organizations where id = ?
        "#,
        params![id],
        |r| {
            Ok(Organization {
                id: r.get(0)?,
                name: r.get(1)?,
                organization_type: r.get(2)?,
                description: r.get(3)?,
                contact_person: r.get(4)?,
                phone: r.get(5)?,
                email: r.get(6)?,
                website: r.get(7)?,
                address: r.get(8)?,
                is_verified: r.get(9)?,
                verified_by: r.get(10)?,
                verified_at: r.get(11)?,
                verification_notes: r.get(12)?,
                created_by: r.get(13)?,
                created_at: r.get(14)?,
                updated_at: r.get(15)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select organization failed: {e}")))
}
