// src/db/resources.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::resource::{NewResource, Provider, ProviderKind, Resource, ResourceSummary};
use crate::domain::status::ResourceStatus;
use crate::errors::ServerError;

const RESOURCE_COLUMNS: &str = "r.id, r.need_id, r.provider_user_id, r.provider_organization_id, \
     r.description, r.quantity, r.availability_date, r.contact_info, r.is_verified, r.verified_by, \
     r.verified_at, r.verification_notes, r.flag_count, r.is_flagged, r.status, r.created_at, \
     r.updated_at";

const SUMMARY_JOINS: &str = "join needs n on n.id = r.need_id \
     left join categories c on c.id = n.category_id \
     left join users u on u.id = r.provider_user_id \
     left join organizations o on o.id = r.provider_organization_id";

fn resource_from_row(r: &Row) -> rusqlite::Result<Resource> {
    let user: Option<i64> = r.get(2)?;
    let org: Option<i64> = r.get(3)?;
    Ok(Resource {
        id: r.get(0)?,
        need_id: r.get(1)?,
        provider: Provider::from_parts(user, org).ok(),
        description: r.get(4)?,
        quantity: r.get(5)?,
        availability_date: r.get(6)?,
        contact_info: r.get(7)?,
        is_verified: r.get(8)?,
        verified_by: r.get(9)?,
        verified_at: r.get(10)?,
        verification_notes: r.get(11)?,
        flag_count: r.get(12)?,
        is_flagged: r.get(13)?,
        status: r.get(14)?,
        created_at: r.get(15)?,
        updated_at: r.get(16)?,
    })
}

fn summary_from_row(r: &Row) -> rusqlite::Result<ResourceSummary> {
    Ok(ResourceSummary {
        resource: resource_from_row(r)?,
        need_title: r.get(17)?,
        category_name: r.get(18)?,
        provider_name: r.get(19)?,
    })
}

/// Inserts an already-validated resource offer in status `offered`.
pub fn insert_resource(
    conn: &Connection,
    r: &NewResource,
    provider: Provider,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into resources (need_id, provider_user_id, provider_organization_id, description,
                               quantity, availability_date, contact_info, status,
                               created_at, updated_at)
        values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
        "#,
        params![
            r.need_id,
            provider.user_id(),
            provider.organization_id(),
            r.description,
            r.quantity,
            r.availability_date,
            r.contact_info,
            ResourceStatus::Offered,
            now
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert resource failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn get_resource(conn: &Connection, id: i64) -> Result<Option<Resource>, ServerError> {
    let sql = format!("select {RESOURCE_COLUMNS} from resources r where r.id = ?");
    conn.query_row(&sql, params![id], resource_from_row)
        .optional()
        .map_err(|e| ServerError::DbError(format!("select resource failed: {e}")))
}

pub fn get_resource_summary(conn: &Connection, id: i64) -> Result<Option<ResourceSummary>, ServerError> {
    let sql = format!(
        "select {RESOURCE_COLUMNS}, n.title, c.name, coalesce(u.username, o.name) \
         from resources r {SUMMARY_JOINS} where r.id = ?"
    );
    conn.query_row(&sql, params![id], summary_from_row)
        .optional()
        .map_err(|e| ServerError::DbError(format!("select resource failed: {e}")))
}

pub fn list_resources_for_need(conn: &Connection, need_id: i64) -> Result<Vec<Resource>, ServerError> {
    let sql = format!(
        "select {RESOURCE_COLUMNS} from resources r where r.need_id = ? \
         order by r.created_at desc, r.id desc"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![need_id], resource_from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Filters for resource listings. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub status: Option<ResourceStatus>,
    /// Category of the need the resource is offered for.
    pub category_id: Option<i64>,
    pub provider_kind: Option<ProviderKind>,
    /// Substring of the description, need title or need location.
    pub search: Option<String>,
    pub limit: Option<i64>,
}

/// Resources matching the filter, newest first.
pub fn list_resources(conn: &Connection, filter: &ResourceFilter) -> Result<Vec<ResourceSummary>, ServerError> {
    let sql = format!(
        r#"
        select {RESOURCE_COLUMNS}, n.title, c.name, coalesce(u.username, o.name)
        from resources r
        {SUMMARY_JOINS}
        where (?1 is null or r.status = ?1)
          and (?2 is null or n.category_id = ?2)
          and (?3 is null
               or (?3 = 'individual' and r.provider_user_id is not null)
               or (?3 = 'organization' and r.provider_organization_id is not null))
          and (?4 is null or r.description like ?4 or n.title like ?4 or n.location like ?4)
        order by r.created_at desc, r.id desc
        limit ?5
        "#
    );
    let pattern = filter.search.as_ref().map(|s| format!("%{s}%"));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            filter.status,
            filter.category_id,
            filter.provider_kind,
            pattern,
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

pub fn set_resource_status(
    conn: &Connection,
    id: i64,
    status: ResourceStatus,
    now: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "update resources set status = ?, updated_at = ? where id = ?",
        params![status, now, id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::disasters::insert_category;
    use crate::db::organizations::insert_organization;
    use crate::domain::resource::{NewOrganization, OrganizationType};
    use crate::domain::status::CategoryType;
    use crate::tests::utils::{memory_conn, seed_need, seed_user};

    fn offer(conn: &Connection, need_id: i64, provider: Provider, description: &str, now: i64) -> i64 {
        let new = NewResource {
            need_id,
            provider_user: provider.user_id(),
            provider_organization: provider.organization_id(),
            description: description.to_string(),
            quantity: "1".to_string(),
            availability_date: None,
            contact_info: String::new(),
        };
        insert_resource(conn, &new, provider, now).unwrap()
    }

    #[test]
    fn listing_filters_by_provider_kind_status_and_category() {
        let conn = memory_conn();
        let water = insert_category(&conn, "Water", CategoryType::Problem, "").unwrap();
        let need = seed_need(&conn, "Wells contaminated");
        conn.execute("update needs set category_id = ? where id = ?", params![water, need])
            .unwrap();
        let other_need = seed_need(&conn, "Roof leaking");

        let donor = seed_user(&conn, "donor");
        let org = insert_organization(&conn, &NewOrganization::new("Aqua Aid", OrganizationType::Ngo), 1)
            .unwrap();

        let bottles = offer(&conn, need, Provider::User(donor), "Bottled water", 1);
        let tanker = offer(&conn, need, Provider::Organization(org), "Water tanker", 2);
        let tarp = offer(&conn, other_need, Provider::User(donor), "Tarpaulin", 3);
        set_resource_status(&conn, tarp, ResourceStatus::Cancelled, 4).unwrap();

        let offered = ResourceFilter {
            status: Some(ResourceStatus::Offered),
            ..Default::default()
        };
        let ids = |f: &ResourceFilter| -> Vec<i64> {
            list_resources(&conn, f).unwrap().iter().map(|s| s.resource.id).collect()
        };

        assert_eq!(ids(&offered), vec![tanker, bottles]);
        assert_eq!(
            ids(&ResourceFilter {
                provider_kind: Some(ProviderKind::Individual),
                ..offered.clone()
            }),
            vec![bottles]
        );
        assert_eq!(
            ids(&ResourceFilter {
                search: Some("tanker".to_string()),
                ..offered.clone()
            }),
            vec![tanker]
        );
        assert_eq!(
            ids(&ResourceFilter {
                category_id: Some(water),
                ..Default::default()
            }),
            vec![tanker, bottles]
        );

        let summary = get_resource_summary(&conn, tanker).unwrap().unwrap();
        assert_eq!(summary.provider_name.as_deref(), Some("Aqua Aid"));
        assert_eq!(summary.category_name.as_deref(), Some("Water"));
        assert_eq!(summary.need_title, "Wells contaminated");
    }
}
