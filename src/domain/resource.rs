// src/domain/resource.rs

use serde::Serialize;

use crate::domain::status::{sql_text_enum, ResourceStatus};
use crate::errors::ServerError;

/// Who is offering a resource. Exactly one kind of provider per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Provider {
    User(i64),
    Organization(i64),
}

impl Provider {
    /// Builds a provider from the two nullable columns/form fields.
    /// Both or neither set is rejected.
    pub fn from_parts(user: Option<i64>, organization: Option<i64>) -> Result<Self, ServerError> {
        match (user, organization) {
            (Some(u), None) => Ok(Provider::User(u)),
            (None, Some(o)) => Ok(Provider::Organization(o)),
            (Some(_), Some(_)) => Err(ServerError::InvalidProviderAssignment(
                "cannot specify both provider_user and provider_organization".into(),
            )),
            (None, None) => Err(ServerError::InvalidProviderAssignment(
                "either provider_user or provider_organization must be specified".into(),
            )),
        }
    }

    pub fn user_id(self) -> Option<i64> {
        match self {
            Provider::User(id) => Some(id),
            Provider::Organization(_) => None,
        }
    }

    pub fn organization_id(self) -> Option<i64> {
        match self {
            Provider::Organization(id) => Some(id),
            Provider::User(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub id: i64,
    pub need_id: i64,
    /// `None` once the provider row has been deleted.
    pub provider: Option<Provider>,
    pub description: String,
    pub quantity: String,
    pub availability_date: Option<String>,
    pub contact_info: String,
    pub is_verified: bool,
    pub verified_by: Option<i64>,
    pub verified_at: Option<i64>,
    pub verification_notes: String,
    pub flag_count: i64,
    pub is_flagged: bool,
    pub status: ResourceStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for offering a resource. The provider pair is validated on create.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub need_id: i64,
    pub provider_user: Option<i64>,
    pub provider_organization: Option<i64>,
    pub description: String,
    pub quantity: String,
    pub availability_date: Option<String>,
    pub contact_info: String,
}

impl NewResource {
    pub fn provider(&self) -> Result<Provider, ServerError> {
        Provider::from_parts(self.provider_user, self.provider_organization)
    }
}

sql_text_enum! {
    /// Listing filter on who offers a resource.
    pub enum ProviderKind("provider type") {
        Individual => "individual",
        Organization => "organization",
    }
}

/// A resource joined with its need and provider names, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSummary {
    pub resource: Resource,
    pub need_title: String,
    pub category_name: Option<String>,
    pub provider_name: Option<String>,
}

sql_text_enum! {
    pub enum OrganizationType("organization type") {
        Ngo => "ngo",
        Government => "government",
        Private => "private",
        Charity => "charity",
        International => "international",
        Other => "other",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub organization_type: OrganizationType,
    pub description: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub is_verified: bool,
    pub verified_by: Option<i64>,
    pub verified_at: Option<i64>,
    pub verification_notes: String,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub organization_type: OrganizationType,
    pub description: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub created_by: Option<i64>,
}

impl NewOrganization {
    pub fn new(name: &str, organization_type: OrganizationType) -> Self {
        Self {
            name: name.to_string(),
            organization_type,
            description: String::new(),
            contact_person: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            address: String::new(),
            created_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_provider_is_accepted() {
        assert_eq!(Provider::from_parts(Some(3), None).unwrap(), Provider::User(3));
        assert_eq!(
            Provider::from_parts(None, Some(4)).unwrap(),
            Provider::Organization(4)
        );
    }

    #[test]
    fn both_or_neither_provider_is_rejected() {
        for (user, org) in [(Some(1), Some(2)), (None, None)] {
            let err = Provider::from_parts(user, org).unwrap_err();
            assert!(matches!(err, ServerError::InvalidProviderAssignment(_)));
        }
    }

    #[test]
    fn provider_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Provider::Organization(9)).unwrap();
        assert_eq!(json, r#"{"kind":"organization","id":9}"#);
    }
}
