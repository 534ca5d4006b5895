// src/domain/need.rs

use serde::Serialize;

use crate::domain::changes::FieldChanges;
use crate::domain::status::{sql_text_enum, CategoryType, NeedStatus, Priority};

/// A reported problem or offered service, as stored in the `needs` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Need {
    pub id: i64,
    pub disaster_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,

    // Location
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: String,

    // Contact
    pub contact_person: String,
    pub contact_phone: String,

    pub status: NeedStatus,
    pub priority: Priority,
    pub reported_by: Option<i64>,
    pub assigned_to: Option<i64>,

    // Trust
    pub is_verified: bool,
    pub verified_by: Option<i64>,
    pub verified_at: Option<i64>,
    pub verification_notes: String,
    pub flag_count: i64,
    pub is_flagged: bool,

    pub created_at: i64,
    pub updated_at: i64,
    pub resolved_at: Option<i64>,
}

/// Input for creating a Need. Status always starts at `open`.
#[derive(Debug, Clone)]
pub struct NewNeed {
    pub disaster_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub priority: Priority,
    pub reported_by: Option<i64>,
    /// Problem or service row created alongside the need.
    pub details: Option<NeedDetails>,
}

impl NewNeed {
    pub fn new(disaster_id: i64, title: &str, description: &str) -> Self {
        Self {
            disaster_id,
            category_id: None,
            title: title.to_string(),
            description: description.to_string(),
            location: String::new(),
            latitude: None,
            longitude: None,
            city: String::new(),
            contact_person: String::new(),
            contact_phone: String::new(),
            priority: Priority::Medium,
            reported_by: None,
            details: None,
        }
    }

    /// Initial values captured in the `created` change log entry.
    pub fn initial_values(&self) -> FieldChanges {
        let mut changes = FieldChanges::new()
            .with("title", None::<&str>, &self.title)
            .with("status", None::<&str>, NeedStatus::Open)
            .with("priority", None::<&str>, self.priority);
        if let Some(details) = &self.details {
            changes.record("details", None::<&str>, details.kind());
        }
        changes
    }
}

/// Type-specific details supplied when a need is created.
#[derive(Debug, Clone)]
pub enum NeedDetails {
    Problem(ProblemDetails),
    Service(ServiceDetails),
}

impl NeedDetails {
    pub fn kind(&self) -> CategoryType {
        match self {
            NeedDetails::Problem(_) => CategoryType::Problem,
            NeedDetails::Service(_) => CategoryType::Service,
        }
    }
}

/// Editable descriptive fields. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct NeedUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub city: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub priority: Option<Priority>,
    pub category_id: Option<Option<i64>>,
}

impl Need {
    /// Field-level diff between the stored need and an update.
    /// Only fields that are present in the update and actually differ are recorded.
    pub fn diff(&self, update: &NeedUpdate) -> FieldChanges {
        let mut changes = FieldChanges::new();

        macro_rules! compare_and_log {
            ($field:ident) => {
                if let Some(new) = &update.$field {
                    if &self.$field != new {
                        changes.record(stringify!($field), &self.$field, new);
                    }
                }
            };
        }

        compare_and_log!(title);
        compare_and_log!(description);
        compare_and_log!(location);
        compare_and_log!(latitude);
        compare_and_log!(longitude);
        compare_and_log!(city);
        compare_and_log!(contact_person);
        compare_and_log!(contact_phone);
        compare_and_log!(priority);
        compare_and_log!(category_id);

        changes
    }

    /// Applies an update in memory.
    pub fn apply(&mut self, update: &NeedUpdate) {
        macro_rules! assign {
            ($($field:ident),+) => {
                $(if let Some(v) = &update.$field {
                    self.$field = v.clone();
                })+
            };
        }
        assign!(
            title,
            description,
            location,
            latitude,
            longitude,
            city,
            contact_person,
            contact_phone,
            priority,
            category_id
        );
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// A Need joined with the names of its disaster and category, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct NeedSummary {
    pub need: Need,
    pub disaster_name: String,
    pub category_name: Option<String>,
    pub category_type: Option<CategoryType>,
}

impl NeedSummary {
    /// Entry type follows the category; uncategorized needs count as problems.
    pub fn entry_type(&self) -> CategoryType {
        self.category_type.unwrap_or(CategoryType::Problem)
    }
}

sql_text_enum! {
    pub enum FieldType("field type") {
        Text => "text",
        Number => "number",
        Date => "date",
        Url => "url",
        Email => "email",
    }
}

/// Category-specific key/value attribute of a Need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub id: i64,
    pub need_id: i64,
    pub key: String,
    pub value: String,
    pub field_type: FieldType,
}

sql_text_enum! {
    pub enum ProblemSeverity("problem severity") {
        Minor => "minor",
        Moderate => "moderate",
        Major => "major",
        Critical => "critical",
        Catastrophic => "catastrophic",
    }
}

/// Problem-specific details of a Need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemDetails {
    pub id: i64,
    pub need_id: i64,
    pub severity: ProblemSeverity,
    pub affected_population: Option<i64>,
    pub infrastructure_type: String,
    pub estimated_repair_cost: Option<f64>,
    pub repair_time_estimate: String,
    pub blocks_access_to: String,
}

sql_text_enum! {
    pub enum ServiceType("service type") {
        Shelter => "shelter",
        Food => "food",
        Medical => "medical",
        Education => "education",
        Water => "water",
        Rescue => "rescue",
        Transport => "transport",
        Communication => "communication",
        Financial => "financial",
        Other => "other",
    }
}

/// Service-specific details of a Need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceDetails {
    pub id: i64,
    pub need_id: i64,
    pub service_type: ServiceType,
    pub capacity: Option<i64>,
    pub current_occupancy: i64,
    pub operating_hours: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub eligibility_criteria: String,
    pub requirements: String,
    pub provider_organization_id: Option<i64>,
}

impl ServiceDetails {
    pub fn is_at_capacity(&self) -> bool {
        matches!(self.capacity, Some(cap) if cap > 0 && self.current_occupancy >= cap)
    }

    /// Occupancy as a percentage of capacity; `None` without a capacity.
    pub fn availability_percentage(&self) -> Option<f64> {
        match self.capacity {
            Some(cap) if cap > 0 => Some(self.current_occupancy as f64 / cap as f64 * 100.0),
            _ => None,
        }
    }
}
