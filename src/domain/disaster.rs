// src/domain/disaster.rs

use serde::Serialize;

use crate::domain::status::{CategoryType, Severity};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Disaster {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub affected_areas: String,
    pub severity: Severity,
    pub start_date: String,
    pub end_date: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Disaster {
    /// A disaster stays active until it has an end date.
    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewDisaster {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub affected_areas: String,
    pub severity: Severity,
    pub start_date: String,
    pub end_date: Option<String>,
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category_type: CategoryType,
    pub icon: String,
}
