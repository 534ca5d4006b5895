// src/domain/report.rs

use serde::Serialize;

use crate::domain::status::{ReportStatus, ReportType};
use crate::domain::target::Target;

/// A community report against any target entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: i64,
    pub target: Target,
    pub report_type: ReportType,
    pub description: String,
    pub evidence: String,
    pub reported_by: Option<i64>,
    pub reporter_email: String,
    pub status: ReportStatus,
    pub reviewed_by: Option<i64>,
    pub review_notes: String,
    pub action_taken: String,
    pub created_at: i64,
    pub reviewed_at: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub target: Target,
    /// `None` for anonymous reports, which carry `reporter_email` instead.
    pub reported_by: Option<i64>,
    pub reporter_email: String,
    pub report_type: ReportType,
    pub description: String,
    pub evidence: String,
}

impl NewReport {
    pub fn by_user(target: Target, user_id: i64, report_type: ReportType, description: &str) -> Self {
        Self {
            target,
            reported_by: Some(user_id),
            reporter_email: String::new(),
            report_type,
            description: description.to_string(),
            evidence: String::new(),
        }
    }

    pub fn anonymous(target: Target, email: &str, report_type: ReportType, description: &str) -> Self {
        Self {
            target,
            reported_by: None,
            reporter_email: email.to_string(),
            report_type,
            description: description.to_string(),
            evidence: String::new(),
        }
    }
}

/// A moderator's decision on a report.
#[derive(Debug, Clone)]
pub struct ReportReview {
    pub status: ReportStatus,
    pub review_notes: String,
    pub action_taken: String,
}

impl ReportReview {
    pub fn new(status: ReportStatus) -> Self {
        Self {
            status,
            review_notes: String::new(),
            action_taken: String::new(),
        }
    }
}
