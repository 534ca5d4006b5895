// src/domain/trust.rs

use serde::Serialize;

use crate::domain::changes::ChangeLogEntry;
use crate::domain::target::Target;

/// Current verification and flag state of one entity.
/// Fields stay `None` for kinds that do not carry them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustState {
    pub target: Target,
    pub is_verified: Option<bool>,
    pub verified_by: Option<i64>,
    pub verified_at: Option<i64>,
    pub verification_notes: Option<String>,
    pub flag_count: Option<i64>,
    pub is_flagged: Option<bool>,
}

impl TrustState {
    pub fn unflagged(target: Target) -> Self {
        Self {
            target,
            is_verified: None,
            verified_by: None,
            verified_at: None,
            verification_notes: None,
            flag_count: None,
            is_flagged: None,
        }
    }
}

/// Trust state plus the ordered audit history, as served by the query surface.
#[derive(Debug, Clone, Serialize)]
pub struct TrustReport {
    pub state: TrustState,
    pub open_reports: i64,
    pub history: Vec<ChangeLogEntry>,
}
