// src/domain/changes.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::status::ChangeAction;
use crate::domain::target::Target;

/// Previous and new value of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// Changed-field name -> {old, new}. Stored as a JSON object in `change_log.field_changes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldChanges(BTreeMap<String, FieldChange>);

impl FieldChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a change entry. Values that fail to serialize are stored as null.
    pub fn record<O: Serialize, N: Serialize>(&mut self, field: &str, old: O, new: N) {
        let old = serde_json::to_value(old).unwrap_or(Value::Null);
        let new = serde_json::to_value(new).unwrap_or(Value::Null);
        self.0.insert(field.to_string(), FieldChange { old, new });
    }

    /// Builder form of `record`.
    pub fn with<O: Serialize, N: Serialize>(mut self, field: &str, old: O, new: N) -> Self {
        self.record(field, old, new);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldChange)> {
        self.0.iter()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// One row of the append-only audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeLogEntry {
    pub id: i64,
    pub target: Target,
    pub user_id: Option<i64>,
    pub action: ChangeAction,
    pub field_changes: FieldChanges,
    pub description: String,
    pub timestamp: i64,
}
