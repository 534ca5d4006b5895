// src/domain/target.rs

use rusqlite::{params, Connection};
use serde::Serialize;
use std::fmt;

use crate::domain::status::sql_text_enum;
use crate::errors::ServerError;

sql_text_enum! {
    /// Closed set of entity kinds that reports and change log entries may point at.
    pub enum TargetKind("target kind") {
        Disaster => "disaster",
        Need => "need",
        Resource => "resource",
        Organization => "organization",
        Comment => "comment",
        Photo => "photo",
        Report => "report",
    }
}

/// Per-kind storage facts. Rows are in variant order.
pub struct KindEntry {
    pub kind: TargetKind,
    pub table: &'static str,
    /// Carries is_verified / verified_by / verified_at / verification_notes.
    pub verifiable: bool,
    /// Carries flag_count / is_flagged.
    pub flaggable: bool,
}

const REGISTRY: &[KindEntry] = &[
    KindEntry { kind: TargetKind::Disaster, table: "disasters", verifiable: false, flaggable: false },
    KindEntry { kind: TargetKind::Need, table: "needs", verifiable: true, flaggable: true },
    KindEntry { kind: TargetKind::Resource, table: "resources", verifiable: true, flaggable: true },
    KindEntry { kind: TargetKind::Organization, table: "organizations", verifiable: true, flaggable: false },
    KindEntry { kind: TargetKind::Comment, table: "comments", verifiable: false, flaggable: false },
    KindEntry { kind: TargetKind::Photo, table: "photos", verifiable: false, flaggable: false },
    KindEntry { kind: TargetKind::Report, table: "reports", verifiable: false, flaggable: false },
];

impl TargetKind {
    pub fn entry(self) -> &'static KindEntry {
        &REGISTRY[self as usize]
    }
}

/// A generic reference to any stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Target {
    pub kind: TargetKind,
    pub id: i64,
}

impl Target {
    pub fn new(kind: TargetKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn need(id: i64) -> Self {
        Self::new(TargetKind::Need, id)
    }

    pub fn resource(id: i64) -> Self {
        Self::new(TargetKind::Resource, id)
    }

    pub fn organization(id: i64) -> Self {
        Self::new(TargetKind::Organization, id)
    }

    pub fn report(id: i64) -> Self {
        Self::new(TargetKind::Report, id)
    }

    /// Fails with `TargetNotFound` unless a row exists for this reference.
    pub fn ensure_exists(&self, conn: &Connection) -> Result<(), ServerError> {
        let sql = format!("select count(*) from {} where id = ?", self.kind.entry().table);
        let n: i64 = conn.query_row(&sql, params![self.id], |r| r.get(0))?;
        if n == 0 {
            return Err(ServerError::TargetNotFound(*self));
        }
        Ok(())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind, self.id)
    }
}
