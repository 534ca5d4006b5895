// src/domain/status.rs

use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a fieldless enum that is stored as TEXT in SQLite.
/// Generates `as_str`, `ALL`, `FromStr`, `Display`, `ToSql` and `FromSql`.
macro_rules! sql_text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident($label:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::status::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::domain::status::ParseEnumError {
                        kind: $label,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse::<$name>()
                    .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

pub(crate) use sql_text_enum;

sql_text_enum! {
    /// Lifecycle of a Need.
    pub enum NeedStatus("need status") {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Verified => "verified",
        Closed => "closed",
        Reopened => "reopened",
    }
}

impl NeedStatus {
    /// Statuses reachable from `self` by a caller-driven transition.
    pub fn next_states(self) -> &'static [NeedStatus] {
        use NeedStatus::*;
        match self {
            Open | Reopened => &[InProgress, Closed],
            InProgress => &[Resolved, Closed],
            Resolved => &[Verified, Closed, Reopened],
            Verified => &[Closed, Reopened],
            Closed => &[Reopened],
        }
    }

    pub fn can_transition_to(self, next: NeedStatus) -> bool {
        self.next_states().contains(&next)
    }

    /// Open and reopened needs are the ones still waiting for help.
    pub fn is_active(self) -> bool {
        matches!(self, NeedStatus::Open | NeedStatus::Reopened)
    }
}

sql_text_enum! {
    pub enum Priority("priority") {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

sql_text_enum! {
    /// Lifecycle of a Resource offer.
    pub enum ResourceStatus("resource status") {
        Offered => "offered",
        Confirmed => "confirmed",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

impl ResourceStatus {
    pub fn can_transition_to(self, next: ResourceStatus) -> bool {
        use ResourceStatus::*;
        matches!(
            (self, next),
            (Offered, Confirmed) | (Offered, Cancelled) | (Confirmed, Delivered) | (Confirmed, Cancelled)
        )
    }
}

sql_text_enum! {
    /// Moderation state of a Report.
    pub enum ReportStatus("report status") {
        Pending => "pending",
        Investigating => "investigating",
        Resolved => "resolved",
        Dismissed => "dismissed",
        ActionTaken => "action_taken",
    }
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReportStatus::Resolved | ReportStatus::Dismissed | ReportStatus::ActionTaken
        )
    }

    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        match self {
            ReportStatus::Pending => next != ReportStatus::Pending,
            ReportStatus::Investigating => next.is_terminal(),
            _ => false,
        }
    }
}

sql_text_enum! {
    pub enum ReportType("report type") {
        Misleading => "misleading",
        False => "false",
        Spam => "spam",
        Inappropriate => "inappropriate",
        Duplicate => "duplicate",
        Outdated => "outdated",
        Other => "other",
    }
}

sql_text_enum! {
    pub enum ChangeAction("change action") {
        Created => "created",
        Updated => "updated",
        Deleted => "deleted",
        StatusChanged => "status_changed",
        Assigned => "assigned",
        Resolved => "resolved",
    }
}

sql_text_enum! {
    pub enum CategoryType("category type") {
        Problem => "problem",
        Service => "service",
        Information => "information",
    }
}

sql_text_enum! {
    pub enum Severity("disaster severity") {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}
