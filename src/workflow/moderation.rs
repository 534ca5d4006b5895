// src/workflow/moderation.rs
//
// Community flagging and the moderator side of it.
use rusqlite::Connection;

use crate::auth::policy::{Actor, TrustPolicy};
use crate::db::{changelog, reports, trust};
use crate::domain::changes::FieldChanges;
use crate::domain::report::{NewReport, Report, ReportReview};
use crate::domain::status::ChangeAction;
use crate::domain::target::{Target, TargetKind};
use crate::domain::trust::{TrustReport, TrustState};
use crate::errors::ServerError;
use crate::workflow::{in_transaction, Workflow};

impl<P: TrustPolicy> Workflow<P> {
    /// Files a report against `report.target`.
    ///
    /// A signed-in user may report a given target once. For Needs and
    /// Resources the flag counter goes up by one in the same transaction.
    pub fn file_report(
        &self,
        conn: &mut Connection,
        report: NewReport,
        now: i64,
    ) -> Result<Report, ServerError> {
        let target = report.target;
        if target.kind == TargetKind::Report {
            return Err(ServerError::BadRequest("reports cannot be reported".into()));
        }
        if report.description.trim().is_empty() {
            return Err(ServerError::BadRequest("a report needs a description".into()));
        }

        let filed = in_transaction(conn, |tx| {
            target.ensure_exists(tx)?;
            if reports::has_reported(tx, target, report.reported_by)? {
                return Err(ServerError::DuplicateReport { target });
            }

            let report_id = reports::insert_report(tx, &report, now)?;
            let created = FieldChanges::new()
                .with("target", None::<Target>, target)
                .with("report_type", None::<&str>, report.report_type)
                .with("status", None::<&str>, "pending");
            changelog::record(
                tx,
                ChangeAction::Created,
                Target::report(report_id),
                report.reported_by,
                &created,
                &format!("{} reported as {}", target, report.report_type),
                now,
            )?;

            if target.kind.entry().flaggable {
                let count = trust::increment_flags(tx, target, now)?;
                let flagged = FieldChanges::new()
                    .with("flag_count", count - 1, count)
                    .with("is_flagged", count - 1 > 0, true);
                changelog::record(
                    tx,
                    ChangeAction::Updated,
                    target,
                    report.reported_by,
                    &flagged,
                    &format!("flagged by report #{report_id}"),
                    now,
                )?;
            }

            reports::get_report(tx, report_id)?.ok_or(ServerError::InternalError)
        });

        match &filed {
            Ok(r) => tracing::info!(report = r.id, %target, kind = %r.report_type, "report filed"),
            Err(ServerError::DuplicateReport { .. }) => {
                tracing::warn!(%target, reporter = ?report.reported_by, "duplicate report rejected")
            }
            Err(_) => {}
        }
        filed
    }

    /// Records a moderator's decision on a report.
    ///
    /// pending may move to any other status, investigating only to a
    /// terminal one, and terminal reports are closed for good.
    pub fn review_report(
        &self,
        conn: &mut Connection,
        report_id: i64,
        actor: &Actor,
        review: ReportReview,
        now: i64,
    ) -> Result<Report, ServerError> {
        if !self.policy().can_moderate(actor) {
            return Err(ServerError::Forbidden("moderators only".into()));
        }

        let reviewed = in_transaction(conn, |tx| {
            let target = Target::report(report_id);
            let current = reports::get_report(tx, report_id)?.ok_or(ServerError::TargetNotFound(target))?;

            if !current.status.can_transition_to(review.status) {
                return Err(ServerError::InvalidTransition {
                    entity: "report",
                    from: current.status.to_string(),
                    to: review.status.to_string(),
                });
            }

            reports::update_review(tx, report_id, &review, actor.user_id, now)?;

            let mut changes = FieldChanges::new().with("status", current.status, review.status);
            if review.review_notes != current.review_notes {
                changes.record("review_notes", &current.review_notes, &review.review_notes);
            }
            if review.action_taken != current.action_taken {
                changes.record("action_taken", &current.action_taken, &review.action_taken);
            }
            changelog::record(
                tx,
                ChangeAction::StatusChanged,
                target,
                Some(actor.user_id),
                &changes,
                &format!("report {} by {}", review.status, actor.username),
                now,
            )?;

            reports::get_report(tx, report_id)?.ok_or(ServerError::InternalError)
        })?;

        tracing::info!(report = report_id, status = %reviewed.status, user = actor.user_id, "report reviewed");
        Ok(reviewed)
    }

    /// Resets the flag counter of a Need or Resource.
    pub fn clear_flags(
        &self,
        conn: &mut Connection,
        target: Target,
        actor: &Actor,
        now: i64,
    ) -> Result<TrustState, ServerError> {
        if !self.policy().can_moderate(actor) {
            return Err(ServerError::Forbidden("moderators only".into()));
        }
        if !target.kind.entry().flaggable {
            return Err(ServerError::BadRequest(format!("{} has no flag counter", target.kind)));
        }

        let state = in_transaction(conn, |tx| {
            let before = trust::load_trust_state(tx, target)?;
            trust::reset_flags(tx, target, now)?;

            let changes = FieldChanges::new()
                .with("flag_count", before.flag_count.unwrap_or(0), 0)
                .with("is_flagged", before.is_flagged.unwrap_or(false), false);
            changelog::record(
                tx,
                ChangeAction::Updated,
                target,
                Some(actor.user_id),
                &changes,
                &format!("flags cleared by {}", actor.username),
                now,
            )?;

            trust::load_trust_state(tx, target)
        })?;

        tracing::info!(%target, user = actor.user_id, "flags cleared");
        Ok(state)
    }
}

/// Reports still pending or under investigation, oldest first.
pub fn moderation_queue(conn: &Connection) -> Result<Vec<Report>, ServerError> {
    reports::list_open_reports(conn)
}

/// Current trust state of a target with its open report count and full history.
pub fn trust_report(conn: &Connection, target: Target) -> Result<TrustReport, ServerError> {
    let state = trust::load_trust_state(conn, target)?;
    let open_reports = reports::count_open_reports_for_target(conn, target)?;
    let history = changelog::history(conn, target)?;
    Ok(TrustReport {
        state,
        open_reports,
        history,
    })
}
