// src/workflow/verification.rs
use rusqlite::Connection;
use serde::Serialize;

use crate::auth::policy::{Actor, TrustPolicy};
use crate::db::{changelog, trust};
use crate::domain::changes::FieldChanges;
use crate::domain::status::ChangeAction;
use crate::domain::target::Target;
use crate::errors::ServerError;
use crate::workflow::{in_transaction, Workflow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub target: Target,
    pub verified_by: i64,
    pub verified_at: i64,
    /// The target was already verified before this call.
    pub was_verified: bool,
    pub change_id: i64,
}

impl<P: TrustPolicy> Workflow<P> {
    /// Marks a Need, Resource or Organization as verified by `actor`.
    ///
    /// Re-verifying overwrites `verified_by`, `verified_at` and the notes and
    /// still appends a change log entry.
    pub fn verify(
        &self,
        conn: &mut Connection,
        target: Target,
        actor: &Actor,
        notes: &str,
        now: i64,
    ) -> Result<VerificationResult, ServerError> {
        if !target.kind.entry().verifiable {
            return Err(ServerError::BadRequest(format!("{} cannot be verified", target.kind)));
        }
        if !self.policy().can_verify(actor, target) {
            tracing::warn!(%target, user = actor.user_id, "verification refused by policy");
            return Err(ServerError::Forbidden("not allowed to verify content".into()));
        }

        let result = in_transaction(conn, |tx| {
            let before = trust::load_trust_state(tx, target)?;
            let was_verified = before.is_verified.unwrap_or(false);

            trust::write_verification(tx, target, actor.user_id, notes, now)?;

            let changes = FieldChanges::new()
                .with("is_verified", was_verified, true)
                .with("verified_by", before.verified_by, actor.user_id)
                .with("verified_at", before.verified_at, now)
                .with("verification_notes", before.verification_notes, notes);
            let description = if was_verified {
                format!("re-verified by {}", actor.username)
            } else {
                format!("verified by {}", actor.username)
            };
            let change_id = changelog::record(
                tx,
                ChangeAction::StatusChanged,
                target,
                Some(actor.user_id),
                &changes,
                &description,
                now,
            )?;

            Ok(VerificationResult {
                target,
                verified_by: actor.user_id,
                verified_at: now,
                was_verified,
                change_id,
            })
        })?;

        tracing::info!(%target, user = actor.user_id, was_verified = result.was_verified, "verified");
        Ok(result)
    }
}
