//! Trust and lifecycle operations.
//!
//! Every public operation here runs as one `BEGIN IMMEDIATE` transaction:
//! it reads the current state, validates, writes, and appends the matching
//! change log entry. An error anywhere drops the transaction, which rolls
//! everything back, so a failed call leaves no partial writes and no orphaned
//! audit rows.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::auth::policy::{RolePolicy, TrustPolicy};
use crate::errors::ServerError;

pub mod disasters;
pub mod lifecycle;
pub mod moderation;
pub mod verification;

/// Entry point for mutations, parameterized over the authorization policy.
#[derive(Debug, Clone)]
pub struct Workflow<P: TrustPolicy = RolePolicy> {
    policy: P,
}

impl<P: TrustPolicy> Workflow<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl Default for Workflow<RolePolicy> {
    fn default() -> Self {
        Self::new(RolePolicy)
    }
}

/// Runs `f` in an immediate transaction; commits on `Ok`, rolls back on `Err`.
pub(crate) fn in_transaction<T, F>(conn: &mut Connection, f: F) -> Result<T, ServerError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, ServerError>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let out = f(&tx)?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))?;
    Ok(out)
}
