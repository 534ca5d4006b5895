// src/workflow/disasters.rs
//
// Disasters are managed by moderators; needs hang off them.
use rusqlite::Connection;

use crate::auth::policy::{Actor, TrustPolicy};
use crate::db::{changelog, disasters};
use crate::domain::changes::FieldChanges;
use crate::domain::disaster::{Disaster, NewDisaster};
use crate::domain::status::ChangeAction;
use crate::domain::target::{Target, TargetKind};
use crate::errors::ServerError;
use crate::workflow::{in_transaction, Workflow};

/// Slugs appear in URLs: lowercase ascii letters, digits and dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl<P: TrustPolicy> Workflow<P> {
    fn ensure_moderator(&self, actor: &Actor) -> Result<(), ServerError> {
        if self.policy().can_moderate(actor) {
            Ok(())
        } else {
            tracing::warn!(user = actor.user_id, "disaster change refused");
            Err(ServerError::Forbidden("moderators only".into()))
        }
    }

    pub fn create_disaster(
        &self,
        conn: &mut Connection,
        mut new: NewDisaster,
        actor: &Actor,
        now: i64,
    ) -> Result<Disaster, ServerError> {
        self.ensure_moderator(actor)?;
        if new.name.trim().is_empty() {
            return Err(ServerError::BadRequest("disaster name is required".into()));
        }
        if !is_valid_slug(&new.slug) {
            return Err(ServerError::BadRequest(format!("invalid slug '{}'", new.slug)));
        }
        new.created_by = Some(actor.user_id);

        let disaster = in_transaction(conn, |tx| {
            if disasters::get_disaster_by_slug(tx, &new.slug)?.is_some() {
                return Err(ServerError::BadRequest(format!("slug '{}' is taken", new.slug)));
            }
            let id = disasters::insert_disaster(tx, &new, now)?;
            let initial = FieldChanges::new()
                .with("name", None::<&str>, &new.name)
                .with("severity", None::<&str>, new.severity);
            changelog::record(
                tx,
                ChangeAction::Created,
                Target::new(TargetKind::Disaster, id),
                Some(actor.user_id),
                &initial,
                &format!("declared '{}'", new.name),
                now,
            )?;
            disasters::get_disaster(tx, id)?.ok_or(ServerError::InternalError)
        })?;

        tracing::info!(disaster = disaster.id, slug = %disaster.slug, user = actor.user_id, "disaster created");
        Ok(disaster)
    }

    /// Removes a disaster and, by cascade, every need filed under it.
    /// The deletion itself stays in the change log.
    pub fn delete_disaster(
        &self,
        conn: &mut Connection,
        slug: &str,
        actor: &Actor,
        now: i64,
    ) -> Result<(), ServerError> {
        self.ensure_moderator(actor)?;

        let id = in_transaction(conn, |tx| {
            let disaster = disasters::get_disaster_by_slug(tx, slug)?.ok_or(ServerError::NotFound)?;
            disasters::delete_disaster(tx, disaster.id)?;
            changelog::record(
                tx,
                ChangeAction::Deleted,
                Target::new(TargetKind::Disaster, disaster.id),
                Some(actor.user_id),
                &FieldChanges::new().with("name", &disaster.name, None::<&str>),
                &format!("deleted '{}'", disaster.name),
                now,
            )?;
            Ok(disaster.id)
        })?;

        tracing::info!(disaster = id, user = actor.user_id, "disaster deleted");
        Ok(())
    }
}
