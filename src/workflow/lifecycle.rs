// src/workflow/lifecycle.rs
//
// Creation, edits and status changes of needs, resources and related records.
// Each mutation writes exactly one change log entry.
use rusqlite::Connection;

use crate::auth::policy::{Actor, TrustPolicy};
use crate::db::{changelog, comments, details, disasters, fields, needs, organizations, resources, users};
use crate::domain::changes::FieldChanges;
use crate::domain::need::{Field, FieldType, Need, NeedDetails, NeedUpdate, NewNeed};
use crate::domain::resource::{NewOrganization, NewResource, Organization, Provider, Resource};
use crate::domain::status::{ChangeAction, NeedStatus, ResourceStatus};
use crate::domain::target::{Target, TargetKind};
use crate::errors::ServerError;
use crate::workflow::{in_transaction, Workflow};

fn load_need(conn: &Connection, need_id: i64) -> Result<Need, ServerError> {
    needs::get_need(conn, need_id)?.ok_or(ServerError::TargetNotFound(Target::need(need_id)))
}

fn load_resource(conn: &Connection, id: i64) -> Result<Resource, ServerError> {
    resources::get_resource(conn, id)?.ok_or(ServerError::TargetNotFound(Target::resource(id)))
}

fn ensure_category(conn: &Connection, category_id: Option<i64>) -> Result<(), ServerError> {
    match category_id {
        Some(id) if disasters::get_category(conn, id)?.is_none() => {
            Err(ServerError::BadRequest(format!("unknown category {id}")))
        }
        _ => Ok(()),
    }
}

fn insert_details(conn: &Connection, need_id: i64, extra: &NeedDetails) -> Result<(), ServerError> {
    match extra {
        NeedDetails::Problem(p) => {
            let mut row = p.clone();
            row.need_id = need_id;
            details::insert_problem(conn, &row)?;
        }
        NeedDetails::Service(s) => {
            if let Some(org) = s.provider_organization_id {
                Target::organization(org).ensure_exists(conn)?;
            }
            let mut row = s.clone();
            row.need_id = need_id;
            details::insert_service(conn, &row)?;
        }
    }
    Ok(())
}

/// Problem row id of a need, or `BadRequest` when the need is not a problem.
fn problem_id_of(conn: &Connection, need_id: i64) -> Result<i64, ServerError> {
    load_need(conn, need_id)?;
    details::get_problem(conn, need_id)?
        .map(|p| p.id)
        .ok_or_else(|| ServerError::BadRequest(format!("need #{need_id} has no problem details")))
}

impl<P: TrustPolicy> Workflow<P> {
    fn ensure_can_change(&self, actor: &Actor, target: Target) -> Result<(), ServerError> {
        if self.policy().can_change_status(actor, target) {
            Ok(())
        } else {
            Err(ServerError::Forbidden(format!("not allowed to change {target}")))
        }
    }

    pub fn create_need(&self, conn: &mut Connection, new: NewNeed, now: i64) -> Result<Need, ServerError> {
        if new.title.trim().is_empty() {
            return Err(ServerError::BadRequest("title is required".into()));
        }

        let need = in_transaction(conn, |tx| {
            Target::new(TargetKind::Disaster, new.disaster_id).ensure_exists(tx)?;
            ensure_category(tx, new.category_id)?;
            let id = needs::insert_need(tx, &new, now)?;
            if let Some(extra) = &new.details {
                insert_details(tx, id, extra)?;
            }
            changelog::record(
                tx,
                ChangeAction::Created,
                Target::need(id),
                new.reported_by,
                &new.initial_values(),
                &format!("created '{}'", new.title),
                now,
            )?;
            load_need(tx, id)
        })?;

        tracing::info!(need = need.id, disaster = need.disaster_id, "need created");
        Ok(need)
    }

    /// Applies an edit and logs the fields that actually changed.
    /// An edit that changes nothing writes nothing.
    pub fn update_need(
        &self,
        conn: &mut Connection,
        need_id: i64,
        actor: &Actor,
        update: &NeedUpdate,
        now: i64,
    ) -> Result<Need, ServerError> {
        self.ensure_can_change(actor, Target::need(need_id))?;

        in_transaction(conn, |tx| {
            let mut need = load_need(tx, need_id)?;
            if let Some(category_id) = update.category_id {
                ensure_category(tx, category_id)?;
            }
            let changes = need.diff(update);
            if changes.is_empty() {
                return Ok(need);
            }

            need.apply(update);
            needs::update_need_fields(tx, &need, now)?;
            need.updated_at = now;

            let names: Vec<&str> = changes.iter().map(|(k, _)| k.as_str()).collect();
            changelog::record(
                tx,
                ChangeAction::Updated,
                Target::need(need_id),
                Some(actor.user_id),
                &changes,
                &format!("updated {}", names.join(", ")),
                now,
            )?;
            Ok(need)
        })
    }

    /// Moves a need along its lifecycle.
    ///
    /// Entering `resolved` stamps `resolved_at`; `reopened` clears it.
    pub fn change_need_status(
        &self,
        conn: &mut Connection,
        need_id: i64,
        actor: &Actor,
        next: NeedStatus,
        now: i64,
    ) -> Result<Need, ServerError> {
        self.ensure_can_change(actor, Target::need(need_id))?;

        let need = in_transaction(conn, |tx| {
            let need = load_need(tx, need_id)?;
            if !need.status.can_transition_to(next) {
                return Err(ServerError::InvalidTransition {
                    entity: "need",
                    from: need.status.to_string(),
                    to: next.to_string(),
                });
            }

            let resolved_at = match next {
                NeedStatus::Resolved => Some(now),
                NeedStatus::Reopened => None,
                _ => need.resolved_at,
            };
            needs::set_status(tx, need_id, next, resolved_at, now)?;

            let mut changes = FieldChanges::new().with("status", need.status, next);
            if resolved_at != need.resolved_at {
                changes.record("resolved_at", need.resolved_at, resolved_at);
            }
            changelog::record(
                tx,
                ChangeAction::StatusChanged,
                Target::need(need_id),
                Some(actor.user_id),
                &changes,
                &format!("{} -> {}", need.status, next),
                now,
            )?;
            load_need(tx, need_id)
        })?;

        tracing::info!(need = need_id, status = %next, user = actor.user_id, "need status changed");
        Ok(need)
    }

    /// Assigns (or with `None`, unassigns) a need.
    pub fn assign_need(
        &self,
        conn: &mut Connection,
        need_id: i64,
        actor: &Actor,
        assignee: Option<i64>,
        now: i64,
    ) -> Result<Need, ServerError> {
        self.ensure_can_change(actor, Target::need(need_id))?;

        in_transaction(conn, |tx| {
            let need = load_need(tx, need_id)?;
            if let Some(user_id) = assignee {
                if users::get_actor(tx, user_id)?.is_none() {
                    return Err(ServerError::BadRequest(format!("unknown user {user_id}")));
                }
            }

            needs::set_assignee(tx, need_id, assignee, now)?;
            let changes = FieldChanges::new().with("assigned_to", need.assigned_to, assignee);
            let description = match assignee {
                Some(user_id) => format!("assigned to user {user_id}"),
                None => "unassigned".to_string(),
            };
            changelog::record(
                tx,
                ChangeAction::Assigned,
                Target::need(need_id),
                Some(actor.user_id),
                &changes,
                &description,
                now,
            )?;
            load_need(tx, need_id)
        })
    }

    /// Adds a custom field. A key already present on the need is a conflict.
    pub fn add_field(
        &self,
        conn: &mut Connection,
        need_id: i64,
        actor: &Actor,
        key: &str,
        value: &str,
        field_type: FieldType,
        now: i64,
    ) -> Result<Field, ServerError> {
        self.ensure_can_change(actor, Target::need(need_id))?;

        in_transaction(conn, |tx| {
            load_need(tx, need_id)?;
            fields::add_field(tx, need_id, key, value, field_type)?;
            log_field_change(tx, need_id, actor, key, None, value, now)?;
            fields::get_field(tx, need_id, key)?.ok_or(ServerError::InternalError)
        })
    }

    /// Upserts a custom field by key.
    pub fn set_field(
        &self,
        conn: &mut Connection,
        need_id: i64,
        actor: &Actor,
        key: &str,
        value: &str,
        field_type: FieldType,
        now: i64,
    ) -> Result<Field, ServerError> {
        self.ensure_can_change(actor, Target::need(need_id))?;

        in_transaction(conn, |tx| {
            load_need(tx, need_id)?;
            match fields::get_field(tx, need_id, key)? {
                Some(existing) if existing.value == value && existing.field_type == field_type => {
                    return Ok(existing);
                }
                Some(existing) => {
                    fields::update_field_value(tx, existing.id, value, field_type)?;
                    log_field_change(tx, need_id, actor, key, Some(&existing.value), value, now)?;
                }
                None => {
                    fields::add_field(tx, need_id, key, value, field_type)?;
                    log_field_change(tx, need_id, actor, key, None, value, now)?;
                }
            }
            fields::get_field(tx, need_id, key)?.ok_or(ServerError::InternalError)
        })
    }

    /// Offers a resource for a need. Exactly one provider must be given.
    pub fn create_resource(
        &self,
        conn: &mut Connection,
        new: NewResource,
        actor: Option<&Actor>,
        now: i64,
    ) -> Result<Resource, ServerError> {
        let provider = new.provider()?;

        let resource = in_transaction(conn, |tx| {
            load_need(tx, new.need_id)?;
            match provider {
                Provider::User(id) => {
                    if users::get_actor(tx, id)?.is_none() {
                        return Err(ServerError::InvalidProviderAssignment(format!("unknown user {id}")));
                    }
                }
                Provider::Organization(id) => Target::organization(id).ensure_exists(tx)?,
            }

            let id = resources::insert_resource(tx, &new, provider, now)?;
            let initial = FieldChanges::new()
                .with("need_id", None::<i64>, new.need_id)
                .with("provider", None::<Provider>, provider)
                .with("status", None::<&str>, ResourceStatus::Offered);
            changelog::record(
                tx,
                ChangeAction::Created,
                Target::resource(id),
                actor.map(|a| a.user_id),
                &initial,
                &format!("offered for need #{}", new.need_id),
                now,
            )?;
            load_resource(tx, id)
        })?;

        tracing::info!(resource = resource.id, need = resource.need_id, "resource offered");
        Ok(resource)
    }

    pub fn change_resource_status(
        &self,
        conn: &mut Connection,
        resource_id: i64,
        actor: &Actor,
        next: ResourceStatus,
        now: i64,
    ) -> Result<Resource, ServerError> {
        self.ensure_can_change(actor, Target::resource(resource_id))?;

        in_transaction(conn, |tx| {
            let resource = load_resource(tx, resource_id)?;
            if !resource.status.can_transition_to(next) {
                return Err(ServerError::InvalidTransition {
                    entity: "resource",
                    from: resource.status.to_string(),
                    to: next.to_string(),
                });
            }

            resources::set_resource_status(tx, resource_id, next, now)?;
            changelog::record(
                tx,
                ChangeAction::StatusChanged,
                Target::resource(resource_id),
                Some(actor.user_id),
                &FieldChanges::new().with("status", resource.status, next),
                &format!("{} -> {}", resource.status, next),
                now,
            )?;
            load_resource(tx, resource_id)
        })
    }

    pub fn create_organization(
        &self,
        conn: &mut Connection,
        new: NewOrganization,
        now: i64,
    ) -> Result<Organization, ServerError> {
        if new.name.trim().is_empty() {
            return Err(ServerError::BadRequest("organization name is required".into()));
        }

        in_transaction(conn, |tx| {
            let id = organizations::insert_organization(tx, &new, now)?;
            let initial = FieldChanges::new()
                .with("name", None::<&str>, &new.name)
                .with("organization_type", None::<&str>, new.organization_type);
            changelog::record(
                tx,
                ChangeAction::Created,
                Target::organization(id),
                new.created_by,
                &initial,
                &format!("registered '{}'", new.name),
                now,
            )?;
            organizations::get_organization(tx, id)?.ok_or(ServerError::InternalError)
        })
    }

    /// Records a photo of a need and returns its id. The image file itself
    /// is stored outside the app; only its path is kept.
    pub fn add_photo(
        &self,
        conn: &mut Connection,
        need_id: i64,
        actor: &Actor,
        image_path: &str,
        caption: &str,
        now: i64,
    ) -> Result<i64, ServerError> {
        if image_path.trim().is_empty() {
            return Err(ServerError::BadRequest("image path is required".into()));
        }

        in_transaction(conn, |tx| {
            load_need(tx, need_id)?;
            let id = comments::insert_photo(tx, need_id, image_path, caption, Some(actor.user_id), now)?;
            changelog::record(
                tx,
                ChangeAction::Created,
                Target::new(TargetKind::Photo, id),
                Some(actor.user_id),
                &FieldChanges::new()
                    .with("need_id", None::<i64>, need_id)
                    .with("image_path", None::<&str>, image_path),
                "photo added",
                now,
            )?;
            Ok(id)
        })
    }

    /// Marks the problem of `need_id` as blocked by the problem of `blocked_by`.
    /// Both needs must carry problem details. Recording a known dependency
    /// again changes nothing and writes no entry.
    pub fn add_dependency(
        &self,
        conn: &mut Connection,
        need_id: i64,
        actor: &Actor,
        blocked_by: i64,
        now: i64,
    ) -> Result<Vec<(i64, String)>, ServerError> {
        self.ensure_can_change(actor, Target::need(need_id))?;

        in_transaction(conn, |tx| {
            let problem = problem_id_of(tx, need_id)?;
            let blocker = problem_id_of(tx, blocked_by)?;
            if details::add_problem_dependency(tx, problem, blocker)? {
                changelog::record(
                    tx,
                    ChangeAction::Updated,
                    Target::need(need_id),
                    Some(actor.user_id),
                    &FieldChanges::new().with("depends_on", None::<i64>, blocked_by),
                    &format!("blocked by need #{blocked_by}"),
                    now,
                )?;
            }
            details::blocking_needs(tx, need_id)
        })
    }

    /// Adds a comment to a need and returns its id.
    pub fn add_comment(
        &self,
        conn: &mut Connection,
        need_id: i64,
        actor: &Actor,
        text: &str,
        is_status_update: bool,
        now: i64,
    ) -> Result<i64, ServerError> {
        if text.trim().is_empty() {
            return Err(ServerError::BadRequest("comment text is required".into()));
        }

        in_transaction(conn, |tx| {
            load_need(tx, need_id)?;
            let id = comments::insert_comment(tx, need_id, Some(actor.user_id), text, is_status_update, now)?;
            changelog::record(
                tx,
                ChangeAction::Created,
                Target::new(TargetKind::Comment, id),
                Some(actor.user_id),
                &FieldChanges::new().with("need_id", None::<i64>, need_id),
                "comment added",
                now,
            )?;
            Ok(id)
        })
    }
}

fn log_field_change(
    conn: &Connection,
    need_id: i64,
    actor: &Actor,
    key: &str,
    old: Option<&str>,
    new: &str,
    now: i64,
) -> Result<i64, ServerError> {
    let changes = FieldChanges::new().with(&format!("field:{key}"), old, new);
    changelog::record(
        conn,
        ChangeAction::Updated,
        Target::need(need_id),
        Some(actor.user_id),
        &changes,
        &format!("set field '{key}'"),
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::Role;
    use crate::domain::need::{ProblemDetails, ProblemSeverity};
    use crate::tests::utils::{actor, memory_conn, seed_disaster, seed_need, seed_user};

    fn actions(conn: &Connection, need_id: i64) -> Vec<ChangeAction> {
        changelog::history(conn, Target::need(need_id))
            .unwrap()
            .iter()
            .map(|e| e.action)
            .collect()
    }

    #[test]
    fn create_need_logs_created() {
        let mut conn = memory_conn();
        let disaster = seed_disaster(&conn);
        let reporter = seed_user(&conn, "reporter");
        let mut new = NewNeed::new(disaster, "Bridge out", "Main bridge collapsed");
        new.reported_by = Some(reporter);

        let need = Workflow::default().create_need(&mut conn, new, 100).unwrap();
        assert_eq!(need.status, NeedStatus::Open);

        let log = changelog::history(&conn, Target::need(need.id)).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, ChangeAction::Created);
        assert_eq!(log[0].user_id, Some(reporter));
        assert_eq!(log[0].field_changes.get("title").unwrap().new, "Bridge out");
    }

    #[test]
    fn create_need_requires_existing_disaster() {
        let mut conn = memory_conn();
        let err = Workflow::default()
            .create_need(&mut conn, NewNeed::new(42, "x", "y"), 1)
            .unwrap_err();
        assert!(matches!(err, ServerError::TargetNotFound(t) if t.kind == TargetKind::Disaster));
    }

    #[test]
    fn resolve_then_reopen_clears_resolved_at() {
        let mut conn = memory_conn();
        let need_id = seed_need(&conn, "Emergency Shelter");
        let user = actor(&conn, "helper", Role::User);
        let wf = Workflow::default();

        wf.change_need_status(&mut conn, need_id, &user, NeedStatus::InProgress, 10).unwrap();
        let resolved = wf
            .change_need_status(&mut conn, need_id, &user, NeedStatus::Resolved, 20)
            .unwrap();
        assert_eq!(resolved.resolved_at, Some(20));

        let reopened = wf
            .change_need_status(&mut conn, need_id, &user, NeedStatus::Reopened, 30)
            .unwrap();
        assert_eq!(reopened.status, NeedStatus::Reopened);
        assert_eq!(reopened.resolved_at, None);

        assert_eq!(actions(&conn, need_id), vec![ChangeAction::StatusChanged; 3]);
        let last = changelog::history(&conn, Target::need(need_id)).unwrap().pop().unwrap();
        assert_eq!(last.field_changes.get("resolved_at").unwrap().old, 20);
        assert!(last.field_changes.get("resolved_at").unwrap().new.is_null());
    }

    #[test]
    fn illegal_status_jump_is_rejected_without_log() {
        let mut conn = memory_conn();
        let need_id = seed_need(&conn, "Water");
        let user = actor(&conn, "helper", Role::User);

        let err = Workflow::default()
            .change_need_status(&mut conn, need_id, &user, NeedStatus::Verified, 1)
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidTransition { entity: "need", .. }));
        assert!(actions(&conn, need_id).is_empty());
        assert_eq!(needs::get_need(&conn, need_id).unwrap().unwrap().status, NeedStatus::Open);
    }

    #[test]
    fn update_logs_only_changed_fields() {
        let mut conn = memory_conn();
        let need_id = seed_need(&conn, "Water");
        let user = actor(&conn, "editor", Role::User);
        let wf = Workflow::default();

        let update = NeedUpdate {
            title: Some("Water".to_string()),
            city: Some("Pokhara".to_string()),
            latitude: Some(Some(28.2)),
            ..Default::default()
        };
        let need = wf.update_need(&mut conn, need_id, &user, &update, 5).unwrap();
        assert_eq!(need.city, "Pokhara");

        let log = changelog::history(&conn, Target::need(need_id)).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].field_changes.len(), 2);
        assert!(log[0].field_changes.get("title").is_none());

        // same values again: nothing to record
        wf.update_need(&mut conn, need_id, &user, &update, 6).unwrap();
        assert_eq!(changelog::count_for_target(&conn, Target::need(need_id)).unwrap(), 1);
    }

    #[test]
    fn assignment_is_logged() {
        let mut conn = memory_conn();
        let need_id = seed_need(&conn, "Food");
        let lead = actor(&conn, "lead", Role::Staff);
        let volunteer = seed_user(&conn, "vol");
        let wf = Workflow::default();

        let need = wf.assign_need(&mut conn, need_id, &lead, Some(volunteer), 3).unwrap();
        assert_eq!(need.assigned_to, Some(volunteer));
        assert_eq!(actions(&conn, need_id), vec![ChangeAction::Assigned]);

        assert!(matches!(
            wf.assign_need(&mut conn, need_id, &lead, Some(9999), 4),
            Err(ServerError::BadRequest(_))
        ));
    }

    #[test]
    fn field_keys_are_unique_per_need() {
        let mut conn = memory_conn();
        let need_id = seed_need(&conn, "Shelter");
        let user = actor(&conn, "u", Role::User);
        let wf = Workflow::default();

        wf.add_field(&mut conn, need_id, &user, "beds", "40", FieldType::Number, 1).unwrap();
        let err = wf
            .add_field(&mut conn, need_id, &user, "beds", "50", FieldType::Number, 2)
            .unwrap_err();
        assert!(matches!(err, ServerError::FieldKeyConflict { ref key, .. } if key == "beds"));

        let field = wf.set_field(&mut conn, need_id, &user, "beds", "55", FieldType::Number, 3).unwrap();
        assert_eq!(field.value, "55");
        // unchanged value writes no entry
        wf.set_field(&mut conn, need_id, &user, "beds", "55", FieldType::Number, 4).unwrap();

        let log = changelog::history(&conn, Target::need(need_id)).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].field_changes.get("field:beds").unwrap().old, "40");
    }

    #[test]
    fn resource_needs_exactly_one_provider() {
        let mut conn = memory_conn();
        let need_id = seed_need(&conn, "Water");
        let provider = seed_user(&conn, "donor");
        let wf = Workflow::default();

        let mut both = NewResource {
            need_id,
            provider_user: Some(provider),
            provider_organization: Some(1),
            description: "Bottled water".to_string(),
            quantity: "200 litres".to_string(),
            availability_date: None,
            contact_info: String::new(),
        };
        assert!(matches!(
            wf.create_resource(&mut conn, both.clone(), None, 1),
            Err(ServerError::InvalidProviderAssignment(_))
        ));

        both.provider_user = None;
        both.provider_organization = None;
        assert!(matches!(
            wf.create_resource(&mut conn, both.clone(), None, 1),
            Err(ServerError::InvalidProviderAssignment(_))
        ));
        assert!(resources::list_resources_for_need(&conn, need_id).unwrap().is_empty());

        both.provider_user = Some(provider);
        let resource = wf.create_resource(&mut conn, both, None, 2).unwrap();
        assert_eq!(resource.provider, Some(Provider::User(provider)));
        assert_eq!(resource.status, ResourceStatus::Offered);
        assert_eq!(
            changelog::count_for_target(&conn, Target::resource(resource.id)).unwrap(),
            1
        );
    }

    #[test]
    fn resource_lifecycle_is_enforced() {
        let mut conn = memory_conn();
        let need_id = seed_need(&conn, "Water");
        let org = Workflow::default()
            .create_organization(
                &mut conn,
                NewOrganization::new("Water Aid", crate::domain::resource::OrganizationType::Ngo),
                1,
            )
            .unwrap();
        let user = actor(&conn, "u", Role::User);
        let wf = Workflow::default();

        let resource = wf
            .create_resource(
                &mut conn,
                NewResource {
                    need_id,
                    provider_user: None,
                    provider_organization: Some(org.id),
                    description: "Tanker".to_string(),
                    quantity: "1".to_string(),
                    availability_date: Some("2024-07-03".to_string()),
                    contact_info: String::new(),
                },
                Some(&user),
                2,
            )
            .unwrap();

        assert!(matches!(
            wf.change_resource_status(&mut conn, resource.id, &user, ResourceStatus::Delivered, 3),
            Err(ServerError::InvalidTransition { .. })
        ));
        wf.change_resource_status(&mut conn, resource.id, &user, ResourceStatus::Confirmed, 3).unwrap();
        let delivered = wf
            .change_resource_status(&mut conn, resource.id, &user, ResourceStatus::Delivered, 4)
            .unwrap();
        assert_eq!(delivered.status, ResourceStatus::Delivered);
    }

    #[test]
    fn comments_are_logged_on_the_comment() {
        let mut conn = memory_conn();
        let need_id = seed_need(&conn, "Water");
        let user = actor(&conn, "u", Role::User);
        let wf = Workflow::default();

        let id = wf.add_comment(&mut conn, need_id, &user, "Arrived on site", true, 1).unwrap();
        assert_eq!(comments::list_comments(&conn, need_id).unwrap().len(), 1);
        assert_eq!(
            changelog::count_for_target(&conn, Target::new(TargetKind::Comment, id)).unwrap(),
            1
        );
        assert!(matches!(
            wf.add_comment(&mut conn, need_id, &user, "  ", false, 2),
            Err(ServerError::BadRequest(_))
        ));
    }

    fn problem(severity: ProblemSeverity) -> NeedDetails {
        NeedDetails::Problem(ProblemDetails {
            id: 0,
            need_id: 0,
            severity,
            affected_population: Some(300),
            infrastructure_type: "road".to_string(),
            estimated_repair_cost: None,
            repair_time_estimate: String::new(),
            blocks_access_to: String::new(),
        })
    }

    #[test]
    fn unknown_category_is_a_bad_request() {
        let mut conn = memory_conn();
        let disaster = seed_disaster(&conn);
        let wf = Workflow::default();

        let mut new = NewNeed::new(disaster, "Road blocked", "Landslide");
        new.category_id = Some(404);
        assert!(matches!(
            wf.create_need(&mut conn, new, 1),
            Err(ServerError::BadRequest(_))
        ));

        let need_id = seed_need(&conn, "Water");
        let user = actor(&conn, "editor", Role::User);
        let update = NeedUpdate {
            category_id: Some(Some(404)),
            ..Default::default()
        };
        assert!(matches!(
            wf.update_need(&mut conn, need_id, &user, &update, 2),
            Err(ServerError::BadRequest(_))
        ));
        assert!(actions(&conn, need_id).is_empty());
    }

    #[test]
    fn problem_details_are_stored_with_the_need() {
        let mut conn = memory_conn();
        let disaster = seed_disaster(&conn);
        let mut new = NewNeed::new(disaster, "Road blocked", "Landslide at km 12");
        new.details = Some(problem(ProblemSeverity::Critical));

        let need = Workflow::default().create_need(&mut conn, new, 1).unwrap();

        let stored = details::get_problem(&conn, need.id).unwrap().unwrap();
        assert_eq!(stored.severity, ProblemSeverity::Critical);
        let log = changelog::history(&conn, Target::need(need.id)).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].field_changes.get("details").unwrap().new, "problem");
    }

    #[test]
    fn dependencies_link_problems_once() {
        let mut conn = memory_conn();
        let disaster = seed_disaster(&conn);
        let user = actor(&conn, "planner", Role::User);
        let wf = Workflow::default();

        let mut create = |title: &str, details: Option<NeedDetails>| {
            let mut new = NewNeed::new(disaster, title, "x");
            new.details = details;
            wf.create_need(&mut conn, new, 1).unwrap().id
        };
        let bridge = create("Bridge", Some(problem(ProblemSeverity::Major)));
        let road = create("Road", Some(problem(ProblemSeverity::Moderate)));
        let plain = create("Blankets", None);

        let blockers = wf.add_dependency(&mut conn, road, &user, bridge, 2).unwrap();
        assert_eq!(blockers, vec![(bridge, "Bridge".to_string())]);
        wf.add_dependency(&mut conn, road, &user, bridge, 3).unwrap();
        assert_eq!(actions(&conn, road), vec![ChangeAction::Created, ChangeAction::Updated]);

        assert!(matches!(
            wf.add_dependency(&mut conn, road, &user, plain, 4),
            Err(ServerError::BadRequest(_))
        ));
        assert!(matches!(
            wf.add_dependency(&mut conn, road, &user, road, 4),
            Err(ServerError::BadRequest(_))
        ));
    }

    #[test]
    fn photos_are_logged_on_the_photo() {
        let mut conn = memory_conn();
        let need_id = seed_need(&conn, "Collapsed school");
        let user = actor(&conn, "u", Role::User);
        let wf = Workflow::default();

        let id = wf
            .add_photo(&mut conn, need_id, &user, "uploads/school.jpg", "north wall", 1)
            .unwrap();
        let photos = comments::list_photos(&conn, need_id).unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].uploaded_by, Some(user.user_id));
        assert_eq!(
            changelog::count_for_target(&conn, Target::new(TargetKind::Photo, id)).unwrap(),
            1
        );
        assert!(matches!(
            wf.add_photo(&mut conn, need_id, &user, " ", "", 2),
            Err(ServerError::BadRequest(_))
        ));
    }
}
