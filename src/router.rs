use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

use astra::Request;
use rusqlite::Connection;

use crate::auth::policy::{Actor, TrustPolicy};
use crate::auth::sessions::{load_actor_from_session, revoke_session};
use crate::config::AppConfig;
use crate::db::connection::Database;
use crate::db::needs::{count_by_entry_type, get_need_summary, list_needs, NeedFilter};
use crate::db::resources::{get_resource_summary, list_resources, ResourceFilter};
use crate::db::{comments, details, disasters, fields, organizations, resources};
use crate::domain::map_feed::feature_collection;
use crate::domain::need::FieldType;
use crate::domain::resource::ProviderKind;
use crate::domain::status::{CategoryType, NeedStatus, ResourceStatus};
use crate::domain::target::{Target, TargetKind};
use crate::errors::ServerError;
use crate::forms::{self, Form};
use crate::responses::{html_response, json_response, redirect, redirect_clearing_cookie, ResultResp};
use crate::templates::components::target_path;
use crate::templates::pages;
use crate::workflow::moderation::{moderation_queue, trust_report};
use crate::workflow::Workflow;

const LIST_LIMIT: i64 = 50;
const HOME_RECENT: i64 = 4;

/// Everything a request handler needs; shared by all workers.
pub struct App {
    pub db: Database,
    pub workflow: Workflow,
    pub session_cookie: String,
    pub map_description_limit: usize,
}

impl App {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        Self {
            db,
            workflow: Workflow::default(),
            session_cookie: config.session_cookie.clone(),
            map_description_limit: config.map_description_limit,
        }
    }
}

pub fn handle(mut req: Request, app: &App) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    tracing::debug!(%method, %path, "request");

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => home(&req, app),
        ("GET", ["needs"]) => needs_list(&req, app),
        ("GET", ["needs", id]) => need_detail(&req, app, parse_id(id)?),
        ("GET", ["resources"]) => resources_list(&req, app),
        ("GET", ["resources", id]) => resource_detail(&req, app, parse_id(id)?),
        ("GET", ["organizations", id]) => organization_detail(&req, app, parse_id(id)?),
        ("GET", ["disasters"]) => disasters_list(&req, app),
        ("GET", ["disasters", slug]) => disaster_detail(&req, app, slug),
        ("GET", ["moderation"]) => moderation(&req, app),
        ("GET", ["api", "map-data"]) => map_data(&req, app),
        ("GET", ["api", "trust", kind, id]) => {
            let target = Target::new(parse_kind(kind)?, parse_id(id)?);
            let report = app.db.with_conn(|conn| trust_report(conn, target))?;
            json_response(&report)
        }

        ("POST", ["needs"]) => create_need(&mut req, app),
        ("POST", ["needs", id, action]) => need_action(&mut req, app, parse_id(id)?, action),
        ("POST", ["resources", id, "status"]) => resource_status(&mut req, app, parse_id(id)?),
        ("POST", ["organizations"]) => create_organization(&mut req, app),
        ("POST", ["disasters"]) => create_disaster(&mut req, app),
        ("POST", ["disasters", slug, "delete"]) => delete_disaster(&req, app, slug),
        ("POST", ["reports", id, "review"]) => review(&mut req, app, parse_id(id)?),
        ("POST", ["logout"]) => logout(&req, app),
        ("POST", [kind, id, action]) => {
            let target = Target::new(parse_kind(kind)?, parse_id(id)?);
            trust_action(&mut req, app, target, action)
        }

        _ => Err(ServerError::NotFound),
    }
}

// ---------- pages ----------

fn home(req: &Request, app: &App) -> ResultResp {
    let is_moderator = is_moderator(&current_actor(req, app)?, app);

    let vm = app.db.with_conn(|conn| {
        let conn: &Connection = conn;
        let recent = |entry_type| {
            list_needs(
                conn,
                &NeedFilter {
                    entry_type: Some(entry_type),
                    status: Some(NeedStatus::Open),
                    limit: Some(HOME_RECENT),
                    ..Default::default()
                },
            )
        };
        Ok(pages::HomeVm {
            open_problems: count_by_entry_type(conn, NeedStatus::Open, CategoryType::Problem)?,
            open_services: count_by_entry_type(conn, NeedStatus::Open, CategoryType::Service)?,
            recent_problems: recent(CategoryType::Problem)?,
            recent_services: recent(CategoryType::Service)?,
            active_disasters: disasters::list_disasters(conn, true)?,
            is_moderator,
        })
    })?;

    html_response(pages::home_page(&vm))
}

fn needs_list(req: &Request, app: &App) -> ResultResp {
    let query = query(req);
    let current_type = entry_type(&query)?;
    let current_category = query.optional("category")?;
    let current_disaster = query.optional("disaster")?;
    let is_moderator = is_moderator(&current_actor(req, app)?, app);

    let vm = app.db.with_conn(|conn| {
        let filter = NeedFilter {
            entry_type: current_type,
            category_id: current_category,
            disaster_id: current_disaster,
            status: Some(NeedStatus::Open),
            geolocated_only: false,
            limit: Some(LIST_LIMIT),
        };
        Ok(pages::NeedsVm {
            needs: list_needs(conn, &filter)?,
            categories: disasters::list_categories(conn, current_type)?,
            disasters: disasters::list_disasters(conn, true)?,
            current_type,
            current_category,
            current_disaster,
            is_moderator,
        })
    })?;

    html_response(pages::needs_page(&vm))
}

fn need_detail(req: &Request, app: &App, need_id: i64) -> ResultResp {
    let actor = current_actor(req, app)?;
    let is_moderator = is_moderator(&actor, app);

    let vm = app.db.with_conn(|conn| {
        let summary = get_need_summary(conn, need_id)?.ok_or(ServerError::NotFound)?;
        Ok(pages::NeedDetailVm {
            problem: details::get_problem(conn, need_id)?,
            service: details::get_service(conn, need_id)?,
            blockers: details::blocking_needs(conn, need_id)?,
            fields: fields::list_fields(conn, need_id)?,
            photos: comments::list_photos(conn, need_id)?,
            comments: comments::list_comments(conn, need_id)?,
            resources: resources::list_resources_for_need(conn, need_id)?,
            categories: disasters::list_categories(conn, None)?,
            trust: trust_report(conn, Target::need(need_id))?,
            summary,
            actor,
            is_moderator,
        })
    })?;

    html_response(pages::need_detail_page(&vm))
}

/// Open offers only; `type=individual|organization` filters by provider.
fn resources_list(req: &Request, app: &App) -> ResultResp {
    let query = query(req);
    let current_category = query.optional("category")?;
    let current_kind: Option<ProviderKind> = match query.get("type") {
        None | Some("all") => None,
        Some(_) => query.optional("type")?,
    };
    let search = query.text("q");
    let actor = current_actor(req, app)?;

    let vm = app.db.with_conn(|conn| {
        let filter = ResourceFilter {
            status: Some(ResourceStatus::Offered),
            category_id: current_category,
            provider_kind: current_kind,
            search: (!search.is_empty()).then(|| search.clone()),
            limit: Some(LIST_LIMIT),
        };
        Ok(pages::ResourcesVm {
            resources: list_resources(conn, &filter)?,
            categories: disasters::list_categories(conn, None)?,
            current_category,
            current_kind,
            search: search.clone(),
            signed_in: actor.is_some(),
            is_moderator: is_moderator(&actor, app),
        })
    })?;

    html_response(pages::resources_page(&vm))
}

fn resource_detail(req: &Request, app: &App, resource_id: i64) -> ResultResp {
    let actor = current_actor(req, app)?;

    let vm = app.db.with_conn(|conn| {
        let summary = get_resource_summary(conn, resource_id)?.ok_or(ServerError::NotFound)?;
        Ok(pages::ResourceDetailVm {
            trust: trust_report(conn, Target::resource(resource_id))?,
            summary,
            signed_in: actor.is_some(),
            is_moderator: is_moderator(&actor, app),
        })
    })?;

    html_response(pages::resource_detail_page(&vm))
}

fn organization_detail(req: &Request, app: &App, org_id: i64) -> ResultResp {
    let actor = current_actor(req, app)?;

    let (org, trust) = app.db.with_conn(|conn| {
        let org = organizations::get_organization(conn, org_id)?.ok_or(ServerError::NotFound)?;
        Ok((org, trust_report(conn, Target::organization(org_id))?))
    })?;

    html_response(pages::organization_page(
        &org,
        &trust,
        actor.is_some(),
        is_moderator(&actor, app),
    ))
}

fn disasters_list(req: &Request, app: &App) -> ResultResp {
    let is_moderator = is_moderator(&current_actor(req, app)?, app);
    let all = app.db.with_conn(|conn| disasters::list_disasters(conn, false))?;
    html_response(pages::disasters_page(&all, is_moderator))
}

fn disaster_detail(req: &Request, app: &App, slug: &str) -> ResultResp {
    let actor = current_actor(req, app)?;

    let vm = app.db.with_conn(|conn| {
        let conn: &Connection = conn;
        let disaster = disasters::get_disaster_by_slug(conn, slug)?.ok_or(ServerError::NotFound)?;
        let by_type = |entry_type| {
            list_needs(
                conn,
                &NeedFilter {
                    entry_type: Some(entry_type),
                    disaster_id: Some(disaster.id),
                    limit: Some(LIST_LIMIT),
                    ..Default::default()
                },
            )
        };
        Ok(pages::DisasterVm {
            problems: by_type(CategoryType::Problem)?,
            services: by_type(CategoryType::Service)?,
            categories: disasters::list_categories(conn, None)?,
            disaster,
            signed_in: actor.is_some(),
            is_moderator: is_moderator(&actor, app),
        })
    })?;

    html_response(pages::disaster_page(&vm))
}

fn moderation(req: &Request, app: &App) -> ResultResp {
    let actor = require_actor(req, app)?;
    if !app.workflow.policy().can_moderate(&actor) {
        return Err(ServerError::Forbidden("moderators only".into()));
    }
    let queue = app.db.with_conn(|conn| moderation_queue(conn))?;
    html_response(pages::moderation_page(&queue))
}

fn map_data(req: &Request, app: &App) -> ResultResp {
    let query = query(req);
    let filter = NeedFilter {
        entry_type: entry_type(&query)?,
        disaster_id: query.optional("disaster")?,
        geolocated_only: true,
        ..Default::default()
    };

    let needs = app.db.with_conn(|conn| list_needs(conn, &filter))?;
    json_response(&feature_collection(&needs, app.map_description_limit))
}

// ---------- actions ----------

fn create_need(req: &mut Request, app: &App) -> ResultResp {
    let actor = require_actor(req, app)?;
    let form = read_form(req)?;
    let new = forms::new_need(&form, actor.user_id)?;

    let need = app
        .db
        .with_conn(|conn| app.workflow.create_need(conn, new, now_unix()))?;
    redirect(&format!("/needs/{}", need.id))
}

/// Everything posted to `/needs/{id}/{action}`. Trust actions fall through
/// to the generic target handler.
fn need_action(req: &mut Request, app: &App, need_id: i64, action: &str) -> ResultResp {
    if matches!(action, "verify" | "report" | "clear-flags") {
        return trust_action(req, app, Target::need(need_id), action);
    }

    let actor = require_actor(req, app)?;
    let form = read_form(req)?;
    let wf = &app.workflow;
    let now = now_unix();

    match action {
        "status" => {
            let next: NeedStatus = form.required("status")?;
            app.db
                .with_conn(|conn| wf.change_need_status(conn, need_id, &actor, next, now))?;
        }
        "edit" => {
            let update = forms::need_update(&form)?;
            app.db
                .with_conn(|conn| wf.update_need(conn, need_id, &actor, &update, now))?;
        }
        "assign" => {
            let assignee = form.optional("assignee")?;
            app.db
                .with_conn(|conn| wf.assign_need(conn, need_id, &actor, assignee, now))?;
        }
        "fields" => {
            let key = form.text("key");
            if key.is_empty() {
                return Err(ServerError::BadRequest("missing 'key'".into()));
            }
            let value = form.text("value");
            let field_type = form.optional("field_type")?.unwrap_or(FieldType::Text);
            app.db.with_conn(|conn| {
                if form.flag("replace") {
                    wf.set_field(conn, need_id, &actor, &key, &value, field_type, now)
                } else {
                    wf.add_field(conn, need_id, &actor, &key, &value, field_type, now)
                }
            })?;
        }
        "comments" => {
            let text = form.text("text");
            let is_status_update = form.flag("is_status_update");
            app.db
                .with_conn(|conn| wf.add_comment(conn, need_id, &actor, &text, is_status_update, now))?;
        }
        "photos" => {
            let image_path = form.text("image_path");
            let caption = form.text("caption");
            app.db
                .with_conn(|conn| wf.add_photo(conn, need_id, &actor, &image_path, &caption, now))?;
        }
        "dependencies" => {
            let blocked_by = form.required("blocked_by")?;
            app.db
                .with_conn(|conn| wf.add_dependency(conn, need_id, &actor, blocked_by, now))?;
        }
        "resources" => {
            let new = forms::new_resource(&form, need_id, actor.user_id)?;
            let resource = app
                .db
                .with_conn(|conn| wf.create_resource(conn, new, Some(&actor), now))?;
            return redirect(&target_path(Target::resource(resource.id)));
        }
        _ => return Err(ServerError::NotFound),
    }

    redirect(&format!("/needs/{need_id}"))
}

fn resource_status(req: &mut Request, app: &App, resource_id: i64) -> ResultResp {
    let actor = require_actor(req, app)?;
    let next: ResourceStatus = read_form(req)?.required("status")?;

    app.db.with_conn(|conn| {
        app.workflow
            .change_resource_status(conn, resource_id, &actor, next, now_unix())
    })?;
    redirect(&target_path(Target::resource(resource_id)))
}

fn create_organization(req: &mut Request, app: &App) -> ResultResp {
    let actor = require_actor(req, app)?;
    let new = forms::new_organization(&read_form(req)?, actor.user_id)?;

    let org = app
        .db
        .with_conn(|conn| app.workflow.create_organization(conn, new, now_unix()))?;
    redirect(&target_path(Target::organization(org.id)))
}

fn create_disaster(req: &mut Request, app: &App) -> ResultResp {
    let actor = require_actor(req, app)?;
    let new = forms::new_disaster(&read_form(req)?)?;

    let disaster = app
        .db
        .with_conn(|conn| app.workflow.create_disaster(conn, new, &actor, now_unix()))?;
    redirect(&format!("/disasters/{}", disaster.slug))
}

fn delete_disaster(req: &Request, app: &App, slug: &str) -> ResultResp {
    let actor = require_actor(req, app)?;
    app.db
        .with_conn(|conn| app.workflow.delete_disaster(conn, slug, &actor, now_unix()))?;
    redirect("/disasters")
}

fn trust_action(req: &mut Request, app: &App, target: Target, action: &str) -> ResultResp {
    match action {
        "verify" => verify(req, app, target),
        "report" => file_report(req, app, target),
        "clear-flags" => clear_flags(req, app, target),
        _ => Err(ServerError::NotFound),
    }
}

fn verify(req: &mut Request, app: &App, target: Target) -> ResultResp {
    let actor = require_actor(req, app)?;
    let notes = read_form(req)?.text("notes");

    app.db
        .with_conn(|conn| app.workflow.verify(conn, target, &actor, &notes, now_unix()))?;
    redirect(&target_path(target))
}

/// Signed-in users report under their account; anyone else leaves an email.
fn file_report(req: &mut Request, app: &App, target: Target) -> ResultResp {
    let reporter = current_actor(req, app)?.map(|a| a.user_id);
    let report = forms::new_report(&read_form(req)?, target, reporter)?;

    app.db
        .with_conn(|conn| app.workflow.file_report(conn, report, now_unix()))?;
    redirect(&target_path(target))
}

fn clear_flags(req: &Request, app: &App, target: Target) -> ResultResp {
    let actor = require_actor(req, app)?;
    app.db
        .with_conn(|conn| app.workflow.clear_flags(conn, target, &actor, now_unix()))?;
    redirect(&target_path(target))
}

fn review(req: &mut Request, app: &App, report_id: i64) -> ResultResp {
    let actor = require_actor(req, app)?;
    let review = forms::report_review(&read_form(req)?)?;

    app.db.with_conn(|conn| {
        app.workflow
            .review_report(conn, report_id, &actor, review, now_unix())
    })?;
    redirect("/moderation")
}

fn logout(req: &Request, app: &App) -> ResultResp {
    if let Some(token) = session_token(req, &app.session_cookie) {
        app.db
            .with_conn(|conn: &mut Connection| revoke_session(conn, &token, now_unix()))?;
        tracing::info!("session revoked");
    }
    redirect_clearing_cookie("/", &app.session_cookie)
}

// ---------- helpers ----------

pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn parse_id(raw: &str) -> Result<i64, ServerError> {
    raw.parse().map_err(|_| ServerError::NotFound)
}

/// Accepts both `need` and `needs` path segments.
fn parse_kind(raw: &str) -> Result<TargetKind, ServerError> {
    raw.parse::<TargetKind>()
        .or_else(|_| raw.strip_suffix('s').unwrap_or(raw).parse::<TargetKind>())
        .map_err(|_| ServerError::NotFound)
}

/// `type=problem|service|information`; `all` or absent means no filter.
fn entry_type(query: &Form) -> Result<Option<CategoryType>, ServerError> {
    match query.get("type") {
        None | Some("all") => Ok(None),
        Some(_) => query.optional("type"),
    }
}

fn query(req: &Request) -> Form {
    Form::parse(req.uri().query().unwrap_or_default().as_bytes())
}

fn read_form(req: &mut Request) -> Result<Form, ServerError> {
    let mut body = Vec::new();
    req.body_mut()
        .reader()
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("unreadable body: {e}")))?;
    Ok(Form::parse(&body))
}

fn session_token(req: &Request, cookie_name: &str) -> Option<String> {
    req.headers()
        .get_all("Cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string())
}

fn current_actor(req: &Request, app: &App) -> Result<Option<Actor>, ServerError> {
    let Some(token) = session_token(req, &app.session_cookie) else {
        return Ok(None);
    };
    app.db
        .with_conn(|conn: &mut Connection| load_actor_from_session(conn, &token, now_unix()))
}

fn require_actor(req: &Request, app: &App) -> Result<Actor, ServerError> {
    current_actor(req, app)?.ok_or_else(|| ServerError::Unauthorized("sign in required".into()))
}

fn is_moderator(actor: &Option<Actor>, app: &App) -> bool {
    actor
        .as_ref()
        .is_some_and(|a| app.workflow.policy().can_moderate(a))
}
