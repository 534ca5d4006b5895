use super::{get, make_app, post_form, rejected, signed_in};
use crate::auth::policy::Role;
use crate::db::reports::list_open_reports;
use crate::db::trust::load_trust_state;
use crate::domain::target::Target;
use crate::errors::ServerError;
use crate::router::{handle, App};
use crate::tests::utils::{body_string, seed_need};
use serde_json::Value;

fn need(app: &App, title: &str) -> i64 {
    app.db.with_conn(|conn| Ok(seed_need(conn, title))).unwrap()
}

fn trust_json(app: &App, uri: &str) -> Value {
    let resp = handle(get(uri, None), app).expect("Handler failed");
    assert_eq!(resp.status(), 200);
    serde_json::from_str(&body_string(resp)).unwrap()
}

#[test]
fn verify_needs_a_trusted_session() {
    let app = make_app();
    let id = need(&app, "Water pump");
    let uri = format!("/needs/{id}/verify");

    assert!(matches!(
        handle(post_form(&uri, None, "notes=x"), &app),
        Err(ServerError::Unauthorized(_))
    ));

    let (_, user) = signed_in(&app, "user", Role::User);
    assert!(matches!(
        handle(post_form(&uri, Some(&user), "notes=x"), &app),
        Err(ServerError::Forbidden(_))
    ));

    let (moderator_id, moderator) = signed_in(&app, "mod", Role::Moderator);
    let resp = handle(post_form(&uri, Some(&moderator), "notes=called+the+site"), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers().get("Location").unwrap().to_str().unwrap(), format!("/needs/{id}"));

    let json = trust_json(&app, &format!("/api/trust/need/{id}"));
    assert_eq!(json["state"]["is_verified"], true);
    assert_eq!(json["state"]["verified_by"], moderator_id);
    assert_eq!(json["state"]["verification_notes"], "called the site");
    assert_eq!(json["history"][0]["action"], "status_changed");
}

#[test]
fn duplicate_report_is_a_conflict() {
    let app = make_app();
    let id = need(&app, "Food parcels");
    let (_, alice) = signed_in(&app, "alice", Role::User);
    let uri = format!("/needs/{id}/report");

    let resp = handle(post_form(&uri, Some(&alice), "report_type=spam&description=advert"), &app).unwrap();
    assert_eq!(resp.status(), 302);

    let err = rejected(handle(post_form(&uri, Some(&alice), "report_type=false&description=again"), &app));
    assert!(matches!(err, ServerError::DuplicateReport { .. }));
    assert_eq!(err.status_code(), 409);

    let state = app.db.with_conn(|conn| load_trust_state(conn, Target::need(id))).unwrap();
    assert_eq!(state.flag_count, Some(1));
    assert_eq!(state.is_flagged, Some(true));
}

#[test]
fn malformed_report_forms_are_bad_requests() {
    let app = make_app();
    let id = need(&app, "Food parcels");
    let (_, alice) = signed_in(&app, "alice", Role::User);
    let uri = format!("/needs/{id}/report");

    assert!(matches!(
        handle(post_form(&uri, Some(&alice), "report_type=rude&description=x"), &app),
        Err(ServerError::BadRequest(_))
    ));
    assert!(matches!(
        handle(post_form(&uri, Some(&alice), "description=x"), &app),
        Err(ServerError::BadRequest(_))
    ));
}

#[test]
fn flag_then_dismiss_then_clear() {
    let app = make_app();
    let id = need(&app, "Emergency Shelter");
    let report_uri = format!("/needs/{id}/report");

    for name in ["ana", "ben"] {
        let (_, cookie) = signed_in(&app, name, Role::User);
        let form = "report_type=misleading&description=not+a+shelter";
        assert_eq!(handle(post_form(&report_uri, Some(&cookie), form), &app).unwrap().status(), 302);
    }
    let json = trust_json(&app, &format!("/api/trust/needs/{id}"));
    assert_eq!(json["state"]["flag_count"], 2);
    assert_eq!(json["open_reports"], 2);

    let (_, moderator) = signed_in(&app, "mod", Role::Moderator);
    let queue = app.db.with_conn(|conn| list_open_reports(conn)).unwrap();
    let first = queue[0].id;

    let resp = handle(
        post_form(
            &format!("/reports/{first}/review"),
            Some(&moderator),
            "status=dismissed&review_notes=checked",
        ),
        &app,
    )
    .unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers().get("Location").unwrap().to_str().unwrap(), "/moderation");

    let json = trust_json(&app, &format!("/api/trust/need/{id}"));
    assert_eq!(json["state"]["flag_count"], 2, "dismissal keeps the counter");
    assert_eq!(json["open_reports"], 1);

    let resp = handle(post_form(&format!("/needs/{id}/clear-flags"), Some(&moderator), ""), &app).unwrap();
    assert_eq!(resp.status(), 302);

    let json = trust_json(&app, &format!("/api/trust/need/{id}"));
    assert_eq!(json["state"]["flag_count"], 0);
    assert_eq!(json["state"]["is_flagged"], false);

    let history = json["history"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    let timestamps: Vec<i64> = history.iter().map(|e| e["timestamp"].as_i64().unwrap()).collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn moderation_queue_is_for_moderators() {
    let app = make_app();
    let id = need(&app, "Generator");
    let (_, user) = signed_in(&app, "user", Role::User);
    handle(
        post_form(&format!("/needs/{id}/report"), Some(&user), "report_type=outdated&description=already+delivered"),
        &app,
    )
    .unwrap();

    assert!(matches!(handle(get("/moderation", None), &app), Err(ServerError::Unauthorized(_))));
    assert!(matches!(handle(get("/moderation", Some(&user)), &app), Err(ServerError::Forbidden(_))));

    let (_, staff) = signed_in(&app, "staff", Role::Staff);
    let resp = handle(get("/moderation", Some(&staff)), &app).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("already delivered"));
}

#[test]
fn status_form_walks_the_lifecycle() {
    let app = make_app();
    let id = need(&app, "Roof repair");
    let (_, user) = signed_in(&app, "user", Role::User);
    let uri = format!("/needs/{id}/status");

    assert_eq!(handle(post_form(&uri, Some(&user), "status=in_progress"), &app).unwrap().status(), 302);

    let err = rejected(handle(post_form(&uri, Some(&user), "status=verified"), &app));
    assert!(matches!(err, ServerError::InvalidTransition { .. }));

    assert_eq!(handle(post_form(&uri, Some(&user), "status=resolved"), &app).unwrap().status(), 302);
    let json = trust_json(&app, &format!("/api/trust/need/{id}"));
    assert_eq!(json["history"].as_array().unwrap().len(), 2);
}

#[test]
fn trust_api_rejects_unknown_kinds_and_ids() {
    let app = make_app();
    assert!(matches!(handle(get("/api/trust/planet/1", None), &app), Err(ServerError::NotFound)));
    assert!(matches!(
        handle(get("/api/trust/need/41", None), &app),
        Err(ServerError::TargetNotFound(_))
    ));
}
