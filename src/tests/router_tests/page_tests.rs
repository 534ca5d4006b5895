use super::{get, make_app, signed_in};
use crate::auth::policy::Role;
use crate::db::disasters::insert_category;
use crate::db::needs::insert_need;
use crate::domain::need::NewNeed;
use crate::domain::status::CategoryType;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, seed_disaster};

/// One open problem and one open service under a fresh disaster.
fn seed_board(app: &crate::router::App) -> (i64, i64) {
    app.db
        .with_conn(|conn| {
            let disaster = seed_disaster(conn);
            let roads = insert_category(conn, "Roads", CategoryType::Problem, "")?;
            let shelter = insert_category(conn, "Shelter", CategoryType::Service, "")?;

            let mut problem = NewNeed::new(disaster, "Bridge washed out", "No crossing on the river road");
            problem.category_id = Some(roads);
            let mut service = NewNeed::new(disaster, "School gym shelter", "Forty beds available");
            service.category_id = Some(shelter);

            Ok((insert_need(conn, &problem, 10)?, insert_need(conn, &service, 20)?))
        })
        .unwrap()
}

#[test]
fn home_shows_counts_and_recent_entries() {
    let app = make_app();
    seed_board(&app);

    let resp = handle(get("/", None), &app).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Bridge washed out"));
    assert!(body.contains("School gym shelter"));
    assert!(body.contains("Flood 1"), "active disaster is listed");
}

#[test]
fn needs_list_filters_by_entry_type() {
    let app = make_app();
    seed_board(&app);

    let resp = handle(get("/needs?type=service", None), &app).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("School gym shelter"));
    assert!(!body.contains("Bridge washed out"));

    let all = body_string(handle(get("/needs?type=all", None), &app).unwrap());
    assert!(all.contains("Bridge washed out") && all.contains("School gym shelter"));

    assert!(matches!(
        handle(get("/needs?type=weather", None), &app),
        Err(ServerError::BadRequest(_))
    ));
}

#[test]
fn need_detail_renders_and_hides_actions_for_anonymous() {
    let app = make_app();
    let (problem, _) = seed_board(&app);

    let body = body_string(handle(get(&format!("/needs/{problem}"), None), &app).unwrap());
    assert!(body.contains("No crossing on the river road"));
    assert!(!body.contains("Change status"));

    let (_, cookie) = signed_in(&app, "helper", Role::User);
    let body = body_string(handle(get(&format!("/needs/{problem}"), Some(&cookie)), &app).unwrap());
    assert!(body.contains("Change status"));
    assert!(!body.contains("Verify"), "plain users cannot verify");
}

#[test]
fn disaster_page_splits_problems_and_services() {
    let app = make_app();
    seed_board(&app);

    let resp = handle(get("/disasters/flood-1", None), &app).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("Problems") && body.contains("Services"));
    assert!(body.contains("Bridge washed out"));

    assert!(matches!(
        handle(get("/disasters/nowhere", None), &app),
        Err(ServerError::NotFound)
    ));
}

#[test]
fn unknown_routes_and_ids_are_not_found() {
    let app = make_app();
    assert!(matches!(handle(get("/nope", None), &app), Err(ServerError::NotFound)));
    assert!(matches!(handle(get("/needs/abc", None), &app), Err(ServerError::NotFound)));
    assert!(matches!(handle(get("/needs/999", None), &app), Err(ServerError::NotFound)));
}
