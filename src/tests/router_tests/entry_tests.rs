use super::{get, make_app, post_form, rejected, signed_in};
use crate::auth::policy::Role;
use crate::db::disasters::{get_disaster_by_slug, insert_category};
use crate::db::needs::get_need;
use crate::db::organizations::insert_organization;
use crate::db::{comments, fields, resources};
use crate::domain::resource::{NewOrganization, OrganizationType};
use crate::domain::status::{CategoryType, ResourceStatus};
use crate::errors::ServerError;
use crate::router::{handle, App};
use crate::tests::utils::{body_string, seed_disaster, seed_need};
use astra::Response;

fn location(resp: &Response) -> String {
    assert_eq!(resp.status(), 302);
    resp.headers().get("Location").unwrap().to_str().unwrap().to_string()
}

fn need(app: &App, title: &str) -> i64 {
    app.db.with_conn(|conn| Ok(seed_need(conn, title))).unwrap()
}

/// Offers a resource as `cookie`'s user and returns its id.
fn offer(app: &App, need_id: i64, cookie: &str, description: &str) -> i64 {
    let resp = handle(
        post_form(
            &format!("/needs/{need_id}/resources"),
            Some(cookie),
            &format!("description={description}&quantity=20&as_self=on"),
        ),
        app,
    )
    .unwrap();
    location(&resp)
        .trim_start_matches("/resources/")
        .parse()
        .unwrap()
}

#[test]
fn reporting_a_need_with_problem_details() {
    let app = make_app();
    let (disaster, roads) = app
        .db
        .with_conn(|conn| {
            let d = seed_disaster(conn);
            Ok((d, insert_category(conn, "Roads", CategoryType::Problem, "")?))
        })
        .unwrap();
    let (_, cookie) = signed_in(&app, "reporter", Role::User);

    let form = format!(
        "disaster={disaster}&category={roads}&title=Bridge+down&description=River+crossing+gone\
         &details=problem&severity=critical&affected_population=300"
    );
    assert!(matches!(
        handle(post_form("/needs", None, &form), &app),
        Err(ServerError::Unauthorized(_))
    ));

    let path = location(&handle(post_form("/needs", Some(&cookie), &form), &app).unwrap());
    let body = body_string(handle(get(&path, Some(&cookie)), &app).unwrap());
    assert!(body.contains("Bridge down"));
    assert!(body.contains("Affected people"));
    assert!(body.contains("critical"));

    let unknown = format!("disaster={disaster}&category=9999&title=Bridge+down");
    let err = rejected(handle(post_form("/needs", Some(&cookie), &unknown), &app));
    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn editing_and_assigning_a_need() {
    let app = make_app();
    let id = need(&app, "Roof repair");
    let (helper_id, cookie) = signed_in(&app, "helper", Role::User);

    let resp = handle(
        post_form(&format!("/needs/{id}/edit"), Some(&cookie), "city=Pokhara&priority=urgent"),
        &app,
    )
    .unwrap();
    assert_eq!(location(&resp), format!("/needs/{id}"));

    handle(
        post_form(&format!("/needs/{id}/assign"), Some(&cookie), &format!("assignee={helper_id}")),
        &app,
    )
    .unwrap();

    let stored = app.db.with_conn(|conn| get_need(conn, id)).unwrap().unwrap();
    assert_eq!(stored.city, "Pokhara");
    assert_eq!(stored.assigned_to, Some(helper_id));

    let err = rejected(handle(
        post_form(&format!("/needs/{id}/edit"), Some(&cookie), "category=4242"),
        &app,
    ));
    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn fields_comments_and_photos_attach_to_the_need() {
    let app = make_app();
    let id = need(&app, "Field clinic");
    let (_, cookie) = signed_in(&app, "nurse", Role::User);
    let fields_uri = format!("/needs/{id}/fields");

    handle(post_form(&fields_uri, Some(&cookie), "key=beds&value=12&field_type=number"), &app).unwrap();
    let err = rejected(handle(post_form(&fields_uri, Some(&cookie), "key=beds&value=14"), &app));
    assert_eq!(err.status_code(), 409);
    handle(post_form(&fields_uri, Some(&cookie), "key=beds&value=14&field_type=number&replace=on"), &app)
        .unwrap();

    handle(
        post_form(&format!("/needs/{id}/comments"), Some(&cookie), "text=Opened+at+dawn&is_status_update=on"),
        &app,
    )
    .unwrap();
    handle(
        post_form(&format!("/needs/{id}/photos"), Some(&cookie), "image_path=clinic%2Ftent.jpg&caption=Main+tent"),
        &app,
    )
    .unwrap();

    let (beds, notes, photos) = app
        .db
        .with_conn(|conn| {
            Ok((
                fields::get_field(conn, id, "beds")?,
                comments::list_comments(conn, id)?,
                comments::list_photos(conn, id)?,
            ))
        })
        .unwrap();
    assert_eq!(beds.unwrap().value, "14");
    assert!(notes[0].is_status_update);
    assert_eq!(photos[0].caption, "Main tent");

    let body = body_string(handle(get(&format!("/needs/{id}"), None), &app).unwrap());
    assert!(body.contains("Opened at dawn"));
    assert!(body.contains("/media/clinic/tent.jpg"));
}

#[test]
fn resource_offers_need_exactly_one_provider() {
    let app = make_app();
    let id = need(&app, "Drinking water");
    let (_, cookie) = signed_in(&app, "donor", Role::User);
    let org = app
        .db
        .with_conn(|conn| insert_organization(conn, &NewOrganization::new("Aqua Aid", OrganizationType::Ngo), 1))
        .unwrap();
    let uri = format!("/needs/{id}/resources");

    let both = rejected(handle(
        post_form(&uri, Some(&cookie), &format!("description=Tanker&as_self=on&organization={org}")),
        &app,
    ));
    assert!(matches!(both, ServerError::InvalidProviderAssignment(_)));
    assert_eq!(both.status_code(), 400);

    let neither = rejected(handle(post_form(&uri, Some(&cookie), "description=Tanker"), &app));
    assert!(matches!(neither, ServerError::InvalidProviderAssignment(_)));

    let resp = handle(
        post_form(&uri, Some(&cookie), &format!("description=Tanker&organization={org}")),
        &app,
    )
    .unwrap();
    assert!(location(&resp).starts_with("/resources/"));
}

#[test]
fn resource_status_and_verification_return_to_the_resource() {
    let app = make_app();
    let id = need(&app, "Blankets");
    let (_, donor) = signed_in(&app, "donor", Role::User);
    let (_, moderator) = signed_in(&app, "mod", Role::Moderator);
    let resource = offer(&app, id, &donor, "Wool+blankets");
    let page = format!("/resources/{resource}");

    let resp = handle(post_form(&format!("{page}/verify"), Some(&moderator), "notes=seen"), &app).unwrap();
    assert_eq!(location(&resp), page);

    let resp = handle(post_form(&format!("{page}/status"), Some(&donor), "status=confirmed"), &app).unwrap();
    assert_eq!(location(&resp), page);
    let err = rejected(handle(post_form(&format!("{page}/status"), Some(&donor), "status=offered"), &app));
    assert!(matches!(err, ServerError::InvalidTransition { .. }));

    let stored = app.db.with_conn(|conn| resources::get_resource(conn, resource)).unwrap().unwrap();
    assert_eq!(stored.status, ResourceStatus::Confirmed);
    assert!(stored.is_verified);

    let body = body_string(handle(get(&page, None), &app).unwrap());
    assert!(body.contains("Wool blankets"));
    assert!(body.contains("History"));
    assert!(body.contains("donor"));
}

#[test]
fn resource_listing_shows_open_offers_only() {
    let app = make_app();
    let id = need(&app, "Winter clothes");
    let (_, donor) = signed_in(&app, "donor", Role::User);
    offer(&app, id, &donor, "Jackets");
    let gloves = offer(&app, id, &donor, "Gloves");
    handle(post_form(&format!("/resources/{gloves}/status"), Some(&donor), "status=cancelled"), &app).unwrap();

    let body = body_string(handle(get("/resources", None), &app).unwrap());
    assert!(body.contains("Jackets"));
    assert!(!body.contains("Gloves"));

    let orgs_only = body_string(handle(get("/resources?type=organization", None), &app).unwrap());
    assert!(!orgs_only.contains("Jackets"));
    let people = body_string(handle(get("/resources?type=individual&q=jack", None), &app).unwrap());
    assert!(people.contains("Jackets"));

    assert!(matches!(
        handle(get("/resources?type=robot", None), &app),
        Err(ServerError::BadRequest(_))
    ));
    assert!(matches!(handle(get("/resources/999", None), &app), Err(ServerError::NotFound)));
}

#[test]
fn organizations_register_and_have_a_page() {
    let app = make_app();
    let (_, cookie) = signed_in(&app, "founder", Role::User);

    let resp = handle(
        post_form("/organizations", Some(&cookie), "name=Hill+Rescue&organization_type=charity&phone=555"),
        &app,
    )
    .unwrap();
    let page = location(&resp);
    assert!(page.starts_with("/organizations/"));

    let body = body_string(handle(get(&page, None), &app).unwrap());
    assert!(body.contains("Hill Rescue"));
    assert!(body.contains("charity"));

    assert!(matches!(
        handle(post_form("/organizations", Some(&cookie), "name=Nameless"), &app),
        Err(ServerError::BadRequest(_))
    ));
}

#[test]
fn moderators_declare_and_delete_disasters() {
    let app = make_app();
    let (_, user) = signed_in(&app, "resident", Role::User);
    let (_, moderator) = signed_in(&app, "coordinator", Role::Moderator);
    let form = "name=Monsoon+Floods&slug=monsoon-2024&severity=high&start_date=2024-07-01";

    assert!(matches!(
        handle(post_form("/disasters", Some(&user), form), &app),
        Err(ServerError::Forbidden(_))
    ));

    let resp = handle(post_form("/disasters", Some(&moderator), form), &app).unwrap();
    assert_eq!(location(&resp), "/disasters/monsoon-2024");

    let listing = body_string(handle(get("/disasters", None), &app).unwrap());
    assert!(listing.contains("Monsoon Floods"));
    assert!(!listing.contains("Declare a disaster"));

    assert!(matches!(
        handle(post_form("/disasters/monsoon-2024/delete", Some(&user), ""), &app),
        Err(ServerError::Forbidden(_))
    ));
    let resp = handle(post_form("/disasters/monsoon-2024/delete", Some(&moderator), ""), &app).unwrap();
    assert_eq!(location(&resp), "/disasters");

    let gone = app.db.with_conn(|conn| get_disaster_by_slug(conn, "monsoon-2024")).unwrap();
    assert!(gone.is_none());
}

#[test]
fn signed_out_visitors_report_with_an_email() {
    let app = make_app();
    let id = need(&app, "Fake appeal");
    let uri = format!("/needs/{id}/report");

    let err = rejected(handle(post_form(&uri, None, "report_type=misleading&description=asks+for+cash"), &app));
    assert!(matches!(err, ServerError::BadRequest(_)));

    let resp = handle(
        post_form(&uri, None, "report_type=misleading&description=asks+for+cash&reporter_email=me%40example.org"),
        &app,
    )
    .unwrap();
    assert_eq!(location(&resp), format!("/needs/{id}"));
}

#[test]
fn logout_revokes_the_session() {
    let app = make_app();
    let (_, cookie) = signed_in(&app, "leaving", Role::User);
    let id = need(&app, "Sandbags");

    let resp = handle(post_form("/logout", Some(&cookie), ""), &app).unwrap();
    assert_eq!(location(&resp), "/");
    assert!(resp
        .headers()
        .get("Set-Cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    assert!(matches!(
        handle(post_form(&format!("/needs/{id}/comments"), Some(&cookie), "text=still+here"), &app),
        Err(ServerError::Unauthorized(_))
    ));
}
