mod entry_tests;
mod map_tests;
mod page_tests;
mod trust_tests;

use crate::auth::policy::Role;
use crate::auth::sessions;
use crate::config::AppConfig;
use crate::db::users::create_user;
use crate::router::App;
use crate::tests::utils::{init_test_db, now_unix};
use astra::Body;
use http::{Method, Request};

pub(super) fn make_app() -> App {
    App::new(init_test_db(), &AppConfig::default())
}

/// Creates a user with `role` and a live session; returns (user_id, cookie header).
pub(super) fn signed_in(app: &App, username: &str, role: Role) -> (i64, String) {
    let now = now_unix();
    app.db
        .with_conn(|conn| {
            let user_id = create_user(conn, username, &format!("{username}@example.com"), role, now)?;
            let token = sessions::create_session(conn, user_id, now)?;
            Ok((user_id, format!("session={token}")))
        })
        .expect("Failed to sign in")
}

pub(super) fn get(uri: &str, cookie: Option<&str>) -> astra::Request {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header("Cookie", c);
    }
    builder.body(Body::empty()).unwrap()
}

pub(super) fn post_form(uri: &str, cookie: Option<&str>, form: &str) -> astra::Request {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        builder = builder.header("Cookie", c);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// The error from a handler call that was expected to fail.
pub(super) fn rejected(result: crate::errors::ResultResp) -> crate::errors::ServerError {
    match result {
        Ok(resp) => panic!("expected an error, got status {}", resp.status()),
        Err(e) => e,
    }
}
