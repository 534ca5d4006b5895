use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use astra::Response;
use rusqlite::{params, Connection};

use crate::auth::policy::{Actor, Role};
use crate::db::connection::{init_db, Database};
use crate::db::disasters::insert_disaster;
use crate::db::needs::insert_need;
use crate::db::users::create_user;
use crate::domain::disaster::NewDisaster;
use crate::domain::need::NewNeed;
use crate::domain::status::Severity;

static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// In-memory connection with the production schema applied.
pub fn memory_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(include_str!("../../sql/schema.sql"))
        .unwrap();
    conn
}

/// Fresh file-backed database, one per call, for tests that go through the router.
pub fn init_test_db() -> Database {
    let path = std::env::temp_dir().join(format!(
        "relief_test_{}_{}_{}.sqlite3",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::SeqCst),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let db = Database::new(path.to_string_lossy().into_owned());

    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    db
}

pub fn seed_user(conn: &Connection, username: &str) -> i64 {
    create_user(conn, username, &format!("{username}@example.com"), Role::User, 1).unwrap()
}

/// Creates a user with `role` and returns it as an acting user.
pub fn actor(conn: &Connection, username: &str, role: Role) -> Actor {
    let user_id =
        create_user(conn, username, &format!("{username}@example.com"), role, 1).unwrap();
    Actor {
        user_id,
        username: username.to_string(),
        role,
    }
}

pub fn seed_disaster(conn: &Connection) -> i64 {
    let n: i64 = conn
        .query_row("select count(*) from disasters", params![], |r| r.get(0))
        .unwrap();
    let disaster = NewDisaster {
        name: format!("Flood {}", n + 1),
        slug: format!("flood-{}", n + 1),
        description: "River burst its banks".to_string(),
        affected_areas: "Lowlands".to_string(),
        severity: Severity::High,
        start_date: "2024-07-01".to_string(),
        end_date: None,
        created_by: None,
    };
    insert_disaster(conn, &disaster, 1).unwrap()
}

/// Inserts an open Need under a new disaster.
pub fn seed_need(conn: &Connection, title: &str) -> i64 {
    let disaster_id = seed_disaster(conn);
    insert_need(conn, &NewNeed::new(disaster_id, title, "details"), 1).unwrap()
}

pub fn body_string(resp: Response) -> String {
    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    String::from_utf8(bytes).unwrap()
}
