use super::{get, make_app};
use crate::db::disasters::insert_category;
use crate::db::needs::insert_need;
use crate::domain::need::NewNeed;
use crate::domain::status::CategoryType;
use crate::router::handle;
use crate::tests::utils::{body_string, seed_disaster};
use serde_json::Value;

#[test]
fn map_feed_is_geojson_of_located_needs() {
    let app = make_app();
    let long_text = "x".repeat(250);

    let disaster = app
        .db
        .with_conn(|conn| {
            let disaster = seed_disaster(conn);
            let other = seed_disaster(conn);
            let roads = insert_category(conn, "Roads", CategoryType::Problem, "")?;

            let mut located = NewNeed::new(disaster, "Landslide", &long_text);
            located.category_id = Some(roads);
            located.latitude = Some(27.7);
            located.longitude = Some(85.3);
            insert_need(conn, &located, 1_700_000_000)?;

            insert_need(conn, &NewNeed::new(disaster, "Somewhere", "no coordinates"), 2)?;

            let mut elsewhere = NewNeed::new(other, "Other flood", "short");
            elsewhere.latitude = Some(1.0);
            elsewhere.longitude = Some(2.0);
            insert_need(conn, &elsewhere, 3)?;
            Ok(disaster)
        })
        .unwrap();

    let resp = handle(get(&format!("/api/map-data?disaster={disaster}"), None), &app).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("Content-Type").unwrap(), "application/json");

    let json: Value = serde_json::from_str(&body_string(resp)).unwrap();
    assert_eq!(json["type"], "FeatureCollection");
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);

    let feature = &features[0];
    assert_eq!(feature["geometry"]["coordinates"][0], 85.3);
    assert_eq!(feature["geometry"]["coordinates"][1], 27.7);
    let props = &feature["properties"];
    assert_eq!(props["title"], "Landslide");
    assert_eq!(props["category_type"], "problem");
    assert_eq!(props["description"].as_str().unwrap().chars().count(), 203);
    assert!(props["created_at"].as_str().unwrap().starts_with("2023-11-14T22:13:20"));
    assert!(props["url"].as_str().unwrap().starts_with("/needs/"));

    let services = handle(get("/api/map-data?type=service", None), &app).unwrap();
    let json: Value = serde_json::from_str(&body_string(services)).unwrap();
    assert!(json["features"].as_array().unwrap().is_empty());

    let everything = handle(get("/api/map-data", None), &app).unwrap();
    let json: Value = serde_json::from_str(&body_string(everything)).unwrap();
    assert_eq!(json["features"].as_array().unwrap().len(), 2);
}
