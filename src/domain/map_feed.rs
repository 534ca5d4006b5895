// src/domain/map_feed.rs

use chrono::DateTime;
use serde::Serialize;

use crate::domain::need::NeedSummary;
use crate::domain::status::{NeedStatus, Priority};

/// GeoJSON FeatureCollection of geolocated needs.
#[derive(Debug, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: Point,
    pub properties: FeatureProperties,
}

#[derive(Debug, Serialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// GeoJSON order: [longitude, latitude].
    pub coordinates: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct FeatureProperties {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub category_type: String,
    pub disaster: String,
    pub location: String,
    pub city: String,
    pub status: NeedStatus,
    pub priority: Priority,
    pub is_verified: bool,
    pub contact_person: String,
    pub contact_phone: String,
    pub created_at: String,
    pub url: String,
}

/// Cuts `text` to at most `limit` characters, appending "..." when cut.
pub fn truncate_description(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

fn rfc3339(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Projects needs into map features. Needs without both coordinates are skipped.
pub fn feature_collection(needs: &[NeedSummary], description_limit: usize) -> FeatureCollection {
    let features = needs
        .iter()
        .filter_map(|s| {
            let (lat, lng) = s.need.coordinates()?;
            let need = &s.need;
            Some(Feature {
                kind: "Feature",
                geometry: Point {
                    kind: "Point",
                    coordinates: [lng, lat],
                },
                properties: FeatureProperties {
                    id: need.id,
                    title: need.title.clone(),
                    description: truncate_description(&need.description, description_limit),
                    category: s.category_name.clone().unwrap_or_else(|| "Unknown".to_string()),
                    category_type: s
                        .category_type
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                    disaster: s.disaster_name.clone(),
                    location: need.location.clone(),
                    city: need.city.clone(),
                    status: need.status,
                    priority: need.priority,
                    is_verified: need.is_verified,
                    contact_person: need.contact_person.clone(),
                    contact_phone: need.contact_phone.clone(),
                    created_at: rfc3339(need.created_at),
                    url: format!("/needs/{}/", need.id),
                },
            })
        })
        .collect();

    FeatureCollection {
        kind: "FeatureCollection",
        features,
    }
}
