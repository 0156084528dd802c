use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_default;

/// A single point of path geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `[lng, lat]` position order used by GeoJSON and most map providers
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::coord! { x: c.longitude, y: c.latitude }
    }
}

/// A named path owned by its creator. Several rides may share one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Route {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub creator_id: String,
    #[serde(default)]
    pub creator_name: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Length in meters
    #[serde(default, deserialize_with = "null_default")]
    pub distance: f64,
    /// Total climb in meters
    #[serde(default, deserialize_with = "null_default")]
    pub elevation_gain: f64,
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    /// Encoded polyline as stored by the service
    #[serde(default, deserialize_with = "null_default")]
    pub geometry: String,
    /// Decoded path, in travel order. Absent or null is treated as empty.
    #[serde(default, deserialize_with = "null_default")]
    pub coordinates: Vec<Coordinate>,
    #[serde(default)]
    pub static_map_url: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub use_count: u32,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub created_at: Option<DateTime<Utc>>,
}

impl Route {
    pub fn start(&self) -> Coordinate {
        Coordinate::new(self.start_lat, self.start_lng)
    }

    pub fn end(&self) -> Coordinate {
        Coordinate::new(self.end_lat, self.end_lng)
    }

    pub fn has_geometry(&self) -> bool {
        !self.coordinates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_missing_coordinates_is_empty() {
        let json = r#"{"id":"r1","creatorId":"u1","name":"Beach Road","distance":42000,
            "elevationGain":120,"startLat":-37.8,"startLng":144.9,"endLat":-38.1,
            "endLng":145.1,"geometry":"abc","useCount":3,"createdAt":"2025-01-01T00:00:00Z"}"#;
        let route: Route = serde_json::from_str(json).expect("route should parse");
        assert!(route.coordinates.is_empty());
        assert!(!route.has_geometry());
        assert_eq!(route.end(), Coordinate::new(-38.1, 145.1));
    }

    #[test]
    fn test_route_preserves_coordinate_order() {
        let json = r#"{"id":"r1","name":"Loop","startLat":1,"startLng":2,"endLat":3,"endLng":4,
            "coordinates":[{"latitude":1,"longitude":2},{"latitude":5,"longitude":6},
            {"latitude":3,"longitude":4}]}"#;
        let route: Route = serde_json::from_str(json).expect("route should parse");
        let lats: Vec<f64> = route.coordinates.iter().map(|c| c.latitude).collect();
        assert_eq!(lats, vec![1.0, 5.0, 3.0]);
    }
}
