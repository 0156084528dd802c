use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_default;

use super::route::{Coordinate, Route};

/// Kind of ride as labelled by its host.
///
/// The service owns the value set; anything outside the four known kinds is
/// kept verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RideType {
    Social,
    Training,
    Chill,
    Fast,
    Other(String),
}

impl RideType {
    pub fn as_str(&self) -> &str {
        match self {
            RideType::Social => "Social",
            RideType::Training => "Training",
            RideType::Chill => "Chill",
            RideType::Fast => "Fast",
            RideType::Other(s) => s,
        }
    }
}

impl From<String> for RideType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Social" => RideType::Social,
            "Training" => RideType::Training,
            "Chill" => RideType::Chill,
            "Fast" => RideType::Fast,
            _ => RideType::Other(s),
        }
    }
}

impl From<RideType> for String {
    fn from(t: RideType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for RideType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a ride
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RideStatus {
    #[default]
    Upcoming,
    Active,
    Completed,
    Cancelled,
    Other(String),
}

impl RideStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RideStatus::Upcoming => "upcoming",
            RideStatus::Active => "active",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
            RideStatus::Other(s) => s,
        }
    }
}

impl From<String> for RideStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "upcoming" => RideStatus::Upcoming,
            "active" => RideStatus::Active,
            "completed" => RideStatus::Completed,
            "cancelled" | "canceled" => RideStatus::Cancelled,
            _ => RideStatus::Other(s),
        }
    }
}

impl From<RideStatus> for String {
    fn from(s: RideStatus) -> Self {
        s.as_str().to_string()
    }
}

/// A planned group ride, as returned by `GET /api/rides/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Ride {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub creator_id: String,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub creator_avatar: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub ride_type: RideType,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub start_time: DateTime<Utc>,
    /// Slowest advertised pace, km/h
    pub pace_min: f64,
    /// Fastest advertised pace, km/h
    pub pace_max: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub max_participants: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub current_participants: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub invite_only: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub women_only: bool,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub route: Option<Route>,
    /// Length in meters
    #[serde(default, deserialize_with = "null_default")]
    pub distance: f64,
    pub start_lat: f64,
    pub start_lng: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub has_cafe: bool,
    #[serde(default)]
    pub cafe_lat: Option<f64>,
    #[serde(default)]
    pub cafe_lng: Option<f64>,
    #[serde(default)]
    pub cafe_name: Option<String>,
    #[serde(default)]
    pub community_id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub status: RideStatus,
    #[serde(default)]
    pub is_joined: Option<bool>,
    #[serde(default)]
    pub is_creator: Option<bool>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub created_at: Option<DateTime<Utc>>,
}

impl Ride {
    pub fn start(&self) -> Coordinate {
        Coordinate::new(self.start_lat, self.start_lng)
    }

    /// Café stop location, only when the ride has one and both coordinates are known
    pub fn cafe(&self) -> Option<Coordinate> {
        if !self.has_cafe {
            return None;
        }
        match (self.cafe_lat, self.cafe_lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }

    /// Route geometry in travel order, empty when the ride has no embedded route
    pub fn route_coordinates(&self) -> &[Coordinate] {
        self.route
            .as_ref()
            .map(|r| r.coordinates.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_full(&self) -> bool {
        self.current_participants >= self.max_participants
    }

    pub fn spots_left(&self) -> u32 {
        self.max_participants.saturating_sub(self.current_participants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIDE_JSON: &str = r#"{
        "id": "ride-1",
        "creatorId": "user-1",
        "creatorName": "Sam",
        "title": "Saturday Bayside",
        "rideType": "Social",
        "startTime": "2025-03-15T07:30:00Z",
        "paceMin": 25,
        "paceMax": 30,
        "maxParticipants": 12,
        "currentParticipants": 4,
        "inviteOnly": false,
        "womenOnly": true,
        "routeId": "route-1",
        "distance": 42000,
        "startLat": -37.8,
        "startLng": 144.9,
        "hasCafe": true,
        "cafeLat": -37.9,
        "cafeLng": 145.0,
        "status": "upcoming",
        "createdAt": "2025-03-01T00:00:00Z",
        "somethingNew": {"nested": true}
    }"#;

    #[test]
    fn test_parse_ride_ignores_unknown_fields() {
        let ride: Ride = serde_json::from_str(RIDE_JSON).expect("ride should parse");
        assert_eq!(ride.title, "Saturday Bayside");
        assert_eq!(ride.ride_type, RideType::Social);
        assert_eq!(ride.status, RideStatus::Upcoming);
        assert!(ride.women_only);
        assert!(ride.description.is_none());
        assert!(ride.route.is_none());
        assert!(ride.route_coordinates().is_empty());
        assert_eq!(ride.spots_left(), 8);
    }

    #[test]
    fn test_unknown_ride_type_is_preserved() {
        let t: RideType = serde_json::from_str(r#""Gravel""#).expect("type should parse");
        assert_eq!(t, RideType::Other("Gravel".to_string()));
        assert_eq!(serde_json::to_string(&t).expect("serialize"), r#""Gravel""#);
    }

    #[test]
    fn test_cafe_requires_flag_and_both_coordinates() {
        let mut ride: Ride = serde_json::from_str(RIDE_JSON).expect("ride should parse");
        assert_eq!(ride.cafe(), Some(Coordinate::new(-37.9, 145.0)));

        ride.cafe_lng = None;
        assert_eq!(ride.cafe(), None);

        ride.cafe_lng = Some(145.0);
        ride.has_cafe = false;
        assert_eq!(ride.cafe(), None);
    }

    #[test]
    fn test_spots_left_saturates_when_overbooked() {
        let mut ride: Ride = serde_json::from_str(RIDE_JSON).expect("ride should parse");
        ride.current_participants = 15;
        assert_eq!(ride.spots_left(), 0);
        assert!(ride.is_full());
    }

    #[test]
    fn test_explicit_nulls_read_as_absent() {
        let json = r#"{
            "id": "ride-2",
            "creatorId": null,
            "creatorName": null,
            "title": "Dawn Patrol",
            "rideType": "Training",
            "startTime": "2025-03-15T05:30:00Z",
            "paceMin": 30,
            "paceMax": 34,
            "maxParticipants": null,
            "currentParticipants": null,
            "inviteOnly": null,
            "womenOnly": null,
            "distance": null,
            "startLat": -37.8,
            "startLng": 144.9,
            "hasCafe": null,
            "status": null,
            "route": {
                "id": "route-2",
                "creatorId": null,
                "name": "Beach Road",
                "distance": null,
                "elevationGain": null,
                "startLat": -37.8,
                "startLng": 144.9,
                "endLat": -37.9,
                "endLng": 145.0,
                "geometry": null,
                "coordinates": null,
                "useCount": null
            }
        }"#;
        let ride: Ride = serde_json::from_str(json).expect("nulls should parse");
        assert_eq!(ride.creator_id, "");
        assert_eq!(ride.max_participants, 0);
        assert!(!ride.has_cafe);
        assert_eq!(ride.status, RideStatus::Upcoming);
        assert_eq!(ride.distance, 0.0);
        let route = ride.route.as_ref().expect("route present");
        assert_eq!(route.name, "Beach Road");
        assert!(route.geometry.is_empty());
        assert!(ride.route_coordinates().is_empty());
    }
}
