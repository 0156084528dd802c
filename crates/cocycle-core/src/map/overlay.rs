use geojson::{feature::Id, Feature, Geometry, Value};

use crate::models::{Coordinate, Ride};

pub const ROUTE_LAYER_ID: &str = "route";
pub const START_MARKER_ID: &str = "start-marker";
pub const CAFE_MARKER_ID: &str = "cafe-marker";

pub const ROUTE_COLOR: &str = "#5B7FFF";
pub const ROUTE_WIDTH_PX: f64 = 4.0;
pub const START_MARKER_COLOR: &str = "#22C55E";
pub const CAFE_MARKER_COLOR: &str = "#FF8A5B";

/// Geometric inputs of a preview. Any change to these needs a fresh surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MapInputs {
    /// Route geometry in travel order
    pub coordinates: Vec<Coordinate>,
    pub start: Coordinate,
    pub has_cafe: bool,
    pub cafe: Option<Coordinate>,
}

impl MapInputs {
    pub fn from_ride(ride: &Ride) -> Self {
        let cafe = match (ride.cafe_lat, ride.cafe_lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };
        Self {
            coordinates: ride.route_coordinates().to_vec(),
            start: ride.start(),
            has_cafe: ride.has_cafe,
            cafe,
        }
    }

    /// Café location, only when flagged and known
    pub fn cafe_marker_position(&self) -> Option<Coordinate> {
        self.cafe.filter(|_| self.has_cafe)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Start,
    Cafe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: &'static str,
    pub kind: MarkerKind,
    pub position: Coordinate,
    pub color: &'static str,
    pub size_px: u16,
    pub glyph: Option<char>,
}

impl Marker {
    pub fn start(position: Coordinate) -> Self {
        Self {
            id: START_MARKER_ID,
            kind: MarkerKind::Start,
            position,
            color: START_MARKER_COLOR,
            size_px: 24,
            glyph: None,
        }
    }

    pub fn cafe(position: Coordinate) -> Self {
        Self {
            id: CAFE_MARKER_ID,
            kind: MarkerKind::Cafe,
            position,
            color: CAFE_MARKER_COLOR,
            size_px: 28,
            glyph: Some('☕'),
        }
    }
}

/// Path line through the route coordinates, in order
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLine {
    pub id: &'static str,
    pub coordinates: Vec<Coordinate>,
    pub color: &'static str,
    pub width_px: f64,
}

impl RouteLine {
    pub fn new(coordinates: Vec<Coordinate>) -> Self {
        Self {
            id: ROUTE_LAYER_ID,
            coordinates,
            color: ROUTE_COLOR,
            width_px: ROUTE_WIDTH_PX,
        }
    }

    /// GeoJSON `LineString` feature with `[lng, lat]` positions, the source
    /// format map providers expect for a line layer
    pub fn to_feature(&self) -> Feature {
        let positions = self
            .coordinates
            .iter()
            .map(|c| c.lng_lat().to_vec())
            .collect();
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(positions))),
            id: Some(Id::String(self.id.to_string())),
            properties: Some(serde_json::Map::new()),
            foreign_members: None,
        }
    }
}

/// Everything drawn on top of the base map
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub route: Option<RouteLine>,
    pub markers: Vec<Marker>,
}

impl Overlay {
    /// Overlay ids in draw order
    pub fn ids(&self) -> Vec<&'static str> {
        self.route
            .iter()
            .map(|r| r.id)
            .chain(self.markers.iter().map(|m| m.id))
            .collect()
    }
}

/// Start marker always; café marker when flagged and located; route line
/// when there is geometry. Same inputs, same overlay.
pub fn compose_overlay(inputs: &MapInputs) -> Overlay {
    let route = (!inputs.coordinates.is_empty()).then(|| RouteLine::new(inputs.coordinates.clone()));

    let mut markers = vec![Marker::start(inputs.start)];
    if let Some(cafe) = inputs.cafe_marker_position() {
        markers.push(Marker::cafe(cafe));
    }

    Overlay { route, markers }
}
