use geo::{BoundingRect, LineString};

use crate::models::Coordinate;

/// Half-size of the box framed around the start when there is no route, in degrees
pub const FALLBACK_DELTA_DEG: f64 = 0.02;

/// Margin kept clear around the framed bounds, in pixels
pub const VIEWPORT_PADDING_PX: u16 = 50;

/// Latitude/longitude rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Fixed-size box centred on `center`
    pub fn around(center: Coordinate, delta: f64) -> Self {
        Self {
            south: center.latitude - delta,
            west: center.longitude - delta,
            north: center.latitude + delta,
            east: center.longitude + delta,
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Longitude span in degrees
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Widen any zero-span axis to `delta` either side of its centre
    fn with_min_span(self, delta: f64) -> Self {
        let center = self.center();
        let (south, north) = if self.height() > 0.0 {
            (self.south, self.north)
        } else {
            (center.latitude - delta, center.latitude + delta)
        };
        let (west, east) = if self.width() > 0.0 {
            (self.west, self.east)
        } else {
            (center.longitude - delta, center.longitude + delta)
        };
        Self {
            south,
            west,
            north,
            east,
        }
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        (self.south..=self.north).contains(&c.latitude) && (self.west..=self.east).contains(&c.longitude)
    }
}

impl From<geo::Rect<f64>> for Bounds {
    fn from(rect: geo::Rect<f64>) -> Self {
        Self {
            south: rect.min().y,
            west: rect.min().x,
            north: rect.max().y,
            east: rect.max().x,
        }
    }
}

/// Minimal box enclosing every route coordinate, or the fallback box around
/// `start` when the route is empty. Always produces bounds with area: an axis
/// the route does not span gets the fallback half-size around its centre.
pub fn route_bounds(coordinates: &[Coordinate], start: Coordinate) -> Bounds {
    let line: LineString<f64> = coordinates.iter().map(|&c| geo::Coord::from(c)).collect();
    line.bounding_rect()
        .map(|rect| Bounds::from(rect).with_min_span(FALLBACK_DELTA_DEG))
        .unwrap_or_else(|| Bounds::around(start, FALLBACK_DELTA_DEG))
}

/// Bounds plus the pixel margin to keep around them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub bounds: Bounds,
    pub padding_px: u16,
}

impl Viewport {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            padding_px: VIEWPORT_PADDING_PX,
        }
    }

    /// Bounds widened so the padding margin maps to `padding_px` on a
    /// `width_px` × `height_px` surface. Surfaces that cannot fit bounds
    /// themselves draw in this space.
    ///
    /// A surface too small for its padding gets the bare bounds.
    pub fn padded_bounds(&self, width_px: u16, height_px: u16) -> Bounds {
        let pad = f64::from(self.padding_px);
        let inner_w = f64::from(width_px) - 2.0 * pad;
        let inner_h = f64::from(height_px) - 2.0 * pad;
        if inner_w <= 0.0 || inner_h <= 0.0 {
            return self.bounds;
        }

        let dx = self.bounds.width() * pad / inner_w;
        let dy = self.bounds.height() * pad / inner_h;
        Bounds {
            south: self.bounds.south - dy,
            west: self.bounds.west - dx,
            north: self.bounds.north + dy,
            east: self.bounds.east + dx,
        }
    }
}
