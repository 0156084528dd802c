use thiserror::Error;

use super::{Marker, RouteLine, Viewport};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Could not acquire map surface: {0}")]
    Acquire(String),

    #[error("Could not add overlay '{id}': {reason}")]
    Overlay { id: String, reason: String },
}

/// A live map drawing surface. Implementations own whatever native or
/// terminal resources back the map.
pub trait MapSurface {
    fn add_route(&mut self, route: &RouteLine) -> Result<(), MapError>;

    fn add_marker(&mut self, marker: &Marker) -> Result<(), MapError>;

    /// Free the surface's resources. Called exactly once per acquired surface.
    fn release(&mut self);
}

/// Produces surfaces framed on a viewport.
pub trait SurfaceFactory {
    type Surface: MapSurface;

    fn acquire(&mut self, viewport: &Viewport, access_token: &str) -> Result<Self::Surface, MapError>;
}

/// Owns an acquired surface and releases it on every exit path.
pub struct SurfaceGuard<S: MapSurface> {
    surface: Option<S>,
}

impl<S: MapSurface> SurfaceGuard<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface: Some(surface),
        }
    }

    pub fn get(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn is_released(&self) -> bool {
        self.surface.is_none()
    }

    /// Release now rather than at drop. Idempotent.
    pub fn release(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
    }
}

impl<S: MapSurface> Drop for SurfaceGuard<S> {
    fn drop(&mut self) {
        self.release();
    }
}
