//! Route map preview.
//!
//! Turns a ride's geometry into a framed viewport and a deterministic set of
//! overlays, and manages the rendering surface they are drawn on:
//!
//! - `bounds`: bounding box over the route, or a fixed box around the start
//! - `overlay`: start marker, optional café marker, route line
//! - `surface`: the `MapSurface` / `SurfaceFactory` seam and the guard that
//!   guarantees a surface is released
//! - `preview`: `MapPreview`, which mounts, re-renders and tears down
//!
//! The preview never fails to produce a viewport, and renders nothing (an
//! inert surface) when no map access token is configured.

pub mod bounds;
pub mod overlay;
pub mod preview;
pub mod surface;

pub use bounds::{route_bounds, Bounds, Viewport};
pub use overlay::{compose_overlay, MapInputs, Marker, MarkerKind, Overlay, RouteLine};
pub use preview::{MapPreview, RenderOutcome};
pub use surface::{MapError, MapSurface, SurfaceFactory, SurfaceGuard};
