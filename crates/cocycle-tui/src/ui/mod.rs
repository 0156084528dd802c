//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout and the ride detail panel
//! - `map_canvas`: the route map surface and its canvas rendering
//! - `input`: keyboard event handling
//! - `styles`: colors and text styling

pub mod input;
pub mod map_canvas;
pub mod render;
pub mod styles;
