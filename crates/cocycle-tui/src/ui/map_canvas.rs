//! Route map drawn on a ratatui canvas.
//!
//! `CanvasFactory` hands out `CanvasSurface`s that record the overlays added
//! to them; `render_map` draws whatever surface the preview has mounted.

use ratatui::{
    layout::Rect,
    style::Color,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};
use tracing::debug;

use cocycle_core::map::{
    Bounds, MapError, MapPreview, MapSurface, Marker, MarkerKind, RouteLine, SurfaceFactory,
    Viewport,
};

use super::styles;

/// Approximate size of one terminal cell, used to turn viewport padding
/// (pixels) into map degrees
const CELL_WIDTH_PX: u16 = 8;
const CELL_HEIGHT_PX: u16 = 16;

#[derive(Debug, Default)]
pub struct CanvasSurface {
    viewport: Option<Viewport>,
    routes: Vec<RouteLine>,
    markers: Vec<Marker>,
}

impl CanvasSurface {
    fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            ..Self::default()
        }
    }

    pub fn is_live(&self) -> bool {
        self.viewport.is_some()
    }
}

impl MapSurface for CanvasSurface {
    fn add_route(&mut self, route: &RouteLine) -> Result<(), MapError> {
        if route.coordinates.len() < 2 {
            debug!(id = route.id, "Single point route, drawing as a dot");
        }
        self.routes.push(route.clone());
        Ok(())
    }

    fn add_marker(&mut self, marker: &Marker) -> Result<(), MapError> {
        self.markers.push(marker.clone());
        Ok(())
    }

    fn release(&mut self) {
        self.viewport = None;
        self.routes.clear();
        self.markers.clear();
    }
}

/// Acquires canvas surfaces. The terminal needs no provider session, so the
/// token is only checked for presence by the preview.
#[derive(Debug, Default)]
pub struct CanvasFactory {
    acquired: usize,
}

impl CanvasFactory {
    pub fn acquired(&self) -> usize {
        self.acquired
    }
}

impl SurfaceFactory for CanvasFactory {
    type Surface = CanvasSurface;

    fn acquire(&mut self, viewport: &Viewport, _access_token: &str) -> Result<CanvasSurface, MapError> {
        let b = viewport.bounds;
        if ![b.south, b.west, b.north, b.east].iter().all(|v| v.is_finite()) {
            return Err(MapError::Acquire(format!("viewport out of range: {:?}", b)));
        }
        self.acquired += 1;
        Ok(CanvasSurface::new(*viewport))
    }
}

/// Canvas bounds for a surface drawn into `area`, padding included
fn canvas_bounds(viewport: &Viewport, area: Rect) -> Bounds {
    viewport.padded_bounds(
        area.width.saturating_mul(CELL_WIDTH_PX),
        area.height.saturating_mul(CELL_HEIGHT_PX),
    )
}

fn marker_glyph(marker: &Marker) -> String {
    match (marker.kind, marker.glyph) {
        (_, Some(glyph)) => glyph.to_string(),
        (MarkerKind::Start, None) => "●".to_string(),
        (MarkerKind::Cafe, None) => "◆".to_string(),
    }
}

pub fn render_map(frame: &mut Frame, preview: &MapPreview<CanvasFactory>, area: Rect) {
    let block = Block::default()
        .title(" Route ")
        .borders(Borders::ALL)
        .border_style(styles::border_style());

    let Some(surface) = preview.surface().filter(|s| s.is_live()) else {
        let message = if preview.is_inert() {
            "Map preview unavailable (set MAPBOX_TOKEN)"
        } else {
            "No map"
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(message, styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };
    let Some(viewport) = surface.viewport else {
        return;
    };

    let inner = block.inner(area);
    let bounds = canvas_bounds(&viewport, inner);

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(|ctx| {
            for route in &surface.routes {
                let color = styles::hex_color(route.color);
                if let [only] = route.coordinates.as_slice() {
                    ctx.draw(&Points {
                        coords: &[(only.longitude, only.latitude)],
                        color,
                    });
                }
                for pair in route.coordinates.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].longitude,
                        y1: pair[0].latitude,
                        x2: pair[1].longitude,
                        y2: pair[1].latitude,
                        color,
                    });
                }
            }
            ctx.layer();
            for marker in &surface.markers {
                let color = styles::hex_color(marker.color);
                ctx.print(
                    marker.position.longitude,
                    marker.position.latitude,
                    Span::styled(marker_glyph(marker), ratatui::style::Style::default().fg(color)),
                );
            }
        })
        .background_color(Color::Reset);

    frame.render_widget(canvas, area);
}
