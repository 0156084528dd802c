use tracing::{debug, error};

use super::{
    compose_overlay, route_bounds, MapError, MapInputs, MapSurface, Overlay, SurfaceFactory,
    SurfaceGuard, Viewport,
};

/// What a call to [`MapPreview::render`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No access token; nothing is drawn and no surface is acquired
    Inert,
    /// Inputs match the mounted surface
    Unchanged,
    /// A fresh surface was acquired and populated
    Mounted,
}

struct Mounted<S: MapSurface> {
    inputs: MapInputs,
    viewport: Viewport,
    overlay: Overlay,
    surface: SurfaceGuard<S>,
}

/// Route map preview bound to one surface at a time.
///
/// Re-rendering with different geometry tears down the old surface before
/// acquiring the next. Dropping the preview releases whatever is mounted.
pub struct MapPreview<F: SurfaceFactory> {
    factory: F,
    access_token: Option<String>,
    mounted: Option<Mounted<F::Surface>>,
}

impl<F: SurfaceFactory> MapPreview<F> {
    /// A blank token counts as missing.
    pub fn new(factory: F, access_token: Option<String>) -> Self {
        let access_token = access_token.filter(|t| !t.trim().is_empty());
        if access_token.is_none() {
            debug!("No map access token, route preview disabled");
        }
        Self {
            factory,
            access_token,
            mounted: None,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.access_token.is_none()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn render(&mut self, inputs: &MapInputs) -> Result<RenderOutcome, MapError> {
        let Some(token) = self.access_token.clone() else {
            return Ok(RenderOutcome::Inert);
        };

        if self.mounted.as_ref().is_some_and(|m| &m.inputs == inputs) {
            return Ok(RenderOutcome::Unchanged);
        }

        self.unmount();

        let viewport = Viewport::new(route_bounds(&inputs.coordinates, inputs.start));
        let overlay = compose_overlay(inputs);

        let mut surface = SurfaceGuard::new(self.factory.acquire(&viewport, &token)?);
        if let Err(e) = populate(&mut surface, &overlay) {
            error!(error = %e, "Map overlay failed");
            // guard drop releases the half-drawn surface
            return Err(e);
        }

        debug!("Mounted map preview with overlays {:?}", overlay.ids());
        self.mounted = Some(Mounted {
            inputs: inputs.clone(),
            viewport,
            overlay,
            surface,
        });
        Ok(RenderOutcome::Mounted)
    }

    /// Release the mounted surface, if any
    pub fn unmount(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.surface.release();
        }
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.mounted.as_ref().map(|m| &m.viewport)
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.mounted.as_ref().map(|m| &m.overlay)
    }

    pub fn surface(&self) -> Option<&F::Surface> {
        self.mounted.as_ref().and_then(|m| m.surface.get())
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}

fn populate<S: MapSurface>(surface: &mut SurfaceGuard<S>, overlay: &Overlay) -> Result<(), MapError> {
    let Some(surface) = surface.get_mut() else {
        return Ok(());
    };
    if let Some(route) = &overlay.route {
        surface.add_route(route)?;
    }
    for marker in &overlay.markers {
        surface.add_marker(marker)?;
    }
    Ok(())
}
