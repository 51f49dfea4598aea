//! The owned simulation context driven once per displayed frame.
//!
//! A frame runs three stages in order:
//! 1. [`ForceResolver::resolve`] - pick the input point and derive the wind.
//! 2. [`integrator::integrate`] - move every strand under wind and gravity.
//! 3. [`Compositor::paint`] - paint the trail and list the draw commands.
//!
//! The host only has to draw the returned [`RenderFrame`]. While paused it
//! can call [`HairSim::present`] to redraw the current field without
//! advancing it.

use crate::{
    compositor::{Compositor, RenderCommand},
    config::HairConfig,
    error::{HairError, HairResult},
    field::StrandField,
    integrator,
    noise_source::NoiseSource,
    raster::Layer,
    wind::{ForceResolver, InputFrame, InputSource, Wind},
};
use glam::Vec2;
use tracing::debug;

/// Output of one simulation frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    /// Frame number, starting at 1.
    pub frame: u64,
    pub wind: Wind,
    pub commands: Vec<RenderCommand>,
}

/// Strand field, force resolver, compositor and noise source for one viewport.
pub struct HairSim<N: NoiseSource> {
    cfg: HairConfig,
    field: StrandField,
    resolver: ForceResolver,
    compositor: Compositor,
    noise: N,
    frame: u64,
    last_wind: Option<Wind>,
}

impl<N: NoiseSource> HairSim<N> {
    /// Builds a simulation for a viewport of the given size.
    pub fn new(viewport: Vec2, cfg: HairConfig, noise: N) -> HairResult<Self> {
        cfg.validate()?;
        let field = StrandField::new(viewport, &cfg.field)?;
        let compositor = Compositor::new(field.diameter(), cfg.compositor);
        Ok(Self {
            resolver: ForceResolver::new(cfg.wind),
            field,
            compositor,
            noise,
            cfg,
            frame: 0,
            last_wind: None,
        })
    }

    /// Tears down and rebuilds the field and trail for a new viewport.
    ///
    /// On error nothing changes.
    pub fn resize(&mut self, viewport: Vec2) -> HairResult<()> {
        self.field.resize(viewport)?;
        self.compositor
            .resize(self.field.diameter(), self.compositor.pixel_scale());
        self.resolver.reset();
        self.last_wind = None;
        debug!(
            width = viewport.x,
            height = viewport.y,
            diameter = self.field.diameter(),
            "rebuilt simulation"
        );
        Ok(())
    }

    /// Rebuilds the trail at `scale` device pixels per logical unit.
    ///
    /// The field is unchanged. Setting the current scale again is a no-op.
    pub fn set_pixel_scale(&mut self, scale: f32) -> HairResult<()> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(HairError::InvalidPixelScale(scale));
        }
        if scale != self.compositor.pixel_scale() {
            self.compositor.resize(self.field.diameter(), scale);
            debug!(scale, "rebuilt trail for new pixel scale");
        }
        Ok(())
    }

    pub fn pixel_scale(&self) -> f32 {
        self.compositor.pixel_scale()
    }

    /// Advances the simulation by one displayed frame.
    pub fn step(&mut self, input: &InputFrame) -> RenderFrame {
        let wind = self.resolver.resolve(&self.field, input, &self.noise);
        integrator::integrate(&mut self.field, wind.vector, &self.cfg.integrator);
        let commands = self.compositor.paint(&self.field, &wind);

        self.frame += 1;
        self.last_wind = Some(wind);
        RenderFrame {
            frame: self.frame,
            wind,
            commands,
        }
    }

    /// Paints the current field without resolving input or integrating.
    ///
    /// Uses the last resolved wind, or a calm wind at the screen center
    /// after a rebuild. The frame counter does not advance.
    pub fn present(&mut self) -> RenderFrame {
        let wind = self.last_wind.unwrap_or(Wind {
            origin: self.field.screen_center(),
            vector: Vec2::ZERO,
            speed: 0.0,
            source: InputSource::Idle,
        });
        let commands = self.compositor.paint(&self.field, &wind);
        RenderFrame {
            frame: self.frame,
            wind,
            commands,
        }
    }

    /// Draws `frame` onto `target` in software, standing in for a host surface.
    pub fn render_into(&self, frame: &RenderFrame, target: &mut Layer) {
        self.compositor.render_into(&frame.commands, target);
    }

    pub fn field(&self) -> &StrandField {
        &self.field
    }

    pub fn config(&self) -> &HairConfig {
        &self.cfg
    }

    /// The trail raster, at [`HairSim::pixel_scale`] pixels per unit.
    pub fn trail(&self) -> &Layer {
        self.compositor.trail()
    }

    /// Number of frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_wind(&self) -> Option<&Wind> {
        self.last_wind.as_ref()
    }
}
