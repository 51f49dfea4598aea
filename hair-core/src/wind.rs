//! Force resolver: turns pointer, touch or idle input into one wind vector.
//!
//! The wind always pulls towards the field center. Its magnitude grows with
//! the input point's distance from the center and with pointer speed, and
//! is clamped into the configured range. The wind is defined on every
//! frame; there is no dead zone.

use crate::{
    config::WindConfig,
    field::StrandField,
    geometry::{Vec2Ext, constrain, lerp, map_range},
    noise_source::NoiseSource,
};
use glam::Vec2;
use std::f32::consts::TAU;

const RADIUS_CHANNEL: u32 = 1;
const ANGLE_CHANNEL: u32 = 2;

/// Host input sampled once per frame. All positions are in screen coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Active touch contacts, oldest first.
    pub touches: Vec<Vec2>,
    /// Last known pointer position, even when it has left the canvas.
    pub pointer: Option<Vec2>,
    /// Whether the pointer is currently over the canvas.
    pub pointer_inside: bool,
    /// Milliseconds since the simulation started.
    pub elapsed_ms: f64,
}

impl InputFrame {
    /// Input with no pointer and no touches: drives idle motion.
    pub fn idle(elapsed_ms: f64) -> Self {
        Self {
            elapsed_ms,
            ..Self::default()
        }
    }

    /// Input with the pointer hovering at `pos`.
    pub fn hover(pos: Vec2, elapsed_ms: f64) -> Self {
        Self {
            pointer: Some(pos),
            pointer_inside: true,
            elapsed_ms,
            ..Self::default()
        }
    }
}

/// Where the frame's input point came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    Touch,
    Pointer,
    Idle,
}

/// The resolved force for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wind {
    /// Input point in screen coordinates.
    pub origin: Vec2,
    /// Force applied to every free joint; magnitude is `speed` unless the
    /// input sits exactly on the field center, where it is zero.
    pub vector: Vec2,
    /// Clamped wind speed.
    pub speed: f32,
    pub source: InputSource,
}

impl Wind {
    /// Unit direction of the wind, or zero when there is none.
    pub fn direction(&self) -> Vec2 {
        self.vector.normalize_or_zero()
    }
}

/// Derives the per-frame wind from input, remembering the previous pointer
/// position to measure pointer speed.
#[derive(Clone, Debug)]
pub struct ForceResolver {
    cfg: WindConfig,
    prev_pointer: Option<Vec2>,
}

impl ForceResolver {
    pub fn new(cfg: WindConfig) -> Self {
        Self {
            cfg,
            prev_pointer: None,
        }
    }

    /// Picks the input point: first touch, then hovering pointer, then idle noise.
    pub fn input_point(
        &self,
        field: &StrandField,
        input: &InputFrame,
        noise: &impl NoiseSource,
    ) -> (Vec2, InputSource) {
        if let Some(&touch) = input.touches.first() {
            return (touch, InputSource::Touch);
        }
        if input.pointer_inside
            && let Some(pointer) = input.pointer
        {
            return (pointer, InputSource::Pointer);
        }

        let d = field.diameter();
        let t = input.elapsed_ms / self.cfg.idle_time_scale_ms;
        let r = lerp(d / 6.0, d / 2.0, noise.sample(t, RADIUS_CHANNEL));
        let a = lerp(-TAU, TAU, noise.sample(t, ANGLE_CHANNEL));
        let p = field.screen_center() + Vec2::new(0.0, -r).rotated(a);
        (p, InputSource::Idle)
    }

    /// Distance the pointer moved since the previous call, then records the
    /// current position.
    fn pointer_speed(&mut self, pointer: Option<Vec2>) -> f32 {
        let speed = match (pointer, self.prev_pointer) {
            (Some(now), Some(before)) => now.distance(before),
            _ => 0.0,
        };
        self.prev_pointer = pointer.or(self.prev_pointer);
        if speed.is_finite() { speed } else { 0.0 }
    }

    /// Resolves the wind for one frame.
    pub fn resolve(
        &mut self,
        field: &StrandField,
        input: &InputFrame,
        noise: &impl NoiseSource,
    ) -> Wind {
        let (origin, source) = self.input_point(field, input, noise);
        let pointer_speed = self.pointer_speed(input.pointer);

        let d = field.diameter();
        let toward_center = field.center() - field.to_local(origin);

        let cfg = &self.cfg;
        let s = map_range(
            toward_center.length(),
            0.0..d / 2.0,
            cfg.min_speed..cfg.max_distance_speed,
        ) + map_range(
            pointer_speed,
            0.0..cfg.max_pointer_speed,
            0.0..cfg.pointer_speed_bonus,
        );
        let [lo, hi] = cfg.speed_clamp;
        let speed = constrain(s, lo, hi);

        let vector = toward_center.with_length(speed);
        Wind {
            origin,
            vector: if vector.is_finite() { vector } else { Vec2::ZERO },
            speed,
            source,
        }
    }

    /// Forgets the remembered pointer position.
    pub fn reset(&mut self) {
        self.prev_pointer = None;
    }
}
