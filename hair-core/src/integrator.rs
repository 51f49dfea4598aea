//! Per-frame strand motion.
//!
//! Each sub-step pushes every free joint by the wind plus a constant
//! downward bias, walking from the tip towards the root so that each
//! candidate is checked against root-ward joints from the previous
//! sub-step. The anchors are then pinned and a root-to-tip relax pass
//! re-seats the chain on its length and bend limits.

use crate::{
    config::IntegratorConfig,
    field::{Strand, StrandField},
};
use glam::Vec2;

/// Advances one strand by a single sub-step.
pub fn substep_strand(strand: &mut Strand, force: Vec2) {
    for i in (2..strand.spine.len()).rev() {
        let candidate = strand.spine.joints()[i] + force;
        strand.spine.set_joint(i, candidate);
    }
    strand.pin_anchors();
    strand.spine.relax();
}

/// Advances every strand of the field by one sub-step.
///
/// ### Parameters
/// - `field` - The strands to move.
/// - `wind` - The frame's wind vector, shared by all strands.
/// - `gravity` - Downward bias added to the wind (positive y is down).
pub fn substep(field: &mut StrandField, wind: Vec2, gravity: f32) {
    let force = wind + Vec2::new(0.0, gravity);
    let force = if force.is_finite() { force } else { Vec2::ZERO };
    for strand in &mut field.strands {
        substep_strand(strand, force);
    }
}

/// Runs the configured number of sub-steps for one rendered frame.
pub fn integrate(field: &mut StrandField, wind: Vec2, cfg: &IntegratorConfig) {
    for _ in 0..cfg.substeps {
        substep(field, wind, cfg.gravity);
    }
}
