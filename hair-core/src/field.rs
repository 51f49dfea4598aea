use crate::{
    config::FieldConfig,
    error::{HairError, HairResult},
    geometry::{Vec2Ext, lerp, map_range},
    spine::Spine,
    types::StrandId,
};
use glam::Vec2;
use std::f32::consts::PI;
use tracing::debug;

/// One hair: a spine plus the two fixed points it hangs from.
#[derive(Clone, Debug, PartialEq)]
pub struct Strand {
    /// Fixed position of joint 0.
    pub root: Vec2,
    /// Fixed position of joint 1.
    pub second: Vec2,
    pub spine: Spine,
}

impl Strand {
    /// Forces the two anchor joints back onto `root` and `second`.
    #[inline]
    pub fn pin_anchors(&mut self) {
        self.spine.set_joint(0, self.root);
        self.spine.set_joint(1, self.second);
    }
}

/// A radial arrangement of strands inside a `D x D` square.
///
/// All strand coordinates are field-local: `(0, 0)` is the top-left corner
/// of the square, which sits at [`StrandField::offset`] on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct StrandField {
    pub strands: Vec<Strand>,
    viewport: Vec2,
    diameter: f32,
    cfg: FieldConfig,
}

impl StrandField {
    /// Lays out a fresh field for a viewport of the given size.
    ///
    /// Roots are spread evenly over the upper half of a circle of radius
    /// `root_radius_ratio * D` around the center, from the right-hand side
    /// (index 0) to the left-hand side (last index). Each spine starts as a
    /// straight ray pointing away from the center.
    ///
    /// ### Errors
    /// [`HairError::InvalidViewport`] for empty or non-finite viewports and
    /// [`HairError::InvalidConfig`] for unusable field settings.
    pub fn new(viewport: Vec2, cfg: &FieldConfig) -> HairResult<Self> {
        cfg.validate()?;
        if !(viewport.is_finite() && viewport.x > 0.0 && viewport.y > 0.0) {
            return Err(HairError::InvalidViewport {
                width: viewport.x,
                height: viewport.y,
            });
        }

        let diameter = viewport.min_element() * cfg.diameter_ratio;
        let center = Vec2::splat(diameter / 2.0);
        let r = diameter * cfg.root_radius_ratio;
        let sep = diameter * cfg.hair_length_ratio / cfg.n_segments as f32;
        let last = (cfg.n_hairs - 1) as f32;

        let strands = (0..cfg.n_hairs)
            .map(|i: StrandId| {
                let t = map_range(i as f32, 0.0..last, 0.0..1.0);
                let dir = Vec2::new(r, 0.0).rotated(lerp(0.0, -PI, t));
                let root = center + dir;
                let step = dir.with_length(sep);
                Strand {
                    root,
                    second: root + step,
                    spine: Spine::straight(root, step, cfg.n_segments, cfg.max_bend),
                }
            })
            .collect();

        debug!(
            width = viewport.x,
            height = viewport.y,
            diameter,
            strands = cfg.n_hairs,
            "built strand field"
        );

        Ok(Self {
            strands,
            viewport,
            diameter,
            cfg: *cfg,
        })
    }

    /// Rebuilds the field from scratch for a new viewport size.
    ///
    /// On error the field is left untouched.
    pub fn resize(&mut self, viewport: Vec2) -> HairResult<()> {
        *self = Self::new(viewport, &self.cfg)?;
        Ok(())
    }

    /// Field diameter `D`.
    #[inline]
    pub fn diameter(&self) -> f32 {
        self.diameter
    }

    #[inline]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Center of the field in field-local coordinates.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::splat(self.diameter / 2.0)
    }

    /// Center of the viewport in screen coordinates.
    #[inline]
    pub fn screen_center(&self) -> Vec2 {
        self.viewport / 2.0
    }

    /// Screen position of the field square's top-left corner.
    #[inline]
    pub fn offset(&self) -> Vec2 {
        (self.viewport - Vec2::splat(self.diameter)) / 2.0
    }

    /// Converts a screen position into field-local coordinates.
    #[inline]
    pub fn to_local(&self, screen: Vec2) -> Vec2 {
        screen - self.offset()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn cfg(n_hairs: usize, n_segments: usize) -> FieldConfig {
        FieldConfig {
            n_hairs,
            n_segments,
            ..FieldConfig::default()
        }
    }

    #[test]
    fn diameter_and_offset_follow_viewport() {
        let field = StrandField::new(Vec2::new(800.0, 600.0), &FieldConfig::default()).unwrap();

        assert!((field.diameter() - 540.0).abs() < EPS);
        assert!((field.center() - Vec2::splat(270.0)).length() < EPS);
        assert!((field.offset() - Vec2::new(130.0, 30.0)).length() < EPS);
        assert!((field.to_local(Vec2::new(400.0, 300.0)) - field.center()).length() < EPS);
    }

    #[test]
    fn roots_span_the_upper_half_circle() {
        let field = StrandField::new(Vec2::new(1000.0, 1000.0), &cfg(3, 10)).unwrap();
        let c = field.center();
        let r = field.diameter() * 0.1;

        let first = field.strands[0].root - c;
        let middle = field.strands[1].root - c;
        let last = field.strands[2].root - c;

        assert!((first - Vec2::new(r, 0.0)).length() < EPS);
        assert!((middle - Vec2::new(0.0, -r)).length() < EPS, "{middle:?}");
        assert!((last - Vec2::new(-r, 0.0)).length() < EPS);
    }

    #[test]
    fn spines_start_as_straight_outward_rays() {
        let field = StrandField::new(Vec2::new(500.0, 400.0), &FieldConfig::default()).unwrap();
        let sep = field.diameter() * 0.5 / 10.0;

        for strand in &field.strands {
            let joints = strand.spine.joints();
            assert_eq!(joints.len(), 10);
            assert_eq!(joints[0], strand.root);
            assert!((joints[1] - strand.second).length() < EPS);
            assert!(((strand.second - strand.root).length() - sep).abs() < EPS);

            let outward = (strand.root - field.center()).normalize();
            for w in joints.windows(2) {
                let seg = w[1] - w[0];
                assert!((seg.length() - sep).abs() < EPS);
                assert!(seg.normalize().dot(outward) > 0.9999);
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let a = StrandField::new(Vec2::new(640.0, 480.0), &FieldConfig::default()).unwrap();
        let b = StrandField::new(Vec2::new(640.0, 480.0), &FieldConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_hair_layout_has_no_nan() {
        let field = StrandField::new(Vec2::new(300.0, 300.0), &cfg(1, 3)).unwrap();
        let strand = &field.strands[0];
        assert!(strand.spine.joints().iter().all(|j| j.is_finite()));
        assert!((strand.root - field.center() - Vec2::new(27.0, 0.0)).length() < EPS);
    }

    #[test]
    fn resize_rebuilds_from_scratch() {
        let mut field = StrandField::new(Vec2::new(800.0, 600.0), &FieldConfig::default()).unwrap();
        field.strands[0].spine.set_joint(5, Vec2::new(-999.0, -999.0));

        field.resize(Vec2::new(400.0, 300.0)).unwrap();

        let fresh = StrandField::new(Vec2::new(400.0, 300.0), &FieldConfig::default()).unwrap();
        assert!((field.diameter() - 270.0).abs() < EPS);
        assert_eq!(field, fresh);
    }

    #[test]
    fn invalid_viewport_is_rejected_and_resize_keeps_old_field() {
        assert!(matches!(
            StrandField::new(Vec2::new(0.0, 600.0), &FieldConfig::default()),
            Err(HairError::InvalidViewport { .. })
        ));

        let mut field = StrandField::new(Vec2::new(800.0, 600.0), &FieldConfig::default()).unwrap();
        let before = field.clone();
        assert!(field.resize(Vec2::new(f32::NAN, 10.0)).is_err());
        assert_eq!(field, before);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            StrandField::new(Vec2::new(100.0, 100.0), &cfg(0, 10)),
            Err(HairError::InvalidConfig(_))
        ));
    }
}
