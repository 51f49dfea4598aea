use crate::{geometry::Vec2Ext, raster::Canvas, types::JointId};
use glam::Vec2;
use tracing::debug;

/// An ordered chain of joints forming one flexible strand.
///
/// Joints `0` and `1` are anchors: they are written as given and never
/// constrained. Every later joint is kept at `rest_separation` from its
/// predecessor and within `max_bend` of the previous segment's direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Spine {
    joints: Vec<Vec2>,
    rest_separation: f32,
    max_bend: f32,
}

impl Spine {
    /// Creates a straight spine starting at `root` and stepping by `step`.
    ///
    /// The rest separation is the length of `step`.
    pub fn straight(root: Vec2, step: Vec2, n: usize, max_bend: f32) -> Self {
        let joints = (0..n).map(|j| root + step * j as f32).collect();
        Self {
            joints,
            rest_separation: step.length(),
            max_bend,
        }
    }

    #[inline]
    pub fn joints(&self) -> &[Vec2] {
        &self.joints
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn rest_separation(&self) -> f32 {
        self.rest_separation
    }

    pub fn max_bend(&self) -> f32 {
        self.max_bend
    }

    /// Last joint of the chain, if any.
    pub fn tip(&self) -> Option<Vec2> {
        self.joints.last().copied()
    }

    /// Sets joint `i` to `pos`, applying the length and bend constraints for `i >= 2`.
    ///
    /// The incoming segment is first rescaled to the rest separation. If its
    /// signed angle against the previous segment exceeds `max_bend`, it is
    /// rotated back onto the limit. A candidate that coincides with its
    /// predecessor continues the previous segment's direction.
    /// Out-of-range indices are ignored.
    pub fn set_joint(&mut self, i: JointId, pos: Vec2) {
        if i >= self.joints.len() {
            debug!(index = i, len = self.joints.len(), "ignoring out-of-range joint");
            return;
        }
        if i < 2 {
            self.joints[i] = pos;
            return;
        }

        let base = self.joints[i - 1];
        let prev = base - self.joints[i - 2];

        let mut seg = (pos - base).with_length(self.rest_separation);
        if seg == Vec2::ZERO || !seg.is_finite() {
            seg = prev.with_length(self.rest_separation);
        }

        let angle = prev.signed_angle_to(seg);
        if angle.abs() > self.max_bend {
            seg = seg.rotated(self.max_bend.copysign(angle) - angle);
        }

        self.joints[i] = base + seg;
    }

    /// Re-applies the constraints from the root outwards without moving anything else.
    ///
    /// Used after a tip-to-root pass, where each joint was checked against
    /// predecessors that moved afterwards.
    pub fn relax(&mut self) {
        for i in 2..self.joints.len() {
            let pos = self.joints[i];
            self.set_joint(i, pos);
        }
    }

    /// Signed bend angle at every joint `i >= 2`, in joint order.
    pub fn bend_angles(&self) -> impl Iterator<Item = f32> + '_ {
        self.joints.windows(3).map(|w| {
            let prev = w[1] - w[0];
            let seg = w[2] - w[1];
            prev.signed_angle_to(seg)
        })
    }

    /// Strokes the joints as one open polyline with the canvas's current stroke.
    pub fn render(&self, canvas: &mut impl Canvas) {
        canvas.stroke_polyline(&self.joints);
    }
}
