//! Strand rendering with a directional motion trail.
//!
//! Strands are stroked into a persistent *trail* raster (thick, pale) and
//! emitted as crisp polylines (thin, dark) for the host to draw on top.
//! Between frames the trail is faded and redrawn onto itself slightly
//! enlarged and shifted along the wind, which streaks old strokes in the
//! direction of motion.
//!
//! The trail raster is kept at device pixel density: field coordinates are
//! multiplied by the compositor's pixel scale before rasterizing.
//!
//! The smear for a frame is applied at the start of the next frame, so the
//! trail a host reads after [`Compositor::paint`] is exactly the one
//! described by the returned commands.

use crate::{
    config::CompositorConfig,
    field::StrandField,
    geometry::Vec2Ext,
    raster::{Canvas, Color, Layer, ScaledCanvas, Stroke},
    wind::Wind,
};
use glam::Vec2;
use std::f32::consts::PI;

const HEAD_FIRST_TURN: f32 = PI * 5.0 / 6.0;
const HEAD_TURN: f32 = PI * 2.0 / 3.0;

/// Indicator arrow: a shaft plus a filled triangular head.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrow {
    pub from: Vec2,
    pub to: Vec2,
    pub head: [Vec2; 3],
    pub color: Color,
}

impl Arrow {
    /// Builds an arrow from `from` along `v`, with an equilateral head of side
    /// `head_size` whose apex is the shaft tip.
    pub fn new(from: Vec2, v: Vec2, head_size: f32, color: Color) -> Self {
        let to = from + v;
        let mut u = v.with_length(head_size);
        let mut q = to;
        let mut head = [to; 3];
        for (i, corner) in head.iter_mut().enumerate() {
            u = u.rotated(if i == 0 { HEAD_FIRST_TURN } else { HEAD_TURN });
            q += u;
            *corner = q;
        }
        Self {
            from,
            to,
            head,
            color,
        }
    }
}

/// A host-independent drawing instruction, in screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    /// Fill the whole visible surface.
    Clear(Color),
    /// Draw the trail raster stretched over the square at `offset` with
    /// side `size`, in logical units.
    Trail { offset: Vec2, size: f32 },
    /// Stroke every polyline with `stroke`.
    Strands { lines: Vec<Vec<Vec2>>, stroke: Stroke },
    Arrow(Arrow),
}

/// Owns the trail raster and produces the per-frame command list.
#[derive(Clone, Debug)]
pub struct Compositor {
    trail: Layer,
    scratch: Layer,
    cfg: CompositorConfig,
    diameter: f32,
    pixel_scale: f32,
    pending_smear: Option<Vec2>,
}

impl Compositor {
    /// Creates the trail for a field of diameter `d` at one pixel per unit.
    /// The trail starts filled with `trail_initial` and fades from there.
    pub fn new(d: f32, cfg: CompositorConfig) -> Self {
        Self::with_pixel_scale(d, 1.0, cfg)
    }

    /// Like [`Compositor::new`] with `pixel_scale` device pixels per unit.
    pub fn with_pixel_scale(d: f32, pixel_scale: f32, cfg: CompositorConfig) -> Self {
        let mut trail = Layer::square(d * pixel_scale);
        trail.fill(cfg.trail_initial);
        Self {
            scratch: Layer::new(trail.width(), trail.height()),
            trail,
            cfg,
            diameter: d,
            pixel_scale,
            pending_smear: None,
        }
    }

    /// Discards the trail and recreates it for a new diameter and pixel scale.
    pub fn resize(&mut self, d: f32, pixel_scale: f32) {
        *self = Self::with_pixel_scale(d, pixel_scale, self.cfg);
    }

    pub fn trail(&self) -> &Layer {
        &self.trail
    }

    pub fn pixel_scale(&self) -> f32 {
        self.pixel_scale
    }

    /// Fades the trail and redraws it onto itself, grown by `smear_factor`
    /// on every side and shifted by the same amount along `dir`.
    ///
    /// A zero `dir` grows the trail evenly around its center.
    pub fn smear(&mut self, dir: Vec2) {
        self.trail.fill(self.cfg.fade);

        let d = self.trail.width() as f32;
        let f = self.cfg.smear_factor;
        let offset = Vec2::splat(-d * f) + dir.normalize_or_zero() * d * f;
        let size = Vec2::splat(d + d * f * 2.0);

        self.scratch.copy_from(&self.trail);
        self.trail.draw_layer(&self.scratch, offset, size);
    }

    /// Paints the trail and returns the commands that show this frame.
    ///
    /// The smear left by the previous frame is applied first; this frame's
    /// smear is recorded and runs on the next call.
    pub fn paint(&mut self, field: &StrandField, wind: &Wind) -> Vec<RenderCommand> {
        if let Some(dir) = self.pending_smear.take() {
            self.smear(dir);
        }

        let mut trail = ScaledCanvas::new(&mut self.trail, self.pixel_scale);
        trail.set_stroke(Stroke::new(self.cfg.trail_stroke, self.cfg.trail_weight));
        for strand in &field.strands {
            strand.spine.render(&mut trail);
        }

        let offset = field.offset();
        let lines: Vec<Vec<Vec2>> = field
            .strands
            .iter()
            .map(|strand| strand.spine.joints().iter().map(|&p| p + offset).collect::<Vec<_>>())
            .collect();

        let mut commands = vec![
            RenderCommand::Clear(self.cfg.background),
            RenderCommand::Trail {
                offset,
                size: self.diameter,
            },
            RenderCommand::Strands {
                lines,
                stroke: Stroke::new(self.cfg.crisp_stroke, self.cfg.crisp_weight),
            },
        ];
        if self.cfg.show_arrow {
            commands.push(RenderCommand::Arrow(Arrow::new(
                wind.origin,
                wind.vector.with_length(wind.speed * self.cfg.arrow_length_factor),
                self.cfg.arrow_head_size,
                self.cfg.arrow_color,
            )));
        }

        self.pending_smear = Some(wind.direction());
        commands
    }

    /// Rasterizes `commands` onto `target`, which stands in for the visible
    /// surface at one pixel per unit.
    pub fn render_into(&self, commands: &[RenderCommand], target: &mut Layer) {
        for command in commands {
            match command {
                RenderCommand::Clear(color) => {
                    target.clear();
                    target.fill(*color);
                }
                RenderCommand::Trail { offset, size } => {
                    target.draw_layer(&self.trail, *offset, Vec2::splat(*size));
                }
                RenderCommand::Strands { lines, stroke } => {
                    target.set_stroke(*stroke);
                    for line in lines {
                        target.stroke_polyline(line);
                    }
                }
                RenderCommand::Arrow(arrow) => {
                    target.set_stroke(Stroke::new(arrow.color, 1.0));
                    target.stroke_polyline(&[arrow.from, arrow.to]);
                    target.fill_triangle(arrow.head, arrow.color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::FieldConfig, wind::InputSource};
    use glam::Vec4;

    const EPS: f32 = 1e-3;

    fn wind(vector: Vec2) -> Wind {
        Wind {
            origin: Vec2::new(10.0, 10.0),
            vector,
            speed: vector.length().max(0.4),
            source: InputSource::Pointer,
        }
    }

    fn field() -> StrandField {
        StrandField::new(Vec2::new(200.0, 160.0), &FieldConfig::default()).unwrap()
    }

    #[test]
    fn arrow_head_is_equilateral_with_apex_at_tip() {
        let arrow = Arrow::new(Vec2::ZERO, Vec2::new(100.0, 0.0), 20.0, Color::WHITE);
        assert_eq!(arrow.to, Vec2::new(100.0, 0.0));

        let [a, b, c] = arrow.head;
        assert!((c - arrow.to).length() < EPS, "last corner closes on the tip");
        assert!((a.distance(b) - 20.0).abs() < EPS);
        assert!((b.distance(c) - 20.0).abs() < EPS);
        assert!((c.distance(a) - 20.0).abs() < EPS);
        // Head trails behind the tip.
        assert!(a.x < arrow.to.x && b.x < arrow.to.x);
    }

    #[test]
    fn zero_arrow_is_degenerate_not_nan() {
        let arrow = Arrow::new(Vec2::new(5.0, 5.0), Vec2::ZERO, 20.0, Color::WHITE);
        assert!(arrow.head.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn paint_emits_commands_in_draw_order() {
        let field = field();
        let mut comp = Compositor::new(field.diameter(), CompositorConfig::default());
        let commands = comp.paint(&field, &wind(Vec2::new(-2.0, 0.0)));

        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0], RenderCommand::Clear(Color::BLACK));
        assert_eq!(
            commands[1],
            RenderCommand::Trail {
                offset: field.offset(),
                size: field.diameter()
            }
        );
        let RenderCommand::Strands { lines, stroke } = &commands[2] else {
            panic!("expected strands, got {:?}", commands[2]);
        };
        assert_eq!(lines.len(), field.strands.len());
        assert_eq!(*stroke, Stroke::new(Color::BLACK, 1.0));
        assert!(matches!(commands[3], RenderCommand::Arrow(_)));
    }

    #[test]
    fn arrow_can_be_hidden() {
        let field = field();
        let cfg = CompositorConfig {
            show_arrow: false,
            ..CompositorConfig::default()
        };
        let mut comp = Compositor::new(field.diameter(), cfg);
        let commands = comp.paint(&field, &wind(Vec2::X));
        assert!(!commands.iter().any(|c| matches!(c, RenderCommand::Arrow(_))));
    }

    #[test]
    fn strand_lines_follow_the_current_field_in_screen_space() {
        let mut field = field();
        let mut comp = Compositor::new(field.diameter(), CompositorConfig::default());
        let first = comp.paint(&field, &wind(Vec2::X));

        let offset = field.offset();
        let RenderCommand::Strands { lines, .. } = &first[2] else {
            panic!("expected strands");
        };
        assert_eq!(lines[0][0], field.strands[0].root + offset);
        assert_eq!(lines[0].len(), field.strands[0].spine.len());

        for strand in &mut field.strands {
            strand.root += Vec2::splat(50.0);
            strand.second += Vec2::splat(50.0);
            strand.pin_anchors();
            strand.spine.relax();
        }
        let second = comp.paint(&field, &wind(Vec2::X));
        let RenderCommand::Strands { lines, .. } = &second[2] else {
            panic!("expected strands");
        };
        assert_eq!(lines[0][0], field.strands[0].root + offset);
        assert_eq!(lines[0][1], field.strands[0].second + offset);
    }

    #[test]
    fn trail_is_rasterized_at_pixel_scale() {
        let field = field();
        let cfg = CompositorConfig {
            trail_initial: Color::TRANSPARENT,
            ..CompositorConfig::default()
        };
        let mut comp = Compositor::with_pixel_scale(field.diameter(), 2.0, cfg);
        let side = Layer::square(field.diameter() * 2.0).width();
        assert_eq!(comp.trail().width(), side);
        assert_eq!(comp.pixel_scale(), 2.0);

        comp.paint(&field, &wind(Vec2::X));

        // Strand 0 points along +x from its root; at twice the density the
        // stroke sits at twice the root coordinates.
        let root = field.strands[0].root * 2.0;
        let on = comp.trail().pixel(root.x as usize + 6, root.y as usize).unwrap();
        assert!(on.w > 0.9, "{on:?}");
        // Strands fan over the upper half only.
        assert_eq!(comp.trail().pixel(side - 1, side - 1), Some(Vec4::ZERO));
    }

    #[test]
    fn trail_starts_white_and_fades_to_black() {
        let field = field();
        let cfg = CompositorConfig::default();
        let mut comp = Compositor::new(field.diameter(), cfg);
        assert!((comp.trail().pixel(0, 0).unwrap() - Vec4::ONE).abs().max_element() < EPS);

        for _ in 0..200 {
            comp.paint(&field, &wind(Vec2::new(0.0, 1.0)));
        }
        let corner = comp.trail().pixel(0, 0).unwrap();
        assert!(corner.x < 0.05, "corner should have faded, got {corner:?}");
        assert!((corner.w - 1.0).abs() < EPS);
    }

    #[test]
    fn smear_shifts_content_along_wind() {
        let mut comp = Compositor::new(
            200.0,
            CompositorConfig {
                trail_initial: Color::TRANSPARENT,
                fade: Color::TRANSPARENT,
                ..CompositorConfig::default()
            },
        );
        // A bright vertical bar at x = 100.
        comp.trail.set_stroke(Stroke::new(Color::WHITE, 2.0));
        comp.trail
            .stroke_polyline(&[Vec2::new(100.0, 20.0), Vec2::new(100.0, 180.0)]);

        for _ in 0..5 {
            comp.smear(Vec2::X);
        }
        // Content was pushed right: offset (-2 + 2) keeps the left edge, the
        // enlargement moves a bar at the center 1 pixel per smear.
        let right = comp.trail().pixel(104, 100).unwrap().w;
        let left = comp.trail().pixel(96, 100).unwrap().w;
        assert!(right > left, "right {right} left {left}");
    }

    #[test]
    fn zero_wind_smear_spreads_evenly() {
        let mut comp = Compositor::new(
            200.0,
            CompositorConfig {
                trail_initial: Color::TRANSPARENT,
                fade: Color::TRANSPARENT,
                ..CompositorConfig::default()
            },
        );
        // A bar covering pixel columns 99 and 100, symmetric about the center.
        comp.trail.set_stroke(Stroke::new(Color::WHITE, 2.0));
        comp.trail
            .stroke_polyline(&[Vec2::new(100.0, 20.0), Vec2::new(100.0, 180.0)]);

        for _ in 0..5 {
            comp.smear(Vec2::ZERO);
        }

        let trail = comp.trail();
        let coverage = |xs: std::ops::Range<usize>| -> f32 {
            xs.map(|x| trail.pixel(x, 100).unwrap().w).sum()
        };
        let left = coverage(0..100);
        let right = coverage(100..200);
        assert!(left > 0.5, "left {left}");
        assert!((left - right).abs() < 1e-3, "left {left} right {right}");

        for y in 0..trail.height() {
            for x in 0..trail.width() {
                assert!(trail.pixel(x, y).unwrap().is_finite(), "NaN at ({x}, {y})");
            }
        }
    }

    #[test]
    fn render_into_places_trail_at_offset() {
        let field = field();
        let mut comp = Compositor::new(field.diameter(), CompositorConfig::default());
        let commands = comp.paint(&field, &wind(Vec2::new(-1.0, 0.0)));

        let viewport = field.viewport();
        let mut target = Layer::new(viewport.x as usize, viewport.y as usize);
        comp.render_into(&commands, &mut target);

        // Outside the field square only the black background remains.
        let bg = target.pixel(0, 80).unwrap();
        assert!((bg - Vec4::new(0.0, 0.0, 0.0, 1.0)).abs().max_element() < EPS);
        // Inside the square the white trail start shows through.
        let off = field.offset();
        let inside = target.pixel(off.x as usize + 2, off.y as usize + 2).unwrap();
        assert!(inside.x > 0.9, "{inside:?}");
    }

    #[test]
    fn resize_recreates_trail_and_scratch() {
        let mut comp = Compositor::new(100.0, CompositorConfig::default());
        comp.paint(&field(), &wind(Vec2::X));
        comp.resize(50.0, 1.5);
        assert_eq!(comp.trail().width(), 75);
        assert_eq!(comp.scratch.height(), 75);
        assert_eq!(comp.pixel_scale(), 1.5);
        assert_eq!(comp.pending_smear, None);
    }
}
