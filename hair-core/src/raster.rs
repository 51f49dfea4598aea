//! Software RGBA layers used as offscreen buffers by the compositor.
//!
//! Pixels are stored premultiplied as [`Vec4`] (`x, y, z` = colour,
//! `w` = alpha) and all drawing uses source-over blending. The layer is
//! host-independent; the viewer uploads it as a texture via
//! [`Layer::write_rgba8_premultiplied`].

use glam::{Vec2, Vec4};
use std::ops::Range;
use serde::{Deserialize, Serialize};

/// A straight (non-premultiplied) RGBA colour with components in `[0, 1]`.
///
/// Serialized as a `[r, g, b, a]` array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(unit_to_u8)
    }

    #[inline]
    pub fn premultiplied(self) -> Vec4 {
        let a = self.a.clamp(0.0, 1.0);
        Vec4::new(self.r * a, self.g * a, self.b * a, a)
    }
}

impl From<[f32; 4]> for Color {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

#[inline]
fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Fast path for pixel export. Float-to-int `as` saturates and maps NaN to 0,
/// so no clamp is needed.
#[inline]
fn unit_to_u8_fast(v: f32) -> u8 {
    (v * 255.0 + 0.5) as u8
}

/// Bilinear taps for one destination row or column.
#[derive(Clone, Copy, Debug)]
struct Tap {
    dst: usize,
    i0: usize,
    i1: usize,
    t: f32,
}

/// Maps the destination pixel centers in `dst` that fall inside
/// `start..end` onto a source axis of `src_len` pixels, clamping to edge.
fn taps(dst: Range<usize>, start: f32, end: f32, scale: f32, src_len: usize) -> Vec<Tap> {
    let last = src_len - 1;
    dst.filter_map(|d| {
        let c = d as f32 + 0.5;
        if c < start || c >= end {
            return None;
        }
        let u = ((c - start) * scale - 0.5).clamp(0.0, last as f32);
        let i0 = (u as usize).min(last);
        Some(Tap {
            dst: d,
            i0,
            i1: (i0 + 1).min(last),
            t: u - i0 as f32,
        })
    })
    .collect()
}

/// Stroke state used when drawing polylines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub weight: f32,
}

impl Stroke {
    pub fn new(color: Color, weight: f32) -> Self {
        Self { color, weight }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new(Color::BLACK, 1.0)
    }
}

/// Minimal stateful drawing surface.
///
/// Callers configure the stroke once and then issue any number of
/// polylines with it.
pub trait Canvas {
    fn set_stroke(&mut self, stroke: Stroke);

    /// Strokes an open polyline through `points` with the current stroke.
    fn stroke_polyline(&mut self, points: &[Vec2]);
}

/// An offscreen premultiplied RGBA raster.
#[derive(Clone, Debug)]
pub struct Layer {
    width: usize,
    height: usize,
    pixels: Vec<Vec4>,
    stroke: Stroke,
}

impl Layer {
    /// Creates a transparent layer. Zero dimensions are bumped to one pixel.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; width * height],
            stroke: Stroke::default(),
        }
    }

    /// Creates a square layer covering a field of diameter `d` pixels.
    pub fn square(d: f32) -> Self {
        let side = if d.is_finite() { d.round().max(1.0) as usize } else { 1 };
        Self::new(side, side)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the layer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Vec4> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Resets every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(Vec4::ZERO);
    }

    /// Blends `color` over every pixel.
    ///
    /// An opaque colour replaces the content; a translucent one fades it.
    pub fn fill(&mut self, color: Color) {
        let src = color.premultiplied();
        let keep = 1.0 - src.w;
        for p in &mut self.pixels {
            *p = src + *p * keep;
        }
    }

    /// Overwrites this layer with `src`, reusing the existing allocation.
    pub fn copy_from(&mut self, src: &Layer) {
        self.width = src.width;
        self.height = src.height;
        self.pixels.clone_from(&src.pixels);
    }

    #[inline]
    fn blend(&mut self, x: usize, y: usize, src: Vec4) {
        let p = &mut self.pixels[y * self.width + x];
        *p = src + *p * (1.0 - src.w);
    }

    /// Draws an anti-aliased round-capped segment.
    fn stroke_segment(&mut self, a: Vec2, b: Vec2, stroke: Stroke) {
        let half = stroke.weight.max(0.0) * 0.5;
        let reach = half + 0.5;
        let src = stroke.color.premultiplied();

        let min = a.min(b) - Vec2::splat(reach);
        let max = a.max(b) + Vec2::splat(reach);
        if !(min.is_finite() && max.is_finite()) {
            return;
        }
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as usize).min(self.height);

        let ab = b - a;
        let len2 = ab.length_squared();
        let reach2 = reach * reach;

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len2 > 0.0 {
                    ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d2 = (p - (a + ab * t)).length_squared();
                if d2 >= reach2 {
                    continue;
                }
                let coverage = (reach - d2.sqrt()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, src * coverage);
                }
            }
        }
    }

    /// Draws `src` scaled to `size` with its top-left corner at `offset`.
    ///
    /// Sampling is bilinear with clamp-to-edge addressing. `src` must not be
    /// `self`; callers smearing a layer onto itself copy it first.
    pub fn draw_layer(&mut self, src: &Layer, offset: Vec2, size: Vec2) {
        if !(size.x > 0.0 && size.y > 0.0 && offset.is_finite() && size.is_finite()) {
            return;
        }
        let scale = Vec2::new(src.width as f32 / size.x, src.height as f32 / size.y);
        let end = offset + size;

        let x0 = offset.x.floor().max(0.0) as usize;
        let y0 = offset.y.floor().max(0.0) as usize;
        let x1 = (end.x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (end.y.ceil().max(0.0) as usize).min(self.height);

        let cols = taps(x0..x1, offset.x, end.x, scale.x, src.width);
        let rows = taps(y0..y1, offset.y, end.y, scale.y, src.height);

        for row in &rows {
            let top = &src.pixels[row.i0 * src.width..][..src.width];
            let bottom = &src.pixels[row.i1 * src.width..][..src.width];
            let out = &mut self.pixels[row.dst * self.width..][..self.width];
            for col in &cols {
                let upper = top[col.i0].lerp(top[col.i1], col.t);
                let lower = bottom[col.i0].lerp(bottom[col.i1], col.t);
                let color = upper.lerp(lower, row.t);
                let p = &mut out[col.dst];
                *p = color + *p * (1.0 - color.w);
            }
        }
    }

    /// Fills a triangle with `color`, sampling at pixel centers.
    pub fn fill_triangle(&mut self, tri: [Vec2; 3], color: Color) {
        let [a, b, c] = tri;
        let area = (b - a).perp_dot(c - a);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        let src = color.premultiplied();
        let min = a.min(b).min(c);
        let max = a.max(b).max(c);

        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as usize).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = (b - a).perp_dot(p - a) * area.signum();
                let w1 = (c - b).perp_dot(p - b) * area.signum();
                let w2 = (a - c).perp_dot(p - c) * area.signum();
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.blend(x, y, src);
                }
            }
        }
    }

    /// Writes premultiplied RGBA8 bytes, row-major, into `out`.
    ///
    /// `out` is resized to fit and can be reused across frames.
    pub fn write_rgba8_premultiplied(&self, out: &mut Vec<u8>) {
        out.resize(self.pixels.len() * 4, 0);
        for (bytes, p) in out.chunks_exact_mut(4).zip(&self.pixels) {
            bytes[0] = unit_to_u8_fast(p.x);
            bytes[1] = unit_to_u8_fast(p.y);
            bytes[2] = unit_to_u8_fast(p.z);
            bytes[3] = unit_to_u8_fast(p.w);
        }
    }
}

impl Canvas for Layer {
    fn set_stroke(&mut self, stroke: Stroke) {
        self.stroke = stroke;
    }

    fn stroke_polyline(&mut self, points: &[Vec2]) {
        let stroke = self.stroke;
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], stroke);
        }
    }
}

/// Forwards drawing to `inner` with coordinates and stroke weights scaled
/// by `scale`, e.g. from logical points to device pixels.
pub struct ScaledCanvas<'a, C: Canvas> {
    inner: &'a mut C,
    scale: f32,
    buf: Vec<Vec2>,
}

impl<'a, C: Canvas> ScaledCanvas<'a, C> {
    pub fn new(inner: &'a mut C, scale: f32) -> Self {
        Self {
            inner,
            scale,
            buf: Vec::new(),
        }
    }
}

impl<C: Canvas> Canvas for ScaledCanvas<'_, C> {
    fn set_stroke(&mut self, stroke: Stroke) {
        self.inner
            .set_stroke(Stroke::new(stroke.color, stroke.weight * self.scale));
    }

    fn stroke_polyline(&mut self, points: &[Vec2]) {
        self.buf.clear();
        self.buf.extend(points.iter().map(|&p| p * self.scale));
        self.inner.stroke_polyline(&self.buf);
    }
}
