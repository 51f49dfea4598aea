//! Desktop host for the hair simulation built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the [`HairSim`] and implements
//! [`eframe::App`] to pace frames, feed pointer/touch input, upload the
//! trail raster as a texture and draw the returned render commands.

use std::time::Duration;

use crate::input::{self, TouchTracker};
use eframe::App;
use glam::Vec2;
use hair_core::{
    compositor::RenderCommand,
    config::HairConfig,
    error::HairResult,
    noise_source::FbmNoise,
    raster::Color,
    sim::{HairSim, RenderFrame},
    wind::InputFrame,
};
use tracing::{info, warn};

/// Viewport used until the first frame reports the real canvas size.
const INITIAL_VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

/// Upper bound on trail pixels per point; denser displays are upscaled.
const MAX_PIXEL_SCALE: f32 = 2.0;

/// Main application state for the hair background.
///
/// ### Fields
/// - `sim` - The simulation context (field, wind, trail).
/// - `running` - Whether frames are advancing; paused keeps the last frame on screen.
/// - `viewport` - Canvas size the simulation was last built for.
/// - `pixel_scale` - Trail pixels per egui point, from the display density.
/// - `touches` - Active touch contacts, tracked across frames.
/// - `frame_interval` - Target seconds between simulation frames.
/// - `last_step_time` - egui time of the last simulation frame.
/// - `last_step_dt` - Measured time between the last two frames (status bar only).
/// - `needs_frame` - Forces one redraw even while paused, e.g. after a resize.
///   A paused redraw shows the field as it is without advancing it.
pub struct Viewer {
    sim: HairSim<FbmNoise>,

    running: bool,
    viewport: Vec2,
    pixel_scale: f32,
    touches: TouchTracker,

    frame_interval: f64,
    last_step_time: Option<f64>,
    last_step_dt: f64,
    needs_frame: bool,

    last_frame: Option<RenderFrame>,
    trail_texture: Option<egui::TextureHandle>,
    rgba: Vec<u8>,
}

impl Viewer {
    /// Creates a viewer for `cfg` with idle noise seeded from `noise`.
    pub fn new(cfg: HairConfig, noise: FbmNoise) -> HairResult<Self> {
        let frame_interval = 1.0 / cfg.display.target_fps() as f64;
        info!(
            fps = cfg.display.target_fps(),
            reduce_motion = cfg.display.reduce_motion,
            seed = noise.seed(),
            "starting hair viewer"
        );
        let sim = HairSim::new(INITIAL_VIEWPORT, cfg, noise)?;

        Ok(Self {
            sim,
            running: true,
            viewport: INITIAL_VIEWPORT,
            pixel_scale: 1.0,
            touches: TouchTracker::default(),
            frame_interval,
            last_step_time: None,
            last_step_dt: 0.0,
            needs_frame: true,
            last_frame: None,
            trail_texture: None,
            rgba: Vec::new(),
        })
    }

    /// Toggles between running and paused.
    fn toggle_running(&mut self) {
        self.running = !self.running;
        info!(running = self.running, "animation toggled");
    }

    /// Rebuilds the simulation when the canvas size changed.
    ///
    /// A rejected size is logged and the previous field is kept.
    fn handle_resize(&mut self, size: Vec2) {
        if (size - self.viewport).abs().max_element() < 0.5 {
            return;
        }
        match self.sim.resize(size) {
            Ok(()) => {
                self.viewport = size;
                self.last_frame = None;
                self.needs_frame = true;
            }
            Err(err) => warn!(%err, "keeping previous strand field"),
        }
    }

    /// Rebuilds the trail when the display density changed.
    fn handle_pixel_scale(&mut self, pixels_per_point: f32) {
        let scale = pixels_per_point.clamp(1.0, MAX_PIXEL_SCALE);
        if scale == self.pixel_scale {
            return;
        }
        match self.sim.set_pixel_scale(scale) {
            Ok(()) => {
                self.pixel_scale = scale;
                self.needs_frame = true;
            }
            Err(err) => warn!(%err, "keeping previous pixel scale"),
        }
    }

    /// Rebuilds the field for the current viewport, restarting the trail.
    fn reset(&mut self) {
        if let Err(err) = self.sim.resize(self.viewport) {
            warn!(%err, "reset failed");
            return;
        }
        self.touches.clear();
        self.last_frame = None;
        self.needs_frame = true;
    }

    /// Returns `true` if a simulation frame should run at time `now`.
    fn frame_due(&self, now: f64) -> bool {
        if self.needs_frame {
            return true;
        }
        self.running
            && self
                .last_step_time
                .is_none_or(|last| now - last >= self.frame_interval)
    }

    /// Seconds until the next frame is due.
    fn until_next_frame(&self, now: f64) -> f64 {
        match self.last_step_time {
            Some(last) => (self.frame_interval - (now - last)).max(0.0),
            None => 0.0,
        }
    }

    /// Steps when running; while paused only redraws the current field.
    fn advance(&mut self, input: &InputFrame, now: f64) {
        if self.running {
            self.step(input, now);
        } else {
            self.last_frame = Some(self.sim.present());
            self.needs_frame = false;
        }
    }

    fn step(&mut self, input: &InputFrame, now: f64) {
        if let Some(last) = self.last_step_time {
            self.last_step_dt = now - last;
        }
        self.last_frame = Some(self.sim.step(input));
        self.last_step_time = Some(now);
        self.needs_frame = false;
    }

    fn color32(c: Color) -> egui::Color32 {
        let [r, g, b, a] = c.to_rgba8();
        egui::Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    /// Uploads the trail, creating the texture on first use.
    fn upload_trail(&mut self, ctx: &egui::Context) {
        let trail = self.sim.trail();
        trail.write_rgba8_premultiplied(&mut self.rgba);
        let image =
            egui::ColorImage::from_rgba_premultiplied([trail.width(), trail.height()], &self.rgba);
        let options = egui::TextureOptions::LINEAR;

        if let Some(handle) = &mut self.trail_texture {
            handle.set(image, options);
            return;
        }
        self.trail_texture = Some(ctx.load_texture("hair-trail", image, options));
    }

    /// Draws the last frame's commands into `rect`.
    fn paint_frame(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(frame) = &self.last_frame else {
            painter.rect_filled(rect, 0.0, Self::color32(self.sim.config().compositor.background));
            return;
        };
        let to_screen = |p: Vec2| rect.min + egui::vec2(p.x, p.y);

        for command in &frame.commands {
            match command {
                RenderCommand::Clear(color) => {
                    painter.rect_filled(rect, 0.0, Self::color32(*color));
                }
                RenderCommand::Trail { offset, size } => {
                    let Some(handle) = &self.trail_texture else {
                        continue;
                    };
                    painter.image(
                        handle.id(),
                        egui::Rect::from_min_size(to_screen(*offset), egui::vec2(*size, *size)),
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
                RenderCommand::Strands { lines, stroke } => {
                    let stroke = egui::Stroke::new(stroke.weight, Self::color32(stroke.color));
                    for line in lines {
                        let points = line.iter().map(|&p| to_screen(p)).collect();
                        painter.add(egui::Shape::line(points, stroke));
                    }
                }
                RenderCommand::Arrow(arrow) => {
                    let color = Self::color32(arrow.color);
                    let stroke = egui::Stroke::new(1.0, color);
                    painter.line_segment([to_screen(arrow.from), to_screen(arrow.to)], stroke);
                    painter.add(egui::Shape::convex_polygon(
                        arrow.head.iter().map(|&p| to_screen(p)).collect(),
                        color,
                        stroke,
                    ));
                }
            }
        }
    }

    /// Builds the top bar with the pause/resume and reset controls.
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Resume" })
                    .clicked()
                {
                    self.toggle_running();
                }
                if ui.button("Reset").clicked() {
                    self.reset();
                }
            });
        });
    }

    /// Builds the bottom status bar (frame timing and wind readout).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.frame_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("frame = {}", self.sim.frame()));
                if let Some(wind) = self.sim.last_wind() {
                    ui.label(format!("wind = {:.2} ({:?})", wind.speed, wind.source));
                }
                ui.label(format!("D = {:.0}", self.sim.field().diameter()));
            });
        });
    }

    /// Builds the canvas: resizes, samples input, steps and paints.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::hover());
                let rect = response.rect;
                self.handle_resize(Vec2::new(rect.width(), rect.height()));
                self.handle_pixel_scale(ctx.pixels_per_point());

                let now = ctx.input(|i| i.time);
                let input = input::sample(ctx, rect, &mut self.touches, now * 1000.0);

                if self.frame_due(now) {
                    self.advance(&input, now);
                    self.upload_trail(ctx);
                }

                let painter = ui.painter_at(rect);
                self.paint_frame(&painter, rect);

                if self.running {
                    ctx.request_repaint_after(Duration::from_secs_f64(self.until_next_frame(now)));
                }
            });
    }
}

impl App for Viewer {
    /// eframe callback that builds the panels and advances the animation.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.toggle_running();
        }
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}
