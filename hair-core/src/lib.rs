//! Core simulation and rendering for an interactive field of wind-blown hairs.
//!
//! Main components:
//! - [`spine`] - a jointed strand with a bend-angle clamp.
//! - [`field`] - radial layout of strands and its viewport geometry.
//! - [`wind`] - resolves pointer, touch or idle input into a wind vector.
//! - [`integrator`] - moves every strand under wind and gravity.
//! - [`compositor`] - trail raster, smear and draw commands.
//! - [`sim`] - the owned per-viewport context that runs a frame.
//! - [`raster`] - software RGBA layers used as offscreen buffers.
//! - [`noise_source`] - coherent noise for idle motion.
//! - [`config`] - configuration, loadable from TOML.
//! - [`geometry`], [`error`], [`types`] - shared helpers and aliases.

pub mod compositor;
pub mod config;
pub mod error;
pub mod field;
pub mod geometry;
pub mod integrator;
pub mod noise_source;
pub mod raster;
pub mod sim;
pub mod spine;
pub mod types;
pub mod wind;
