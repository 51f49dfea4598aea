//! Application entry point for the wind-blown hair viewer.
//!
//! This binary parses the command line, sets up logging, loads the
//! configuration and delegates all interactive logic and rendering to
//! [`Viewer`] from the `viewer` module.
//!
//! # Usage
//!
//! ```bash
//! # Default field, random idle seed
//! hair-view
//!
//! # Reproducible idle motion at the reduced frame rate
//! hair-view --seed 42 --reduce-motion
//!
//! # Print the effective configuration as TOML and exit
//! hair-view --config hair.toml --dump-config
//! ```

mod input;
mod viewer;

use std::path::PathBuf;

use clap::Parser;
use hair_core::{config::HairConfig, noise_source::FbmNoise};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use viewer::Viewer;

/// Wind-blown hair background
#[derive(Parser, Debug)]
#[command(name = "hair-view")]
#[command(author, version, about = "Interactive field of wind-blown hairs", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prefer reduced motion (lower frame rate)
    #[arg(long)]
    reduce_motion: bool,

    /// Seed for the idle-motion noise
    #[arg(long)]
    seed: Option<u32>,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Do not draw the wind indicator arrow
    #[arg(long)]
    hide_arrow: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    /// Loads the configuration file (or defaults) and applies flag overrides.
    fn load_config(&self) -> anyhow::Result<HairConfig> {
        let mut cfg = match &self.config {
            Some(path) => HairConfig::load_from_file(path)?,
            None => HairConfig::default(),
        };
        if self.reduce_motion {
            cfg.display.reduce_motion = true;
        }
        if self.hide_arrow {
            cfg.compositor.show_arrow = false;
        }
        if self.seed.is_some() {
            cfg.wind.seed = self.seed;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the configuration is invalid or eframe fails to create the
///   native window or event loop.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let cfg = cli.load_config()?;
    if cli.dump_config {
        print!("{}", cfg.to_toml_string()?);
        return Ok(());
    }

    info!("hair-view v{}", env!("CARGO_PKG_VERSION"));

    let noise = match cfg.wind.seed {
        Some(seed) => FbmNoise::new(seed),
        None => FbmNoise::from_rng(&mut rand::rng()),
    };
    let app = Viewer::new(cfg, noise)?;

    eframe::run_native(
        "Wind Hairs",
        eframe::NativeOptions::default(),
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
}
