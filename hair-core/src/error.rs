use thiserror::Error;

/// Errors raised while building or configuring a hair simulation.
///
/// The per-frame path never returns these; they only occur when a field
/// is (re)built or configuration is loaded.
#[derive(Error, Debug)]
pub enum HairError {
    /// Viewport dimensions are zero, negative or not finite.
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    /// Device pixels per logical unit is zero, negative or not finite.
    #[error("invalid pixel scale {0}")]
    InvalidPixelScale(f32),

    /// A configuration value is out of its accepted range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read or written.
    #[error("config io error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`crate::config::HairConfig`].
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type HairResult<T> = Result<T, HairError>;
