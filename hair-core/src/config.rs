use crate::error::{HairError, HairResult};
use crate::raster::Color;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

/// Complete configuration for a hair simulation and its host.
///
/// Every section has defaults matching the stock look, so a TOML file only
/// needs to name the values it changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairConfig {
    pub field: FieldConfig,
    pub integrator: IntegratorConfig,
    pub wind: WindConfig,
    pub compositor: CompositorConfig,
    pub display: DisplayConfig,
}

/// Layout of the strand field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of strands.
    pub n_hairs: usize,
    /// Number of joints per strand.
    pub n_segments: usize,
    /// Maximum bend angle between consecutive segments (radians).
    pub max_bend: f32,
    /// Field diameter as a fraction of the smaller viewport side.
    pub diameter_ratio: f32,
    /// Radius of the root circle as a fraction of the diameter.
    pub root_radius_ratio: f32,
    /// Rest length of a whole strand as a fraction of the diameter.
    pub hair_length_ratio: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            n_hairs: 60,
            n_segments: 10,
            max_bend: PI / 6.0,
            diameter_ratio: 0.9,
            root_radius_ratio: 0.1,
            hair_length_ratio: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Integration sub-steps per rendered frame.
    pub substeps: usize,
    /// Constant downward bias added to every free joint per sub-step.
    pub gravity: f32,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            substeps: 4,
            gravity: 1.0,
        }
    }
}

/// Parameters of the force resolver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Milliseconds of elapsed time per unit of noise time.
    pub idle_time_scale_ms: f64,
    /// Speed at zero distance from the field center.
    pub min_speed: f32,
    /// Speed reached at a distance of half the field diameter.
    pub max_distance_speed: f32,
    /// Pointer speed (pixels per frame) that earns the full bonus.
    pub max_pointer_speed: f32,
    /// Speed bonus for a pointer moving at `max_pointer_speed`.
    pub pointer_speed_bonus: f32,
    /// Final speed is clamped into `[speed_clamp[0], speed_clamp[1]]`.
    pub speed_clamp: [f32; 2],
    /// Seed for the idle-motion noise; random when unset.
    pub seed: Option<u32>,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            idle_time_scale_ms: 5000.0,
            min_speed: 0.4,
            max_distance_speed: 4.0,
            max_pointer_speed: 40.0,
            pointer_speed_bonus: 1.0,
            speed_clamp: [0.4, 6.0],
            seed: None,
        }
    }
}

/// Colours, stroke weights and smear parameters of the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    pub background: Color,
    pub trail_initial: Color,
    pub trail_stroke: Color,
    pub trail_weight: f32,
    pub crisp_stroke: Color,
    pub crisp_weight: f32,
    /// Overlay blended over the trail layer once per frame.
    pub fade: Color,
    /// Fraction of the diameter the trail is grown and shifted by.
    pub smear_factor: f32,
    pub show_arrow: bool,
    pub arrow_color: Color,
    /// Shaft length per unit of wind speed.
    pub arrow_length_factor: f32,
    pub arrow_head_size: f32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            trail_initial: Color::WHITE,
            trail_stroke: Color::WHITE,
            trail_weight: 3.0,
            crisp_stroke: Color::BLACK,
            crisp_weight: 1.0,
            fade: Color::new(0.0, 0.0, 0.0, 30.0 / 255.0),
            smear_factor: 0.01,
            show_arrow: true,
            arrow_color: Color::WHITE,
            arrow_length_factor: 30.0,
            arrow_head_size: 20.0,
        }
    }
}

/// Frame pacing of the host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub frame_rate: f32,
    pub reduced_frame_rate: f32,
    pub reduce_motion: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_rate: 55.0,
            reduced_frame_rate: 24.0,
            reduce_motion: false,
        }
    }
}

impl DisplayConfig {
    /// Target frames per second, honouring the reduced-motion preference.
    pub fn target_fps(&self) -> f32 {
        if self.reduce_motion {
            self.reduced_frame_rate
        } else {
            self.frame_rate
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> HairResult<()> {
        if self.n_hairs == 0 {
            return Err(HairError::InvalidConfig("field.n_hairs must be at least 1".into()));
        }
        if self.n_segments < 2 {
            return Err(HairError::InvalidConfig(
                "field.n_segments must be at least 2".into(),
            ));
        }
        if !(self.max_bend > 0.0 && self.max_bend.is_finite()) {
            return Err(HairError::InvalidConfig("field.max_bend must be positive".into()));
        }
        for (name, v) in [
            ("field.diameter_ratio", self.diameter_ratio),
            ("field.root_radius_ratio", self.root_radius_ratio),
            ("field.hair_length_ratio", self.hair_length_ratio),
        ] {
            if !(v > 0.0 && v.is_finite()) {
                return Err(HairError::InvalidConfig(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}

impl HairConfig {
    /// Checks every section for values the simulation cannot run with.
    pub fn validate(&self) -> HairResult<()> {
        self.field.validate()?;

        if self.integrator.substeps == 0 {
            return Err(HairError::InvalidConfig(
                "integrator.substeps must be at least 1".into(),
            ));
        }

        let [lo, hi] = self.wind.speed_clamp;
        if !(lo <= hi) {
            return Err(HairError::InvalidConfig(format!(
                "wind.speed_clamp is inverted: [{lo}, {hi}]"
            )));
        }
        if !(self.wind.idle_time_scale_ms > 0.0) {
            return Err(HairError::InvalidConfig(
                "wind.idle_time_scale_ms must be positive".into(),
            ));
        }

        if !(self.display.frame_rate > 0.0 && self.display.reduced_frame_rate > 0.0) {
            return Err(HairError::InvalidConfig("display frame rates must be positive".into()));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> HairResult<Self> {
        let config: HairConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> HairResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> HairResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> HairResult<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(HairConfig::default().validate().is_ok());
    }

    #[test]
    fn toml_round_trip_preserves_values() {
        let mut cfg = HairConfig::default();
        cfg.field.n_hairs = 12;
        cfg.wind.seed = Some(7);
        cfg.display.reduce_motion = true;

        let text = cfg.to_toml_string().unwrap();
        let back = HairConfig::from_toml_str(&text).unwrap();

        assert_eq!(back, cfg);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = HairConfig::from_toml_str("[field]\nn_hairs = 5\n").unwrap();

        assert_eq!(cfg.field.n_hairs, 5);
        assert_eq!(cfg.field.n_segments, FieldConfig::default().n_segments);
        assert_eq!(cfg.integrator, IntegratorConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cfg = HairConfig::default();
        cfg.field.n_segments = 1;
        assert!(matches!(cfg.validate(), Err(HairError::InvalidConfig(_))));

        let mut cfg = HairConfig::default();
        cfg.wind.speed_clamp = [6.0, 0.4];
        assert!(matches!(cfg.validate(), Err(HairError::InvalidConfig(_))));

        let mut cfg = HairConfig::default();
        cfg.integrator.substeps = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_then_load_file_round_trips() {
        let path = std::env::temp_dir().join(format!("hair-config-{}.toml", std::process::id()));
        let mut cfg = HairConfig::default();
        cfg.compositor.show_arrow = false;
        cfg.wind.seed = Some(3);

        cfg.save_to_file(&path).unwrap();
        let loaded = HairConfig::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.unwrap(), cfg);
    }

    #[test]
    fn loading_missing_file_is_an_io_error() {
        let err = HairConfig::load_from_file("/nonexistent/hair.toml").unwrap_err();
        assert!(matches!(err, HairError::ConfigIo(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = HairConfig::from_toml_str("[field\nn_hairs = ").unwrap_err();
        assert!(matches!(err, HairError::ConfigParse(_)));
    }

    #[test]
    fn target_fps_honours_reduced_motion() {
        let mut display = DisplayConfig::default();
        assert_eq!(display.target_fps(), 55.0);
        display.reduce_motion = true;
        assert_eq!(display.target_fps(), 24.0);
    }
}
