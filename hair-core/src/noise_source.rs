use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::Rng;

/// A source of smoothly varying values used for idle motion.
///
/// Implementations must return values in `[0, 1]` and be deterministic for
/// a given `(t, channel)` pair.
pub trait NoiseSource {
    fn sample(&self, t: f64, channel: u32) -> f32;
}

/// Fractal Perlin noise with four octaves, remapped into `[0, 1]`.
///
/// Each channel reads a separate row of the 2-D noise plane, so channels are
/// independent but share the same seed.
#[derive(Clone, Debug)]
pub struct FbmNoise {
    fbm: Fbm<Perlin>,
    seed: u32,
}

impl FbmNoise {
    pub const OCTAVES: usize = 4;
    pub const PERSISTENCE: f64 = 0.5;

    pub fn new(seed: u32) -> Self {
        let fbm = Fbm::<Perlin>::new(seed)
            .set_octaves(Self::OCTAVES)
            .set_persistence(Self::PERSISTENCE)
            .set_frequency(1.0);
        Self { fbm, seed }
    }

    pub fn from_rng(rng: &mut impl Rng) -> Self {
        Self::new(rng.random())
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl NoiseSource for FbmNoise {
    fn sample(&self, t: f64, channel: u32) -> f32 {
        let v = self.fbm.get([t, channel as f64]);
        if v.is_finite() {
            (v * 0.5 + 0.5).clamp(0.0, 1.0) as f32
        } else {
            0.5
        }
    }
}

/// A noise source that always returns the same value. Useful in tests and
/// for a motionless idle state.
#[derive(Clone, Copy, Debug)]
pub struct ConstantNoise(pub f32);

impl NoiseSource for ConstantNoise {
    fn sample(&self, _t: f64, _channel: u32) -> f32 {
        self.0.clamp(0.0, 1.0)
    }
}
