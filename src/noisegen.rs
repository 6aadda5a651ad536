//! Layered noise synthesis and threshold quantization
//!
//! Produces the deterministic [0, 1] scalar field that terrain
//! classification consumes.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::tilemap::Tilemap;

/// Parameters for noise field generation.
///
/// Identical parameters always yield a bit-identical field, independent of
/// call order or platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Map width in cells
    pub width: usize,
    /// Map height in cells
    pub height: usize,
    /// Noise zoom factor (higher = larger features)
    pub scale: f64,
    /// Number of noise layers summed per cell
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
    /// Frequency growth per octave
    pub lacunarity: f64,
    /// Manual sample offset applied on top of the per-octave offsets
    pub offset: (f64, f64),
    /// Seed for the octave offset RNG and the noise primitive
    pub seed: u64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: (0.0, 0.0),
            seed: 42,
        }
    }
}

/// Generate a `width` x `height` field of values in [0, 1].
///
/// Each octave samples Perlin noise at `(cell + octave_offset[i]) / scale *
/// lacunarity^i`, weighted by `persistence^i`; octave offsets are integer
/// draws from a ChaCha stream seeded by `params.seed`. The raw sum is
/// normalized against the theoretical [-1, 1] range. With `octaves == 0`
/// the raw sum is 0 and every cell normalizes to 0.5.
pub fn generate_noise_map(params: &NoiseParams) -> Tilemap<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let octave_offsets: Vec<(f64, f64)> = (0..params.octaves)
        .map(|_| {
            let ox = rng.gen_range(-100_000..100_000) as f64 + params.offset.0;
            let oy = rng.gen_range(-100_000..100_000) as f64 + params.offset.1;
            (ox, oy)
        })
        .collect();

    let perlin = Perlin::new(params.seed as u32);
    let mut map = Tilemap::new_with(params.width, params.height, 0.0f64);

    for y in 0..params.height {
        for x in 0..params.width {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut sum = 0.0;

            for &(ox, oy) in &octave_offsets {
                let sample_x = (x as f64 + ox) / params.scale * frequency;
                let sample_y = (y as f64 + oy) / params.scale * frequency;
                sum += perlin.get([sample_x, sample_y]) * amplitude;

                amplitude *= params.persistence;
                frequency *= params.lacunarity;
            }

            map.set(x, y, inverse_lerp(-1.0, 1.0, sum));
        }
    }

    map
}

/// Map `value` into [0, 1] relative to `[a, b]`, clamped.
fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Band ordinal for a [0, 1] value, clamped to the top band.
///
/// A value sitting exactly on a band edge floors into the upper band:
/// 0.5 with two levels lands in band 1, not band 0. `levels` must be at
/// least 1.
pub fn band_index(value: f64, levels: u32) -> u32 {
    assert!(levels > 0, "band_index requires at least one level");
    let band = (value * levels as f64).floor().max(0.0) as u32;
    band.min(levels - 1)
}

/// Snap a [0, 1] value onto the floor of its threshold band.
///
/// With `levels` bands of width `step = 1/levels`, the result is always
/// one of `{0, step, .., (levels - 1) * step}`. Shares the band-edge rule
/// of [`band_index`]. `levels` must be at least 1.
pub fn quantize(value: f64, levels: u32) -> f64 {
    assert!(levels > 0, "quantize requires at least one level");
    let step = 1.0 / levels as f64;
    band_index(value, levels) as f64 * step
}

/// Quantize an entire field in place.
pub fn quantize_map(map: &mut Tilemap<f64>, levels: u32) {
    for (_, _, value) in map.iter_mut() {
        *value = quantize(*value, levels);
    }
}
