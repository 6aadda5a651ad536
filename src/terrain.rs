//! Terrain classification from quantized noise bands.

use serde::{Deserialize, Serialize};

use crate::noisegen::band_index;
use crate::tilemap::Tilemap;

/// Discrete terrain category for one cell.
///
/// Immutable once a generation pass completes; regeneration replaces the
/// whole grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainClass {
    Grass,
    Water,
}

impl TerrainClass {
    /// Number of terrain classes.
    pub const COUNT: usize = 2;

    /// Ordinal used when packing autotile signatures.
    pub fn ordinal(self) -> usize {
        match self {
            TerrainClass::Grass => 0,
            TerrainClass::Water => 1,
        }
    }
}

/// Maps quantized noise bands onto terrain classes.
///
/// Bands beyond the end of the table take the last entry, so a two-entry
/// rule covers any level count.
#[derive(Clone, Debug, PartialEq)]
pub struct BandRule {
    per_band: Vec<TerrainClass>,
}

impl BandRule {
    /// Build from an explicit band -> class table. Must be non-empty.
    pub fn new(per_band: Vec<TerrainClass>) -> Self {
        assert!(
            !per_band.is_empty(),
            "band rule needs at least one class"
        );
        Self { per_band }
    }

    /// Band 0 is grass, every higher band is water.
    pub fn binary() -> Self {
        Self::new(vec![TerrainClass::Grass, TerrainClass::Water])
    }

    pub fn class_for(&self, band: u32) -> TerrainClass {
        let idx = (band as usize).min(self.per_band.len() - 1);
        self.per_band[idx]
    }
}

/// Classify a noise field into a dense terrain grid.
///
/// Each cell's band ordinal (see [`band_index`]) is looked up in the rule.
/// The returned grid is built wholesale; there is no partial update path.
pub fn build_terrain(
    noise_map: &Tilemap<f64>,
    levels: u32,
    rule: &BandRule,
) -> Tilemap<TerrainClass> {
    let mut terrain = Tilemap::new_with(noise_map.width, noise_map.height, TerrainClass::Water);
    for (x, y, value) in noise_map.iter() {
        terrain.set(x, y, rule.class_for(band_index(*value, levels)));
    }
    terrain
}
