//! Generated world bundle and atomic regeneration
//!
//! Bundles the quantized noise field, terrain grid, display variants, and
//! property store, and rebuilds them together so no consumer can observe
//! one rebuilt and another stale.

use thiserror::Error;

use crate::autotile::{self, shoreline_table, AutotileTable, TileVariant};
use crate::noisegen::{self, NoiseParams};
use crate::properties::PropertyStore;
use crate::terrain::{self, BandRule, TerrainClass};
use crate::tilemap::Tilemap;

/// What a full regeneration does with post-seed property edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegenPolicy {
    /// Re-seed from scratch; hand edits are lost.
    DiscardEdits,
    /// Re-apply the records of edited cells on top of the fresh seed.
    PreserveEdits,
}

/// Full configuration for world generation.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    pub noise: NoiseParams,
    /// Number of quantization bands
    pub levels: u32,
    /// Band -> terrain class mapping
    pub band_rule: BandRule,
    /// Terrain class assumed beyond the map edge for corner sampling
    pub edge_class: TerrainClass,
    pub regen_policy: RegenPolicy,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            noise: NoiseParams::default(),
            levels: 2,
            band_rule: BandRule::binary(),
            edge_class: TerrainClass::Water,
            regen_policy: RegenPolicy::DiscardEdits,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldGenError {
    #[error("map dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("level count must be at least 1")]
    InvalidLevelCount,
}

/// All derived per-cell state for one generated map.
///
/// The four grids are only ever replaced together, inside
/// [`WorldMap::regenerate`]; holding `&WorldMap` guarantees a consistent
/// snapshot.
pub struct WorldMap {
    config: WorldConfig,
    table: AutotileTable,
    noise_map: Tilemap<f64>,
    terrain: Tilemap<TerrainClass>,
    variants: Tilemap<TileVariant>,
    properties: PropertyStore,
}

impl WorldMap {
    /// Generate a world with the shoreline autotile catalog.
    pub fn generate(config: WorldConfig) -> Result<Self, WorldGenError> {
        Self::generate_with_table(config, shoreline_table())
    }

    /// Generate with a caller-supplied autotile table.
    pub fn generate_with_table(
        config: WorldConfig,
        table: AutotileTable,
    ) -> Result<Self, WorldGenError> {
        if config.noise.width == 0 || config.noise.height == 0 {
            return Err(WorldGenError::InvalidDimensions {
                width: config.noise.width,
                height: config.noise.height,
            });
        }
        if config.levels == 0 {
            return Err(WorldGenError::InvalidLevelCount);
        }

        let (noise_map, terrain, variants, properties) = build(&config, &table);
        Ok(Self {
            config,
            table,
            noise_map,
            terrain,
            variants,
            properties,
        })
    }

    /// Rebuild every derived grid with the current parameters.
    ///
    /// The new state is constructed completely before any field is
    /// replaced, so a reader can never see a fresh terrain grid paired
    /// with stale variants or properties. Property edits survive or
    /// vanish per the configured policy.
    pub fn regenerate(&mut self) {
        let (noise_map, terrain, variants, mut properties) = build(&self.config, &self.table);

        if self.config.regen_policy == RegenPolicy::PreserveEdits {
            for cell in self.properties.edited_cells() {
                if !properties.in_bounds(cell) {
                    continue;
                }
                if let Some(record) = self.properties.get_all(cell) {
                    properties.restore_record(cell, record.clone());
                }
            }
        }

        self.noise_map = noise_map;
        self.terrain = terrain;
        self.variants = variants;
        self.properties = properties;
    }

    /// Regenerate under a new master seed.
    pub fn regenerate_with_seed(&mut self, seed: u64) {
        self.config.noise.seed = seed;
        self.regenerate();
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Quantized noise field, values snapped onto band floors.
    pub fn noise_map(&self) -> &Tilemap<f64> {
        &self.noise_map
    }

    pub fn terrain(&self) -> &Tilemap<TerrainClass> {
        &self.terrain
    }

    pub fn variants(&self) -> &Tilemap<TileVariant> {
        &self.variants
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    /// Mutable property access; edits made here are tracked and subject
    /// to the regeneration policy.
    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }

    pub fn width(&self) -> usize {
        self.terrain.width
    }

    pub fn height(&self) -> usize {
        self.terrain.height
    }

    pub fn seed(&self) -> u64 {
        self.config.noise.seed
    }
}

fn build(
    config: &WorldConfig,
    table: &AutotileTable,
) -> (
    Tilemap<f64>,
    Tilemap<TerrainClass>,
    Tilemap<TileVariant>,
    PropertyStore,
) {
    let mut noise_map = noisegen::generate_noise_map(&config.noise);
    let terrain = terrain::build_terrain(&noise_map, config.levels, &config.band_rule);
    noisegen::quantize_map(&mut noise_map, config.levels);
    let variants = autotile::resolve_variants(&terrain, table, config.edge_class);
    let properties = PropertyStore::seed_from_terrain(&terrain);
    (noise_map, terrain, variants, properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::TileFlag;
    use crate::tilemap::Cell;

    fn small_config() -> WorldConfig {
        WorldConfig {
            noise: NoiseParams {
                width: 24,
                height: 16,
                seed: 77,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generation_validates_config() {
        let mut config = small_config();
        config.noise.width = 0;
        assert!(matches!(
            WorldMap::generate(config),
            Err(WorldGenError::InvalidDimensions { .. })
        ));

        let mut config = small_config();
        config.levels = 0;
        assert_eq!(
            WorldMap::generate(config).err(),
            Some(WorldGenError::InvalidLevelCount)
        );
    }

    #[test]
    fn test_grids_are_consistent_after_generation() {
        let world = WorldMap::generate(small_config()).expect("valid config");

        assert_eq!(world.terrain().width, world.variants().width);
        assert_eq!(world.terrain().height, world.variants().height);
        assert_eq!(world.properties().record_count(), 24 * 16);

        // Variants must equal a fresh resolution of the terrain grid.
        let expected = autotile::resolve_variants(
            world.terrain(),
            &shoreline_table(),
            TerrainClass::Water,
        );
        assert_eq!(*world.variants(), expected);

        // Walkability mirrors the terrain classification.
        for (x, y, class) in world.terrain().iter() {
            let cell = Cell::new(x as i32, y as i32);
            let walkable = world.properties().get(cell, TileFlag::Walkable);
            assert_eq!(walkable, *class == TerrainClass::Grass);
        }
    }

    #[test]
    fn test_noise_map_is_quantized() {
        let world = WorldMap::generate(small_config()).expect("valid config");
        for (_, _, v) in world.noise_map().iter() {
            assert!(*v == 0.0 || *v == 0.5);
        }
    }

    #[test]
    fn test_constant_field_classifies_into_one_band() {
        // Zero octaves makes the noise field exactly 0.5 everywhere; with
        // two levels that sits on the band edge and must land wholesale in
        // band 1, i.e. all water under the binary rule.
        let mut config = small_config();
        config.noise.octaves = 0;
        let world = WorldMap::generate(config).expect("valid config");

        for (_, _, v) in world.noise_map().iter() {
            assert_eq!(*v, 0.5);
        }
        for (_, _, class) in world.terrain().iter() {
            assert_eq!(*class, TerrainClass::Water);
        }
        for (_, _, variant) in world.variants().iter() {
            assert_eq!(*variant, TileVariant(12));
        }
    }

    #[test]
    fn test_same_seed_regeneration_is_identical() {
        let mut world = WorldMap::generate(small_config()).expect("valid config");
        let terrain_before = world.terrain().clone();
        let variants_before = world.variants().clone();
        let noise_before = world.noise_map().clone();

        world.regenerate();

        assert_eq!(*world.terrain(), terrain_before);
        assert_eq!(*world.variants(), variants_before);
        assert_eq!(*world.noise_map(), noise_before);
    }

    #[test]
    fn test_new_seed_changes_the_world() {
        // Fine scale and many bands so the quantized field keeps enough
        // entropy to tell two seeds apart.
        let mut config = small_config();
        config.noise.scale = 5.0;
        config.levels = 16;
        let mut world = WorldMap::generate(config).expect("valid config");
        let before = world.noise_map().clone();
        world.regenerate_with_seed(78);
        assert_ne!(*world.noise_map(), before);
        assert_eq!(world.seed(), 78);
    }

    #[test]
    fn test_regeneration_discards_edits_by_default() {
        // The default policy reseeds from scratch: hand edits do NOT
        // survive a regeneration.
        let mut world = WorldMap::generate(small_config()).expect("valid config");
        let cell = Cell::new(3, 3);
        world
            .properties_mut()
            .set(cell, TileFlag::Buildable, true)
            .unwrap();
        assert!(world.properties().get(cell, TileFlag::Buildable));

        world.regenerate();
        assert!(!world.properties().has(cell, TileFlag::Buildable));
    }

    #[test]
    fn test_regeneration_can_preserve_edits() {
        let mut config = small_config();
        config.regen_policy = RegenPolicy::PreserveEdits;
        let mut world = WorldMap::generate(config).expect("valid config");

        let cell = Cell::new(5, 5);
        world
            .properties_mut()
            .set(cell, TileFlag::Buildable, true)
            .unwrap();
        world
            .properties_mut()
            .set(cell, TileFlag::Walkable, false)
            .unwrap();

        world.regenerate();
        assert!(world.properties().get(cell, TileFlag::Buildable));
        assert!(!world.properties().get(cell, TileFlag::Walkable));

        // Untouched cells still come from the fresh seed.
        let untouched = Cell::new(0, 0);
        let expect_walkable = *world.terrain().get(0, 0) == TerrainClass::Grass;
        assert_eq!(
            world.properties().get(untouched, TileFlag::Walkable),
            expect_walkable
        );
    }
}
