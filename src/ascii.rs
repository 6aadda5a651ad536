//! ASCII rendering and export of generated grids
//!
//! Text views of the terrain and variant maps for quick inspection and
//! file dumps.

use std::fs::File;
use std::io::{self, Write};

use chrono::Local;

use crate::autotile::TileVariant;
use crate::terrain::TerrainClass;
use crate::tilemap::Tilemap;
use crate::world::WorldMap;

/// Character for a terrain class.
pub fn terrain_char(class: TerrainClass) -> char {
    match class {
        TerrainClass::Grass => '.',
        TerrainClass::Water => '~',
    }
}

/// Hex digit for a variant index; catalogs larger than 16 wrap.
pub fn variant_char(variant: TileVariant) -> char {
    char::from_digit(variant.0 as u32 % 16, 16).unwrap_or('?')
}

/// Render the terrain grid, one row per line.
pub fn terrain_to_string(terrain: &Tilemap<TerrainClass>) -> String {
    let mut out = String::with_capacity((terrain.width + 1) * terrain.height);
    for y in 0..terrain.height {
        for x in 0..terrain.width {
            out.push(terrain_char(*terrain.get(x, y)));
        }
        out.push('\n');
    }
    out
}

/// Render the variant grid as hex digits, one row per line.
pub fn variants_to_string(variants: &Tilemap<TileVariant>) -> String {
    let mut out = String::with_capacity((variants.width + 1) * variants.height);
    for y in 0..variants.height {
        for x in 0..variants.width {
            out.push(variant_char(*variants.get(x, y)));
        }
        out.push('\n');
    }
    out
}

/// Export terrain and variant views to a text file with a small header.
pub fn export_ascii(world: &WorldMap, path: &str) -> io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(
        file,
        "Tile world {}x{} (seed {})",
        world.width(),
        world.height(),
        world.seed()
    )?;
    writeln!(file, "Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file)?;
    writeln!(file, "Terrain ('.' grass, '~' water):")?;
    write!(file, "{}", terrain_to_string(world.terrain()))?;
    writeln!(file)?;
    writeln!(file, "Tile variants (catalog index, hex):")?;
    write!(file, "{}", variants_to_string(world.variants()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_rendering() {
        let mut terrain = Tilemap::new_with(3, 2, TerrainClass::Grass);
        terrain.set(2, 0, TerrainClass::Water);
        assert_eq!(terrain_to_string(&terrain), "..~\n...\n");
    }

    #[test]
    fn test_variant_rendering() {
        let mut variants = Tilemap::new_with(2, 1, TileVariant(6));
        variants.set(1, 0, TileVariant(12));
        assert_eq!(variants_to_string(&variants), "6c\n");
    }
}
