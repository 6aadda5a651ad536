//! PNG and JSON exports of generated grids
//!
//! Emits only the abstract class and variant grids; drawing real tile art
//! is the presentation layer's job.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use image::{Rgb, RgbImage};
use serde::Serialize;

use crate::ascii::terrain_char;
use crate::properties::TileFlag;
use crate::terrain::TerrainClass;
use crate::tilemap::{Cell, Tilemap};
use crate::world::WorldMap;

/// Export the noise field as a grayscale PNG, black 0.0 to white 1.0.
pub fn export_noise_map(noise_map: &Tilemap<f64>, path: &str) -> Result<(), image::ImageError> {
    let mut img = RgbImage::new(noise_map.width as u32, noise_map.height as u32);
    for (x, y, value) in noise_map.iter() {
        let v = (value.clamp(0.0, 1.0) * 255.0) as u8;
        img.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
    }
    img.save(path)
}

fn terrain_color(class: TerrainClass) -> Rgb<u8> {
    match class {
        TerrainClass::Grass => Rgb([96, 160, 64]),
        TerrainClass::Water => Rgb([48, 96, 176]),
    }
}

/// Export the terrain classification as a flat-color PNG.
pub fn export_terrain_map(
    terrain: &Tilemap<TerrainClass>,
    path: &str,
) -> Result<(), image::ImageError> {
    let mut img = RgbImage::new(terrain.width as u32, terrain.height as u32);
    for (x, y, class) in terrain.iter() {
        img.put_pixel(x as u32, y as u32, terrain_color(*class));
    }
    img.save(path)
}

/// Serializable snapshot of a generated world.
#[derive(Serialize)]
struct WorldSnapshot {
    width: usize,
    height: usize,
    seed: u64,
    levels: u32,
    /// One string per row, '.' grass / '~' water
    terrain: Vec<String>,
    /// Catalog indices, one row per entry
    variants: Vec<Vec<u8>>,
    walkable_cells: usize,
}

/// Export a JSON snapshot of the world's abstract grids.
pub fn export_world_json(world: &WorldMap, path: &str) -> Result<(), Box<dyn Error>> {
    let terrain = world.terrain();
    let variants = world.variants();

    let terrain_rows: Vec<String> = (0..terrain.height)
        .map(|y| {
            (0..terrain.width)
                .map(|x| terrain_char(*terrain.get(x, y)))
                .collect()
        })
        .collect();

    let variant_rows: Vec<Vec<u8>> = (0..variants.height)
        .map(|y| (0..variants.width).map(|x| variants.get(x, y).0).collect())
        .collect();

    let walkable_cells = (0..world.height())
        .flat_map(|y| (0..world.width()).map(move |x| Cell::new(x as i32, y as i32)))
        .filter(|cell| world.properties().get(*cell, TileFlag::Walkable))
        .count();

    let snapshot = WorldSnapshot {
        width: world.width(),
        height: world.height(),
        seed: world.seed(),
        levels: world.config().levels,
        terrain: terrain_rows,
        variants: variant_rows,
        walkable_cells,
    };

    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &snapshot)?;
    Ok(())
}
