//! Neighborhood-driven tile variant resolution
//!
//! A display tile is chosen from the terrain classes at the four corner
//! sample points around a cell, marching-squares style. The resolver is a
//! pure function of the terrain grid and is recomputed wholesale whenever
//! the grid changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::TerrainClass;
use crate::tilemap::{Cell, Tilemap};

/// Index into the display tile catalog. Purely derived, never stored as
/// authoritative state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileVariant(pub u8);

/// Corner sample offsets relative to a cell, in signature order:
/// top-left (0,0), top-right (1,0), bottom-left (0,1), bottom-right (1,1).
/// Downstream consumers rely on this exact addressing for seam-free
/// shorelines.
pub const CORNER_OFFSETS: [(i32, i32); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AutotileError {
    #[error("table entry uses class ordinal {ordinal} but the table covers {class_count} classes")]
    ClassOutOfRange { ordinal: usize, class_count: usize },
    #[error("duplicate table entry for corner signature {signature:?}")]
    DuplicateSignature { signature: [TerrainClass; 4] },
}

/// Corner-signature -> variant association table.
///
/// Entries live in a vector sized `class_count^4`, indexed by the packed
/// signature, so lookup is a single array read. Signatures without an
/// explicit entry resolve to the default variant; resolution never fails.
#[derive(Clone, Debug)]
pub struct AutotileTable {
    class_count: usize,
    variants: Vec<Option<TileVariant>>,
    default: TileVariant,
}

impl AutotileTable {
    /// Build a table from explicit `(signature, variant)` entries plus the
    /// mandatory fallback variant. Rejects entries whose class ordinal
    /// exceeds `class_count` and duplicate signatures.
    pub fn new(
        class_count: usize,
        entries: &[([TerrainClass; 4], TileVariant)],
        default: TileVariant,
    ) -> Result<Self, AutotileError> {
        let mut variants = vec![None; class_count.pow(4)];
        for &(signature, variant) in entries {
            for class in signature {
                if class.ordinal() >= class_count {
                    return Err(AutotileError::ClassOutOfRange {
                        ordinal: class.ordinal(),
                        class_count,
                    });
                }
            }
            let idx = pack(class_count, signature);
            if variants[idx].is_some() {
                return Err(AutotileError::DuplicateSignature { signature });
            }
            variants[idx] = Some(variant);
        }
        Ok(Self {
            class_count,
            variants,
            default,
        })
    }

    /// Variant for an ordered (top-left, top-right, bottom-left,
    /// bottom-right) corner signature. Unmapped signatures take the
    /// default variant.
    pub fn resolve(&self, signature: [TerrainClass; 4]) -> TileVariant {
        self.variants[pack(self.class_count, signature)].unwrap_or(self.default)
    }

    pub fn default_variant(&self) -> TileVariant {
        self.default
    }

    pub fn class_count(&self) -> usize {
        self.class_count
    }

    /// True when every possible signature has an explicit entry.
    pub fn is_complete(&self) -> bool {
        self.variants.iter().all(|v| v.is_some())
    }

    /// Number of signatures that fall through to the default variant.
    pub fn missing_combinations(&self) -> usize {
        self.variants.iter().filter(|v| v.is_none()).count()
    }
}

fn pack(class_count: usize, [tl, tr, bl, br]: [TerrainClass; 4]) -> usize {
    debug_assert!(
        [tl, tr, bl, br].iter().all(|c| c.ordinal() < class_count),
        "signature class outside table range"
    );
    ((tl.ordinal() * class_count + tr.ordinal()) * class_count + bl.ordinal()) * class_count
        + br.ordinal()
}

/// The shoreline catalog for the 16-tile grass/water tileset: one variant
/// per corner combination, with the open-water tile doubling as the
/// fallback for anything unmapped.
pub fn shoreline_table() -> AutotileTable {
    use TerrainClass::{Grass as G, Water as W};

    let entries = [
        ([G, G, G, G], TileVariant(6)),
        ([W, W, W, G], TileVariant(13)),
        ([W, W, G, W], TileVariant(0)),
        ([W, G, W, W], TileVariant(8)),
        ([G, W, W, W], TileVariant(15)),
        ([W, G, W, G], TileVariant(1)),
        ([G, W, G, W], TileVariant(11)),
        ([W, W, G, G], TileVariant(3)),
        ([G, G, W, W], TileVariant(9)),
        ([W, G, G, G], TileVariant(5)),
        ([G, W, G, G], TileVariant(2)),
        ([G, G, W, G], TileVariant(10)),
        ([G, G, G, W], TileVariant(7)),
        ([W, G, G, W], TileVariant(14)),
        ([G, W, W, G], TileVariant(4)),
        ([W, W, W, W], TileVariant(12)),
    ];

    AutotileTable::new(TerrainClass::COUNT, &entries, TileVariant(12))
        .expect("shoreline catalog entries are statically valid")
}

/// Resolve the display variant for every cell of a terrain grid.
///
/// Corner samples that fall outside the grid take `edge_class`; the
/// shoreline setup passes water so maps read as islands.
pub fn resolve_variants(
    terrain: &Tilemap<TerrainClass>,
    table: &AutotileTable,
    edge_class: TerrainClass,
) -> Tilemap<TileVariant> {
    let mut variants = Tilemap::new_with(terrain.width, terrain.height, table.default_variant());
    for y in 0..terrain.height {
        for x in 0..terrain.width {
            let mut signature = [edge_class; 4];
            for (slot, (dx, dy)) in CORNER_OFFSETS.iter().enumerate() {
                let corner = Cell::new(x as i32 + dx, y as i32 + dy);
                if let Some(class) = terrain.get_cell(corner) {
                    signature[slot] = *class;
                }
            }
            variants.set(x, y, table.resolve(signature));
        }
    }
    variants
}
