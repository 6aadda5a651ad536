//! Procedural tile world library
//!
//! Noise-driven terrain synthesis, shoreline autotiling, per-cell grid
//! properties, A* pathfinding, and wandering agents.

pub mod ascii;
pub mod autotile;
pub mod export;
pub mod noisegen;
pub mod pathfinding;
pub mod properties;
pub mod terrain;
pub mod tilemap;
pub mod wander;
pub mod world;
