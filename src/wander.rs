//! Roaming destination selection and tile-by-tile traversal
//!
//! Two-phase planner: pick a walkable cell inside a biased annulus, path
//! to it with A*, then walk the path cell by cell. Each planner owns its
//! RNG so a run replays exactly from a seed.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::pathfinding::PathFinder;
use crate::properties::{PropertyStore, TileFlag};
use crate::tilemap::{Cell, OutOfBounds};

/// Wander behavior tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WanderConfig {
    /// Minimum destination distance in cells
    pub min_radius: f32,
    /// Maximum destination distance in cells
    pub max_radius: f32,
    /// Power bias pulling destinations toward the minimum radius
    pub distance_bias: f32,
    /// Movement speed in cells per second
    pub speed: f32,
    /// Destination samples per seek cycle
    pub max_attempts: u32,
    /// Distance at which a path cell counts as reached
    pub arrival_tolerance: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            min_radius: 3.0,
            max_radius: 10.0,
            distance_bias: 2.0,
            speed: 5.0,
            max_attempts: 10,
            arrival_tolerance: 0.1,
        }
    }
}

/// Minimal 2D float vector for continuous agent positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Center of a cell in grid coordinates.
    pub fn cell_center(cell: Cell) -> Self {
        Self::new(cell.x as f32 + 0.5, cell.y as f32 + 0.5)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Step toward `target` by at most `max_step`, without overshooting.
    pub fn move_towards(self, target: Vec2, max_step: f32) -> Vec2 {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= max_step || dist == 0.0 {
            return target;
        }
        Vec2::new(self.x + dx / dist * max_step, self.y + dy / dist * max_step)
    }
}

/// Planner phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WanderPhase {
    /// Looking for the next destination; also the idle phase.
    SeekingDestination,
    /// Walking the queued path.
    Traversing,
}

/// Drives one agent's roaming over the grid.
///
/// State is owned exclusively by the agent; pausing an agent is simply a
/// matter of not ticking it.
pub struct WanderPlanner {
    config: WanderConfig,
    position: Vec2,
    path: VecDeque<Cell>,
    destination: Option<Cell>,
    phase: WanderPhase,
    idle_cycles: u64,
    rng: ChaCha8Rng,
}

impl WanderPlanner {
    /// Place an agent at the center of `start`. The seed fixes the whole
    /// destination sequence for replay.
    pub fn new(start: Cell, config: WanderConfig, seed: u64) -> Self {
        Self {
            config,
            position: Vec2::cell_center(start),
            path: VecDeque::new(),
            destination: None,
            phase: WanderPhase::SeekingDestination,
            idle_cycles: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Cell the agent currently occupies.
    pub fn current_cell(&self) -> Cell {
        Cell::new(self.position.x.floor() as i32, self.position.y.floor() as i32)
    }

    pub fn phase(&self) -> WanderPhase {
        self.phase
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn destination(&self) -> Option<Cell> {
        self.destination
    }

    /// Remaining cells to visit, front first.
    pub fn path(&self) -> impl Iterator<Item = Cell> + '_ {
        self.path.iter().copied()
    }

    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    /// Seek cycles that found no walkable candidate, i.e. ticks the agent
    /// idled in place. Distinct from path-computation failures.
    pub fn idle_cycles(&self) -> u64 {
        self.idle_cycles
    }

    /// Advance the planner by `dt` seconds.
    ///
    /// Fails only when the agent occupies an out-of-grid cell, which is a
    /// contract violation by the embedding simulation.
    pub fn tick(&mut self, dt: f32, store: &PropertyStore) -> Result<(), OutOfBounds> {
        match self.phase {
            WanderPhase::SeekingDestination => self.seek(store),
            WanderPhase::Traversing => {
                self.traverse(dt);
                Ok(())
            }
        }
    }

    fn seek(&mut self, store: &PropertyStore) -> Result<(), OutOfBounds> {
        let origin = self.current_cell();
        let destination = self.select_destination(origin, store);
        self.destination = Some(destination);

        let finder = PathFinder::new(store);
        match finder.find_path(origin, destination)? {
            Some(path) => {
                self.path = path.into_iter().collect();
                self.phase = WanderPhase::Traversing;
            }
            None => {
                // Destination unreachable; stay seeking and retry next tick.
                self.path.clear();
            }
        }
        Ok(())
    }

    /// Sample up to `max_attempts` annulus offsets and pick uniformly
    /// among the walkable candidates. With none, fall back to the current
    /// cell and count an idle cycle.
    fn select_destination(&mut self, origin: Cell, store: &PropertyStore) -> Cell {
        let mut candidates = Vec::new();
        for _ in 0..self.config.max_attempts {
            let angle = self.rng.gen_range(0.0..TAU);
            let u: f32 = self.rng.gen();
            let magnitude = lerp(
                self.config.min_radius,
                self.config.max_radius,
                u.powf(self.config.distance_bias),
            );
            let candidate = origin.offset(
                (angle.cos() * magnitude).round() as i32,
                (angle.sin() * magnitude).round() as i32,
            );
            if store.in_bounds(candidate) && store.get(candidate, TileFlag::Walkable) {
                candidates.push(candidate);
            }
        }

        if candidates.is_empty() {
            self.idle_cycles += 1;
            origin
        } else {
            candidates[self.rng.gen_range(0..candidates.len())]
        }
    }

    fn traverse(&mut self, dt: f32) {
        let Some(&next) = self.path.front() else {
            self.phase = WanderPhase::SeekingDestination;
            return;
        };

        let center = Vec2::cell_center(next);
        self.position = self.position.move_towards(center, self.config.speed * dt);

        if self.position.distance(center) <= self.config.arrival_tolerance {
            self.path.pop_front();
            if self.path.is_empty() {
                self.phase = WanderPhase::SeekingDestination;
            }
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainClass;
    use crate::tilemap::Tilemap;

    fn grass_store(width: usize, height: usize) -> PropertyStore {
        let terrain = Tilemap::new_with(width, height, TerrainClass::Grass);
        PropertyStore::seed_from_terrain(&terrain)
    }

    fn water_store(width: usize, height: usize) -> PropertyStore {
        let terrain = Tilemap::new_with(width, height, TerrainClass::Water);
        PropertyStore::seed_from_terrain(&terrain)
    }

    #[test]
    fn test_destination_sequence_replays_from_seed() {
        let store = grass_store(40, 40);
        let origin = Cell::new(20, 20);

        let mut first = WanderPlanner::new(origin, WanderConfig::default(), 99);
        let mut second = WanderPlanner::new(origin, WanderConfig::default(), 99);

        let a: Vec<Cell> = (0..20)
            .map(|_| first.select_destination(origin, &store))
            .collect();
        let b: Vec<Cell> = (0..20)
            .map(|_| second.select_destination(origin, &store))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_destinations_respect_walkability() {
        let store = grass_store(40, 40);
        let origin = Cell::new(20, 20);
        let mut planner = WanderPlanner::new(origin, WanderConfig::default(), 7);
        for _ in 0..50 {
            let dest = planner.select_destination(origin, &store);
            assert!(store.in_bounds(dest));
            assert!(store.get(dest, TileFlag::Walkable) || dest == origin);
        }
    }

    #[test]
    fn test_no_candidates_idles_on_current_cell() {
        let store = water_store(9, 9);
        let origin = Cell::new(4, 4);
        let mut planner = WanderPlanner::new(origin, WanderConfig::default(), 5);

        let dest = planner.select_destination(origin, &store);
        assert_eq!(dest, origin);
        assert_eq!(planner.idle_cycles(), 1);
    }

    #[test]
    fn test_seek_then_traverse_consumes_path() {
        let store = grass_store(30, 30);
        let mut planner = WanderPlanner::new(Cell::new(15, 15), WanderConfig::default(), 11);

        planner.tick(0.0, &store).unwrap();
        assert_eq!(planner.phase(), WanderPhase::Traversing);
        assert!(planner.path_len() >= 1);

        // Walk until the queue drains; generously bounded.
        for _ in 0..10_000 {
            if planner.phase() == WanderPhase::SeekingDestination {
                break;
            }
            planner.tick(0.05, &store).unwrap();
        }
        assert_eq!(planner.phase(), WanderPhase::SeekingDestination);
        assert_eq!(planner.path_len(), 0);

        let dest = planner.destination().expect("destination was chosen");
        let arrived = Vec2::cell_center(dest);
        assert!(planner.position().distance(arrived) <= 0.2);
    }

    #[test]
    fn test_unreachable_destination_keeps_seeking() {
        // Two grass cells separated by water: the far cell is a valid
        // candidate but no path exists, so the planner must stay seeking
        // with an empty queue rather than idling or walking.
        let mut terrain = Tilemap::new_with(9, 1, TerrainClass::Water);
        terrain.set(0, 0, TerrainClass::Grass);
        terrain.set(4, 0, TerrainClass::Grass);
        let store = PropertyStore::seed_from_terrain(&terrain);

        let config = WanderConfig {
            min_radius: 4.0,
            max_radius: 4.0,
            max_attempts: 200,
            ..Default::default()
        };
        let mut planner = WanderPlanner::new(Cell::new(0, 0), config, 3);

        planner.tick(0.1, &store).unwrap();
        if planner.destination() == Some(Cell::new(4, 0)) {
            assert_eq!(planner.phase(), WanderPhase::SeekingDestination);
            assert_eq!(planner.path_len(), 0);
            assert_eq!(planner.idle_cycles(), 0);
        }
    }

    #[test]
    fn test_degenerate_path_returns_to_seeking() {
        // Lone walkable cell: the fallback destination is the current
        // cell, whose one-cell path completes on the next tick.
        let mut terrain = Tilemap::new_with(3, 3, TerrainClass::Water);
        terrain.set(1, 1, TerrainClass::Grass);
        let store = PropertyStore::seed_from_terrain(&terrain);

        let mut planner = WanderPlanner::new(Cell::new(1, 1), WanderConfig::default(), 21);
        planner.tick(0.1, &store).unwrap();
        assert_eq!(planner.phase(), WanderPhase::Traversing);
        assert_eq!(planner.idle_cycles(), 1);

        planner.tick(0.1, &store).unwrap();
        assert_eq!(planner.phase(), WanderPhase::SeekingDestination);
    }

    #[test]
    fn test_move_towards_no_overshoot() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(3.0, 4.0);
        let stepped = from.move_towards(to, 1.0);
        assert!((stepped.distance(from) - 1.0).abs() < 1e-5);
        assert_eq!(from.move_towards(to, 10.0), to);
    }
}
