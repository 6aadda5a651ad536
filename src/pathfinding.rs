//! A* shortest-path search over the property store
//!
//! Cost and heuristic both use Euclidean distance between cell
//! coordinates, so the heuristic stays admissible and consistent, and the
//! search stays correct if diagonal or weighted movement is added later.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::properties::{PropertyStore, TileFlag};
use crate::tilemap::{Cell, OutOfBounds};

/// Ordered cell sequence from start to target, both inclusive; consecutive
/// cells are edge-adjacent.
pub type Path = Vec<Cell>;

/// Heap entry. Ordered so the smallest f-score pops first; among equal
/// f-scores the cell with the lower y wins, then the lower x. This keeps
/// expansion order fully deterministic instead of leaning on hash-map
/// iteration order.
#[derive(Clone, Copy, PartialEq)]
struct OpenNode {
    cell: Cell,
    g: f64,
    f: f64,
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.cell.y.cmp(&self.cell.y))
            .then_with(|| other.cell.x.cmp(&self.cell.x))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search over a property store's walkability flags.
pub struct PathFinder<'a> {
    store: &'a PropertyStore,
}

impl<'a> PathFinder<'a> {
    pub fn new(store: &'a PropertyStore) -> Self {
        Self { store }
    }

    /// Shortest path from `start` to `target`.
    ///
    /// Returns `Ok(None)` when the open set drains without reaching the
    /// target: a normal outcome, never a partial path. Out-of-grid
    /// endpoints are rejected up front. Neighbors are 4-connected and must
    /// be walkable per the store; ties on f-score break toward lower y,
    /// then lower x. `start == target` yields the one-cell degenerate
    /// path, and the start cell's own walkability is not checked.
    pub fn find_path(&self, start: Cell, target: Cell) -> Result<Option<Path>, OutOfBounds> {
        self.check(start)?;
        self.check(target)?;

        if start == target {
            return Ok(Some(vec![start]));
        }

        let mut open = BinaryHeap::new();
        let mut closed: HashSet<Cell> = HashSet::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();
        let mut g_score: HashMap<Cell, f64> = HashMap::new();

        g_score.insert(start, 0.0);
        open.push(OpenNode {
            cell: start,
            g: 0.0,
            f: start.distance(target),
        });

        while let Some(current) = open.pop() {
            if !closed.insert(current.cell) {
                continue; // stale heap entry
            }
            if current.cell == target {
                return Ok(Some(reconstruct(&came_from, target)));
            }

            for neighbor in current.cell.neighbors4() {
                if !self.store.in_bounds(neighbor)
                    || closed.contains(&neighbor)
                    || !self.store.get(neighbor, TileFlag::Walkable)
                {
                    continue;
                }

                let tentative = current.g + current.cell.distance(neighbor);
                let best = g_score.get(&neighbor).copied().unwrap_or(f64::INFINITY);
                if tentative < best {
                    came_from.insert(neighbor, current.cell);
                    g_score.insert(neighbor, tentative);
                    open.push(OpenNode {
                        cell: neighbor,
                        g: tentative,
                        f: tentative + neighbor.distance(target),
                    });
                }
            }
        }

        Ok(None)
    }

    fn check(&self, cell: Cell) -> Result<(), OutOfBounds> {
        if self.store.in_bounds(cell) {
            Ok(())
        } else {
            Err(OutOfBounds {
                x: cell.x,
                y: cell.y,
                width: self.store.width(),
                height: self.store.height(),
            })
        }
    }
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, target: Cell) -> Path {
    let mut path = vec![target];
    let mut cell = target;
    while let Some(&prev) = came_from.get(&cell) {
        path.push(prev);
        cell = prev;
    }
    path.reverse();
    path
}
