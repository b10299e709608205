//! Neighbor determination for particle configurations.
//!
//! Both finders in this module consume the same inputs (particle positions
//! and a [`SimulationBox`]) and produce the same output, an [`AdjacencyList`]
//! holding for each particle the set of its neighbors. The graph construction
//! layer in [`crate::graphs`] is agnostic of which finder produced the list.

use crate::{Error, SimulationBox, Vector3D};

mod cell_list;
pub use self::cell_list::{cell_neighbors, CellList};

mod voronoi;
pub use self::voronoi::voro_neighbors;

/// Adjacency list over a particle set: entry `i` contains the indices of the
/// neighbors of particle `i`, sorted in increasing order, without duplicates
/// and without `i` itself.
///
/// Both finders in this crate emit symmetric lists: if `j` is in entry `i`,
/// then `i` is in entry `j`.
pub type AdjacencyList = Vec<Vec<usize>>;

/// Strategy used to determine which particles are neighbors of one another.
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum NeighborMethod {
    /// Two particles are neighbors if their minimum-image distance is below
    /// the given spherical cutoff. Accelerated by a cell list.
    Cell {
        /// Spherical cutoff for the neighbor search
        cutoff: f64,
    },
    /// Two particles are neighbors if their Voronoi cells share a face.
    /// Purely geometric, no tunable parameter.
    Voronoi,
}

impl NeighborMethod {
    /// Compute the adjacency list for the given `positions` inside `cell`,
    /// using this neighbor determination strategy.
    pub fn neighbors(
        &self,
        positions: &[Vector3D],
        cell: &SimulationBox,
    ) -> Result<AdjacencyList, Error> {
        match *self {
            NeighborMethod::Cell { cutoff } => cell_neighbors(positions, cell, cutoff),
            NeighborMethod::Voronoi => voro_neighbors(positions, cell),
        }
    }

    /// Get this strategy and its parameters in JSON format
    pub fn parameters(&self) -> String {
        serde_json::to_string(self).expect("failed to serialize to JSON")
    }
}

/// Check the basic invariants a finder output must uphold: one entry per
/// particle, every index below `size`, no self loops. A violation is a bug in
/// the finder, not a user error.
#[cfg(debug_assertions)]
pub(crate) fn debug_check_adjacency(adjacency: &AdjacencyList, size: usize) {
    debug_assert_eq!(adjacency.len(), size);
    for (i, neighbors) in adjacency.iter().enumerate() {
        for &j in neighbors {
            debug_assert!(j < size, "neighbor index {} out of bounds", j);
            debug_assert!(j != i, "particle {} listed as its own neighbor", i);
        }
    }
}

#[cfg(not(debug_assertions))]
pub(crate) fn debug_check_adjacency(_: &AdjacencyList, _: usize) {}
