use log::warn;
use ndarray::Array3;
use rayon::prelude::*;

use crate::{Error, SimulationBox, Vector3D};
use super::{debug_check_adjacency, AdjacencyList};

/// Maximal number of cells, we need to use this to prevent having too many
/// cells with a small box and a large cutoff
const MAX_NUMBER_OF_CELLS: f64 = 1e5;

/// Warn about distinct particles closer than this distance, they are usually
/// a sign of a bad input configuration
const CLOSE_PARTICLES_DISTANCE: f64 = 1e-3;

/// The cell list sorts particles inside bins/cells sized to a spherical
/// cutoff, so that all neighbors of a particle below the cutoff are found in
/// the 3x3x3 block of cells around its own.
///
/// Cell coordinates wrap around on periodic axes of the box; on non-periodic
/// axes, cells outside of the grid simply do not exist and are skipped during
/// the search.
#[derive(Debug, Clone)]
pub struct CellList {
    /// number of cells in each direction
    n_cells: [usize; 3],
    /// the cells themselves, stored in a flat array with 3D indexing
    cells: Array3<Vec<usize>>,
    /// box defining the extent of the grid and its per-axis periodicity
    bounds: SimulationBox,
}

impl CellList {
    /// Create a new `CellList` for the given box and cutoff, determining all
    /// required parameters.
    ///
    /// The cell edge is guaranteed to be at least `cutoff` along every axis,
    /// so a search never needs to look further than the adjacent cells.
    pub fn new(bounds: SimulationBox, cutoff: f64) -> CellList {
        let lengths = bounds.lengths();

        let mut n_cells = [
            f64::clamp(f64::trunc(lengths[0] / cutoff), 1.0, f64::INFINITY),
            f64::clamp(f64::trunc(lengths[1] / cutoff), 1.0, f64::INFINITY),
            f64::clamp(f64::trunc(lengths[2] / cutoff), 1.0, f64::INFINITY),
        ];

        // limit memory consumption by ensuring we have less than
        // `MAX_NUMBER_OF_CELLS` cells in total, keeping the number of cells
        // in each direction roughly proportional
        let n_cells_total = n_cells[0] * n_cells[1] * n_cells[2];
        if n_cells_total > MAX_NUMBER_OF_CELLS {
            let factor = f64::cbrt(MAX_NUMBER_OF_CELLS / n_cells_total);
            for xyz in 0..3 {
                n_cells[xyz] = f64::max(f64::trunc(factor * n_cells[xyz]), 1.0);
            }
        }

        let n_cells = [
            n_cells[0] as usize,
            n_cells[1] as usize,
            n_cells[2] as usize,
        ];

        CellList {
            n_cells: n_cells,
            cells: Array3::from_elem(n_cells, Default::default()),
            bounds: bounds,
        }
    }

    /// Add a single particle to the cell list at the given `position`. The
    /// particle is uniquely identified by its `index`.
    pub fn add_particle(&mut self, index: usize, position: Vector3D) {
        let cell = self.cell_index(position);
        self.cells[cell].push(index);
    }

    /// Get the (3D) index of the cell containing the given `position`.
    ///
    /// Positions are wrapped inside the box on periodic axes; on non-periodic
    /// axes, out-of-box positions are assigned to the boundary cell.
    pub fn cell_index(&self, position: Vector3D) -> [usize; 3] {
        let mut wrapped = position;
        self.bounds.wrap_vector(&mut wrapped);

        let lengths = self.bounds.lengths();
        let mut index = [0; 3];
        for xyz in 0..3 {
            let cell = f64::floor(wrapped[xyz] / lengths[xyz] * self.n_cells[xyz] as f64);
            // the clamp deals both with non-periodic out-of-box positions and
            // with floating point rounding at the upper box face
            index[xyz] = f64::clamp(cell, 0.0, (self.n_cells[xyz] - 1) as f64) as usize;
        }
        return index;
    }

    /// Get the distinct cell indices to search along `axis` around the cell
    /// at `index`, i.e. the 3-wide window around `index`.
    ///
    /// On a periodic axis the window wraps around the grid; on a non-periodic
    /// axis, out-of-range cells are skipped. Either way, when the grid is
    /// less than 3 cells wide the window collapses without visiting the same
    /// cell twice.
    fn search_window(&self, axis: usize, index: usize) -> Vec<usize> {
        let n = self.n_cells[axis] as i64;
        let periodic = self.bounds.periodic()[axis];

        let mut window = Vec::with_capacity(3);
        for delta in -1..=1_i64 {
            let neighbor = index as i64 + delta;
            let neighbor = if periodic {
                neighbor.rem_euclid(n) as usize
            } else if neighbor < 0 || neighbor >= n {
                continue;
            } else {
                neighbor as usize
            };

            if !window.contains(&neighbor) {
                window.push(neighbor);
            }
        }
        return window;
    }

    /// Iterate over all particles in the cells surrounding (and including)
    /// the cell at `index`, calling `callback` with each particle index.
    pub fn for_each_candidate(&self, index: [usize; 3], mut callback: impl FnMut(usize)) {
        for &x in &self.search_window(0, index[0]) {
            for &y in &self.search_window(1, index[1]) {
                for &z in &self.search_window(2, index[2]) {
                    for &candidate in &self.cells[[x, y, z]] {
                        callback(candidate);
                    }
                }
            }
        }
    }
}

/// Compute the adjacency list of the given `positions` using a spherical
/// distance cutoff: two distinct particles are neighbors if their
/// minimum-image distance is smaller than or equal to `cutoff`.
///
/// The output is symmetric, and each entry is sorted in increasing order. A
/// particle is never a neighbor of itself, even through one of its own
/// periodic images.
#[time_graph::instrument(name = "CellNeighbors")]
pub fn cell_neighbors(
    positions: &[Vector3D],
    cell: &SimulationBox,
    cutoff: f64,
) -> Result<AdjacencyList, Error> {
    if cutoff <= 0.0 || !cutoff.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "cutoff must be positive and finite, got {}", cutoff
        )));
    }

    let mut cell_list = CellList::new(*cell, cutoff);
    for (index, &position) in positions.iter().enumerate() {
        cell_list.add_particle(index, position);
    }

    let cutoff2 = cutoff * cutoff;
    let close2 = CLOSE_PARTICLES_DISTANCE * CLOSE_PARTICLES_DISTANCE;

    // each particle only writes its own entry, so the loop is a plain
    // parallel map over the particle index
    let adjacency = (0..positions.len())
        .into_par_iter()
        .map(|i| {
            let mut neighbors = Vec::new();
            cell_list.for_each_candidate(cell_list.cell_index(positions[i]), |j| {
                if i == j {
                    return;
                }

                let distance2 = cell.distance2(positions[i], positions[j]);
                if distance2 <= cutoff2 {
                    if distance2 < close2 {
                        warn!(
                            "particles {} and {} are very close to one another ({} A)",
                            i, j, distance2.sqrt()
                        );
                    }
                    neighbors.push(j);
                }
            });

            // the same candidate can show up from more than one cell when the
            // grid is narrow, the output is a set
            neighbors.sort_unstable();
            neighbors.dedup();
            return neighbors;
        })
        .collect::<Vec<_>>();

    debug_check_adjacency(&adjacency, positions.len());
    return Ok(adjacency);
}
