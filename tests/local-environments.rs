use envgraph::{build_graphs, cell_neighbors, voro_neighbors};
use envgraph::{NeighborMethod, SimulationBox, Vector3D};

/// 8 particles on the corners of a cube of edge `spacing`, inside a fully
/// periodic box of edge `2 * spacing`
fn corner_particles(spacing: f64) -> (Vec<Vector3D>, SimulationBox) {
    let mut positions = Vec::new();
    for x in 0..2 {
        for y in 0..2 {
            for z in 0..2 {
                positions.push(Vector3D::new(
                    x as f64 * spacing,
                    y as f64 * spacing,
                    z as f64 * spacing,
                ));
            }
        }
    }
    let cell = SimulationBox::cubic(2.0 * spacing).unwrap();
    return (positions, cell);
}

#[test]
fn periodic_cube_corners() {
    let (positions, cell) = corner_particles(1.5);

    // under periodic wraparound, the +x and -x images of a corner are the
    // same particle, so each corner has 3 distinct edge-adjacent neighbors
    let adjacency = cell_neighbors(&positions, &cell, 1.5).unwrap();
    for neighbors in &adjacency {
        assert_eq!(neighbors.len(), 3);
    }

    let graphs = build_graphs(&adjacency, 1).unwrap();
    for (i, graph) in graphs.iter().enumerate() {
        // the root plus its 3 neighbors
        assert_eq!(graph.node_count(), 4);
        // the adjacency is symmetric and each pair is a single undirected
        // edge: 3 root-neighbor edges, and none between the neighbors (they
        // sit across face diagonals, not edges)
        assert_eq!(graph.edge_count(), 3);

        assert_eq!(graph.root(), i);
        assert_eq!(graph.shell_of(i), Some(0));
        for &j in &adjacency[i] {
            assert_eq!(graph.shell_of(j), Some(1));
        }
    }
}

#[test]
fn both_finders_agree_on_the_corners() {
    let (positions, cell) = corner_particles(1.5);

    // the Voronoi cells of this configuration are cubes: geometric
    // face-adjacency finds the same 3 neighbors as the nearest neighbor
    // cutoff does
    let from_cutoff = cell_neighbors(&positions, &cell, 1.5).unwrap();
    let from_voronoi = voro_neighbors(&positions, &cell).unwrap();
    assert_eq!(from_cutoff, from_voronoi);
}

#[test]
fn graphs_differ_only_through_the_finder() {
    // a configuration where the two finders disagree: an off-center particle
    // in a stretched pair still shares a Voronoi face with its distant
    // partner, but a short cutoff does not see it
    let cell = SimulationBox::cubic(10.0).unwrap();
    let positions = [
        Vector3D::new(1.0, 5.0, 5.0),
        Vector3D::new(2.5, 5.0, 5.0),
        Vector3D::new(7.0, 5.0, 5.0),
    ];

    let short = NeighborMethod::Cell { cutoff: 2.0 };
    let geometric = NeighborMethod::Voronoi;

    let cutoff_adjacency = short.neighbors(&positions, &cell).unwrap();
    assert_eq!(cutoff_adjacency, vec![vec![1], vec![0], vec![]]);

    let voronoi_adjacency = geometric.neighbors(&positions, &cell).unwrap();
    assert_eq!(voronoi_adjacency, vec![vec![1, 2], vec![0, 2], vec![0, 1]]);

    // same graph assembly, different neighborhoods: the difference between
    // the outputs is attributable to the neighbor finding alone
    let from_cutoff = build_graphs(&cutoff_adjacency, 1).unwrap();
    let from_voronoi = build_graphs(&voronoi_adjacency, 1).unwrap();

    assert_eq!(from_cutoff[2].node_count(), 1);
    assert_eq!(from_voronoi[2].node_count(), 3);
}

#[test]
fn shell_expansion_is_monotonic_end_to_end() {
    let cell = SimulationBox::cubic(4.0).unwrap();
    let mut positions = Vec::new();
    for x in 0..4 {
        for y in 0..4 {
            for z in 0..4 {
                positions.push(Vector3D::new(x as f64, y as f64, z as f64));
            }
        }
    }

    let adjacency = voro_neighbors(&positions, &cell).unwrap();

    let mut previous = build_graphs(&adjacency, 0).unwrap();
    for n_shells in 1..4 {
        let current = build_graphs(&adjacency, n_shells).unwrap();
        for (smaller, larger) in previous.iter().zip(&current) {
            assert!(smaller.is_subgraph_of(larger));
        }
        previous = current;
    }

    // shells saturate once the whole (periodic) lattice is covered
    let saturated = build_graphs(&adjacency, 64).unwrap();
    for graph in &saturated {
        assert_eq!(graph.node_count(), positions.len());
    }
}
