//! Expansion of an adjacency list into per-particle local-environment
//! graphs.

use std::collections::VecDeque;

use petgraph::graph::{NodeIndex, UnGraph};
use rayon::prelude::*;

use crate::Error;
use crate::neighbors::AdjacencyList;

/// A node of a local-environment graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentNode {
    /// index of the corresponding particle in the input particle set
    pub particle: usize,
    /// hop distance from the root particle of the graph
    pub shell: u32,
}

/// The local environment of a single particle: the subgraph of the adjacency
/// relation induced by all particles within `n_shells` hops of the root.
///
/// Nodes carry the particle index and its hop distance from the root (used
/// downstream e.g. for canonical ordering or coloring); edges are the
/// adjacency relations between two included particles, stored once each as
/// undirected edges. Each graph owns its storage, nothing is shared between
/// the graphs of overlapping environments.
#[derive(Debug, Clone)]
pub struct EnvironmentGraph {
    root: usize,
    graph: UnGraph<EnvironmentNode, ()>,
}

impl EnvironmentGraph {
    /// Get the index of the root particle of this environment
    pub fn root(&self) -> usize {
        self.root
    }

    /// Get the underlying graph
    pub fn graph(&self) -> &UnGraph<EnvironmentNode, ()> {
        &self.graph
    }

    /// Get the number of nodes in this environment
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of (undirected) edges in this environment
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get the hop distance from the root to the given particle, or `None`
    /// if the particle is not part of this environment
    pub fn shell_of(&self, particle: usize) -> Option<u32> {
        self.graph
            .node_weights()
            .find(|node| node.particle == particle)
            .map(|node| node.shell)
    }

    /// Check whether this environment is a subgraph (nodes and edges) of
    /// `other`, matching nodes by particle index
    pub fn is_subgraph_of(&self, other: &EnvironmentGraph) -> bool {
        let particle_of = |graph: &UnGraph<EnvironmentNode, ()>, node: NodeIndex| {
            graph[node].particle
        };

        for node in self.graph.node_indices() {
            if other.shell_of(particle_of(&self.graph, node)).is_none() {
                return false;
            }
        }

        for edge in self.graph.edge_indices() {
            let (a, b) = self.graph.edge_endpoints(edge).expect("edge without endpoints");
            let a = particle_of(&self.graph, a);
            let b = particle_of(&self.graph, b);

            let found = other.graph.edge_indices().any(|other_edge| {
                let (c, d) = other.graph.edge_endpoints(other_edge).expect("edge without endpoints");
                let c = particle_of(&other.graph, c);
                let d = particle_of(&other.graph, d);
                (a, b) == (c, d) || (a, b) == (d, c)
            });

            if !found {
                return false;
            }
        }

        return true;
    }
}

/// Build the local-environment graph of particle `root`, by breadth-first
/// expansion of the adjacency list up to `n_shells` hops.
fn environment_graph(
    root: usize,
    adjacency: &AdjacencyList,
    n_shells: u32,
) -> EnvironmentGraph {
    let mut graph = UnGraph::new_undirected();

    // node_of[particle] is the graph node for this particle, if visited
    let mut node_of: Vec<Option<NodeIndex>> = vec![None; adjacency.len()];

    // standard BFS: nodes are visited in increasing hop distance, and the
    // neighbors of a node in the order of its adjacency entry, making the
    // node insertion order reproducible for a given adjacency list
    let mut queue = VecDeque::new();
    node_of[root] = Some(graph.add_node(EnvironmentNode { particle: root, shell: 0 }));
    queue.push_back((root, 0));

    while let Some((particle, shell)) = queue.pop_front() {
        if shell == n_shells {
            continue;
        }

        for &neighbor in &adjacency[particle] {
            if node_of[neighbor].is_none() {
                node_of[neighbor] = Some(graph.add_node(EnvironmentNode {
                    particle: neighbor,
                    shell: shell + 1,
                }));
                queue.push_back((neighbor, shell + 1));
            }
        }
    }

    // add every adjacency relation between two visited particles as a single
    // undirected edge
    for (particle, neighbors) in adjacency.iter().enumerate() {
        let Some(node) = node_of[particle] else { continue };
        for &neighbor in neighbors {
            let Some(neighbor_node) = node_of[neighbor] else { continue };
            // both directions of a symmetric adjacency map to the same edge
            if particle < neighbor || !adjacency[neighbor].contains(&particle) {
                graph.add_edge(node, neighbor_node, ());
            }
        }
    }

    EnvironmentGraph {
        root: root,
        graph: graph,
    }
}

/// Expand an adjacency list into one local-environment graph per particle,
/// index-aligned with the input: entry `i` of the output is the environment
/// of particle `i`, containing every particle within `n_shells` hops of it.
///
/// With `n_shells = 0` every graph is a single isolated node (the root
/// particle itself). The graphs for `n_shells = k + 1` are supersets (nodes
/// and edges) of the graphs for `n_shells = k`.
///
/// The adjacency list is used as given: entries are walked in order during
/// the expansion, so two lists with the same neighbor sets in different
/// orders produce the same graphs up to node insertion order. Every index in
/// the list must be a valid particle index, and no entry may contain the
/// entry own index, otherwise an [`Error::InvalidParameter`] is returned and
/// no output is produced.
#[time_graph::instrument(name = "buildGraphs")]
pub fn build_graphs(
    adjacency: &AdjacencyList,
    n_shells: u32,
) -> Result<Vec<EnvironmentGraph>, Error> {
    let size = adjacency.len();
    for (i, neighbors) in adjacency.iter().enumerate() {
        for &j in neighbors {
            if j >= size {
                return Err(Error::InvalidParameter(format!(
                    "adjacency entry {} contains index {}, but there are only \
                    {} particles", i, j, size
                )));
            }
            if j == i {
                return Err(Error::InvalidParameter(format!(
                    "adjacency entry {} contains the particle itself", i
                )));
            }
        }
    }

    // each graph only depends on its own root, this is a parallel map
    let graphs = (0..size)
        .into_par_iter()
        .map(|root| environment_graph(root, adjacency, n_shells))
        .collect();

    return Ok(graphs);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// adjacency of a periodic chain of `n` particles
    fn chain(n: usize) -> AdjacencyList {
        (0..n).map(|i| {
            let mut neighbors = vec![(i + n - 1) % n, (i + 1) % n];
            neighbors.sort_unstable();
            neighbors.dedup();
            neighbors
        }).collect()
    }

    #[test]
    fn zero_shells() {
        let adjacency = chain(5);
        let graphs = build_graphs(&adjacency, 0).unwrap();

        assert_eq!(graphs.len(), 5);
        for (i, graph) in graphs.iter().enumerate() {
            assert_eq!(graph.root(), i);
            assert_eq!(graph.node_count(), 1);
            assert_eq!(graph.edge_count(), 0);
            assert_eq!(graph.shell_of(i), Some(0));
        }
    }

    #[test]
    fn one_shell_chain() {
        let graphs = build_graphs(&chain(6), 1).unwrap();

        for (i, graph) in graphs.iter().enumerate() {
            // the root and its two neighbors, with only the root-neighbor
            // edges: the two neighbors are not adjacent to each other
            assert_eq!(graph.node_count(), 3);
            assert_eq!(graph.edge_count(), 2);
            assert_eq!(graph.shell_of(i), Some(0));
            assert_eq!(graph.shell_of((i + 1) % 6), Some(1));
            assert_eq!(graph.shell_of((i + 5) % 6), Some(1));
        }
    }

    #[test]
    fn shells_tag_hop_distance() {
        let graphs = build_graphs(&chain(7), 2).unwrap();

        let graph = &graphs[0];
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.shell_of(0), Some(0));
        assert_eq!(graph.shell_of(1), Some(1));
        assert_eq!(graph.shell_of(6), Some(1));
        assert_eq!(graph.shell_of(2), Some(2));
        assert_eq!(graph.shell_of(5), Some(2));
        assert_eq!(graph.shell_of(3), None);
    }

    #[test]
    fn saturated_expansion() {
        // once every particle is reached, more shells change nothing
        let adjacency = chain(6);
        let n = build_graphs(&adjacency, 3).unwrap();
        let more = build_graphs(&adjacency, 100).unwrap();

        for (graph, larger) in n.iter().zip(&more) {
            assert_eq!(graph.node_count(), 6);
            assert_eq!(graph.edge_count(), 6);
            assert_eq!(larger.node_count(), 6);
            assert_eq!(larger.edge_count(), 6);
        }
    }

    #[test]
    fn monotonic_expansion() {
        let adjacency = chain(9);
        let mut previous = build_graphs(&adjacency, 0).unwrap();

        for n_shells in 1..5 {
            let current = build_graphs(&adjacency, n_shells).unwrap();
            for (smaller, larger) in previous.iter().zip(&current) {
                assert!(smaller.is_subgraph_of(larger));
            }
            previous = current;
        }
    }

    #[test]
    fn asymmetric_adjacency() {
        // an asymmetric list is walked as given: 0 reaches 1, but 1 does not
        // reach 0. The 0 -> 1 relation still becomes a single edge.
        let adjacency = vec![vec![1], vec![], vec![1]];

        let graphs = build_graphs(&adjacency, 1).unwrap();
        assert_eq!(graphs[0].node_count(), 2);
        assert_eq!(graphs[0].edge_count(), 1);

        assert_eq!(graphs[1].node_count(), 1);
        assert_eq!(graphs[1].edge_count(), 0);

        assert_eq!(graphs[2].node_count(), 2);
        assert_eq!(graphs[2].edge_count(), 1);
    }

    #[test]
    fn invalid_adjacency() {
        // out of bounds index
        let adjacency = vec![vec![1], vec![4]];
        assert!(matches!(
            build_graphs(&adjacency, 1),
            Err(Error::InvalidParameter(_))
        ));

        // self loop
        let adjacency = vec![vec![0], vec![0]];
        assert!(matches!(
            build_graphs(&adjacency, 1),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn graphs_are_independent() {
        // mutating one graph must not be observable in any other
        let adjacency = chain(4);
        let mut graphs = build_graphs(&adjacency, 2).unwrap();

        let reference = graphs[1].clone();
        graphs[0].graph.clear();

        assert_eq!(graphs[1].node_count(), reference.node_count());
        assert_eq!(graphs[1].edge_count(), reference.edge_count());
    }
}
