use rayon::prelude::*;

use crate::{Error, SimulationBox, Vector3D};
use super::{debug_check_adjacency, AdjacencyList};

/// Where does a face of a Voronoi cell come from?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaceSource {
    /// Box wall on a non-periodic axis, or the plane to one of the central
    /// particle own periodic images
    Boundary,
    /// Perpendicular bisector plane to the particle at this index (or one of
    /// its periodic images)
    Neighbor(usize),
}

/// A single polygonal face of a Voronoi cell. The cell interior is the side
/// of the plane with `normal . x <= offset`.
#[derive(Debug, Clone)]
struct Face {
    source: FaceSource,
    normal: Vector3D,
    offset: f64,
    /// vertices of the face, as an ordered loop
    vertices: Vec<Vector3D>,
}

/// Outcome of clipping a cell by one half space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clip {
    /// the plane does not reach the cell
    Unchanged,
    /// the plane cut the cell, creating a new face
    Clipped,
    /// nothing of the cell is left on the inner side of the plane
    Emptied,
}

/// Voronoi cell of a single particle, in coordinates relative to that
/// particle, represented as a convex polyhedron that starts as the full box
/// and shrinks as bisector planes are applied.
#[derive(Debug, Clone)]
struct VoronoiCell {
    faces: Vec<Face>,
    /// absolute tolerance used to decide that a plane is tangent to the cell
    /// and to merge coincident cut vertices
    tolerance: f64,
}

impl VoronoiCell {
    /// Create the axis-aligned cuboid spanning `lo` to `hi` on each axis,
    /// with all six faces marked as `Boundary`.
    fn cuboid(lo: Vector3D, hi: Vector3D, tolerance: f64) -> VoronoiCell {
        // corner i has the high coordinate on axis a if bit a of i is set
        let corners: Vec<Vector3D> = (0..8_usize).map(|i| Vector3D::new(
            if i & 1 == 0 { lo.x } else { hi.x },
            if i & 2 == 0 { lo.y } else { hi.y },
            if i & 4 == 0 { lo.z } else { hi.z },
        )).collect();

        let face = |normal: Vector3D, offset: f64, loop_: [usize; 4]| Face {
            source: FaceSource::Boundary,
            normal: normal,
            offset: offset,
            vertices: loop_.iter().map(|&i| corners[i]).collect(),
        };

        VoronoiCell {
            faces: vec![
                face(Vector3D::new(1.0, 0.0, 0.0), hi.x, [1, 3, 7, 5]),
                face(Vector3D::new(-1.0, 0.0, 0.0), -lo.x, [0, 4, 6, 2]),
                face(Vector3D::new(0.0, 1.0, 0.0), hi.y, [2, 6, 7, 3]),
                face(Vector3D::new(0.0, -1.0, 0.0), -lo.y, [0, 1, 5, 4]),
                face(Vector3D::new(0.0, 0.0, 1.0), hi.z, [4, 5, 7, 6]),
                face(Vector3D::new(0.0, 0.0, -1.0), -lo.z, [0, 2, 3, 1]),
            ],
            tolerance: tolerance,
        }
    }

    /// Squared distance from the particle to the farthest cell vertex. A
    /// bisector plane to a point further than twice this distance can not
    /// touch the cell.
    fn max_radius2(&self) -> f64 {
        let mut max = 0.0;
        for face in &self.faces {
            for vertex in &face.vertices {
                let r2 = vertex.norm2();
                if r2 > max {
                    max = r2;
                }
            }
        }
        return max;
    }

    /// Clip this cell with the half space `normal . x <= offset`, recording
    /// the newly created face (if any) as coming from `source`.
    fn clip(&mut self, normal: Vector3D, offset: f64, source: FaceSource) -> Clip {
        // tangent or non-intersecting planes leave the cell unchanged; this
        // also drops the zero-area faces a tangent bisector would create
        let mut any_outside = false;
        let mut any_inside = false;
        for face in &self.faces {
            for vertex in &face.vertices {
                let signed = normal * vertex - offset;
                if signed > self.tolerance {
                    any_outside = true;
                } else {
                    any_inside = true;
                }
            }
        }

        if !any_outside {
            return Clip::Unchanged;
        }
        if !any_inside {
            self.faces.clear();
            return Clip::Emptied;
        }

        let mut cut_points = Vec::new();
        self.faces.retain_mut(|face| {
            face.vertices = clip_polygon(&face.vertices, normal, offset, &mut cut_points);
            face.vertices.len() >= 3
        });

        let cap = order_face_loop(cut_points, normal, self.tolerance);
        if cap.len() >= 3 {
            self.faces.push(Face {
                source: source,
                normal: normal,
                offset: offset,
                vertices: cap,
            });
        }

        // a convex polyhedron needs at least 4 faces to enclose a volume
        if self.faces.len() < 4 {
            self.faces.clear();
            return Clip::Emptied;
        }

        return Clip::Clipped;
    }

    /// Indices of the particles owning at least one face of this cell,
    /// sorted and deduplicated (two periodic images of the same particle can
    /// each contribute a face).
    fn neighbors(&self) -> Vec<usize> {
        let mut neighbors = Vec::new();
        for face in &self.faces {
            if let FaceSource::Neighbor(j) = face.source {
                neighbors.push(j);
            }
        }
        neighbors.sort_unstable();
        neighbors.dedup();
        return neighbors;
    }
}

/// Clip a convex polygon loop against `normal . x <= offset`, appending the
/// intersection points created on the plane to `cut_points`.
fn clip_polygon(
    vertices: &[Vector3D],
    normal: Vector3D,
    offset: f64,
    cut_points: &mut Vec<Vector3D>,
) -> Vec<Vector3D> {
    let n = vertices.len();
    let mut kept = Vec::with_capacity(n + 2);

    for k in 0..n {
        let previous = vertices[(k + n - 1) % n];
        let current = vertices[k];
        let signed_prev = normal * previous - offset;
        let signed_cur = normal * current - offset;

        if (signed_cur <= 0.0) != (signed_prev <= 0.0) {
            // the edge crosses the plane, signs differ so the denominator is
            // not zero
            let t = signed_prev / (signed_prev - signed_cur);
            let point = previous + (current - previous) * t;
            kept.push(point);
            cut_points.push(point);
        }

        if signed_cur <= 0.0 {
            kept.push(current);
        }
    }

    return kept;
}

/// Order the cut points created by one clipping plane into a polygon loop:
/// merge coincident points, then sort them by angle around their centroid
/// within the plane. The polyhedron is convex, so the resulting polygon is
/// too and the angular sort is well defined.
fn order_face_loop(points: Vec<Vector3D>, normal: Vector3D, tolerance: f64) -> Vec<Vector3D> {
    let merge2 = tolerance * tolerance;
    let mut unique: Vec<Vector3D> = Vec::with_capacity(points.len() / 2);
    for point in points {
        if !unique.iter().any(|q| (q - point).norm2() < merge2) {
            unique.push(point);
        }
    }

    if unique.len() < 3 {
        return unique;
    }

    let mut centroid = Vector3D::zero();
    for point in &unique {
        centroid += *point;
    }
    centroid = centroid / unique.len() as f64;

    let first_axis = unique[0] - centroid;
    if first_axis.norm2() < merge2 {
        // all points collapse onto the centroid
        return Vec::new();
    }
    let first_axis = first_axis.normalized();
    let second_axis = normal ^ first_axis;

    let mut with_angles: Vec<(f64, Vector3D)> = unique.into_iter().map(|point| {
        let d = point - centroid;
        (f64::atan2(d * second_axis, d * first_axis), point)
    }).collect();
    with_angles.sort_by(|a, b| a.0.total_cmp(&b.0));

    return with_angles.into_iter().map(|(_, point)| point).collect();
}

/// A candidate bisector plane: the displacement `vector` from the central
/// particle to (an image of) particle `index`, at squared distance
/// `distance2`.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance2: f64,
    vector: Vector3D,
    index: usize,
}

/// Compute the Voronoi cell of particle `i` and return the indices of the
/// particles sharing a face with it.
fn particle_neighbors(
    i: usize,
    positions: &[Vector3D],
    cell: &SimulationBox,
    tolerance: f64,
) -> Result<Vec<usize>, Error> {
    let lengths = cell.lengths();
    let periodic = cell.periodic();
    let center = positions[i];

    // initial cell, relative to the particle: periodic axes are bounded at
    // +/- L/2 by the bisectors to the particle own images, non-periodic axes
    // by the box walls
    let mut lo = Vector3D::zero();
    let mut hi = Vector3D::zero();
    for xyz in 0..3 {
        if periodic[xyz] {
            lo[xyz] = -0.5 * lengths[xyz];
            hi[xyz] = 0.5 * lengths[xyz];
        } else {
            lo[xyz] = -center[xyz];
            hi[xyz] = lengths[xyz] - center[xyz];
        }
    }

    let mut voronoi = VoronoiCell::cuboid(lo, hi, tolerance);
    let initial_radius2 = voronoi.max_radius2();
    let reach2 = 4.0 * initial_radius2;

    // how many extra periodic images to consider on each axis so that every
    // plane able to reach the initial cell is included
    let mut n_images = [0_i64; 3];
    for xyz in 0..3 {
        if periodic[xyz] {
            let reach = 2.0 * f64::sqrt(initial_radius2);
            n_images[xyz] = f64::ceil(reach / lengths[xyz] + 0.5) as i64;
        }
    }

    let coincident = tolerance * tolerance;
    let mut candidates = Vec::new();
    for (j, &position) in positions.iter().enumerate() {
        if j == i {
            continue;
        }

        let mut base = position - center;
        cell.vector_image(&mut base);

        for shift_x in -n_images[0]..=n_images[0] {
            for shift_y in -n_images[1]..=n_images[1] {
                for shift_z in -n_images[2]..=n_images[2] {
                    let vector = base + Vector3D::new(
                        shift_x as f64 * lengths[0],
                        shift_y as f64 * lengths[1],
                        shift_z as f64 * lengths[2],
                    );

                    let distance2 = vector.norm2();
                    if distance2 < coincident {
                        return Err(Error::Degenerate(format!(
                            "particles {} and {} are coincident, the tessellation \
                            can not be constructed", i, j
                        )));
                    }

                    if distance2 <= reach2 {
                        candidates.push(Candidate { distance2, vector, index: j });
                    }
                }
            }
        }
    }

    candidates.sort_unstable_by(|a, b| a.distance2.total_cmp(&b.distance2));

    // cut the cell by the bisector planes, closest first; once a candidate is
    // more than twice as far as the farthest remaining vertex, no later plane
    // can cut anything
    let mut max_radius2 = initial_radius2;
    for candidate in candidates {
        if candidate.distance2 > 4.0 * max_radius2 {
            break;
        }

        let distance = f64::sqrt(candidate.distance2);
        let clipped = voronoi.clip(
            candidate.vector / distance,
            0.5 * distance,
            FaceSource::Neighbor(candidate.index),
        );

        match clipped {
            Clip::Unchanged => {}
            Clip::Clipped => max_radius2 = voronoi.max_radius2(),
            Clip::Emptied => {
                return Err(Error::Degenerate(format!(
                    "the Voronoi cell of particle {} is empty, the input \
                    configuration is degenerate", i
                )));
            }
        }
    }

    return Ok(voronoi.neighbors());
}

/// Compute the adjacency list of the given `positions` from the Voronoi
/// tessellation of the box: two particles are neighbors if and only if their
/// Voronoi cells share a face. There is no distance cutoff and no tunable
/// parameter.
///
/// Periodic axes make the tessellation wrap across the corresponding box
/// faces; non-periodic axes bound it with a hard wall at the box face, and
/// every particle must then lie inside the box on these axes. A particle is
/// never a neighbor of its own periodic images.
///
/// The output is symmetric, and each entry is sorted in increasing order.
/// Degenerate configurations (coincident particles, particles outside of a
/// walled box) are reported as [`Error::Degenerate`]; an isolated particle
/// with an empty neighbor entry is a valid result, not an error.
#[time_graph::instrument(name = "VoroNeighbors")]
pub fn voro_neighbors(
    positions: &[Vector3D],
    cell: &SimulationBox,
) -> Result<AdjacencyList, Error> {
    let lengths = cell.lengths();
    let periodic = cell.periodic();

    // fail fast before doing any tessellation work
    for (i, position) in positions.iter().enumerate() {
        for xyz in 0..3 {
            if !periodic[xyz] && (position[xyz] < 0.0 || position[xyz] > lengths[xyz]) {
                return Err(Error::Degenerate(format!(
                    "particle {} is outside of the box on non-periodic axis {} \
                    ({} not in [0, {}])", i, xyz, position[xyz], lengths[xyz]
                )));
            }
        }
    }

    let tolerance = 1e-9 * lengths.norm();

    let mut adjacency = (0..positions.len())
        .into_par_iter()
        .map(|i| particle_neighbors(i, positions, cell, tolerance))
        .collect::<Result<AdjacencyList, Error>>()?;

    // face sharing is symmetric, but nearly degenerate faces can be resolved
    // differently from the two sides; the union keeps the relation symmetric
    let mut missing = Vec::new();
    for (i, neighbors) in adjacency.iter().enumerate() {
        for &j in neighbors {
            if !adjacency[j].contains(&i) {
                missing.push((j, i));
            }
        }
    }
    for (j, i) in missing {
        adjacency[j].push(i);
        adjacency[j].sort_unstable();
    }

    debug_check_adjacency(&adjacency, positions.len());
    return Ok(adjacency);
}
