//! The `SimulationBox` type represents the enclosing box of a particle
//! configuration, with periodic boundary conditions enabled independently on
//! each axis.
use crate::{Error, Vector3D};

/// An axis-aligned orthorhombic simulation box, with independent periodicity
/// flags on each axis.
///
/// A periodic axis wraps both coordinates and displacements (minimum image
/// convention); a non-periodic axis behaves as open space bounded by the box
/// faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    /// Edge lengths of the box, all strictly positive
    lengths: Vector3D,
    /// Periodicity of each axis
    periodic: [bool; 3],
}

impl SimulationBox {
    /// Create a new `SimulationBox` with the given edge `lengths` and
    /// per-axis periodicity.
    pub fn new(lengths: Vector3D, periodic: [bool; 3]) -> Result<SimulationBox, Error> {
        for xyz in 0..3 {
            if lengths[xyz] <= 0.0 || !lengths[xyz].is_finite() {
                return Err(Error::InvalidParameter(format!(
                    "box lengths must be positive and finite, got {} for axis {}",
                    lengths[xyz], xyz
                )));
            }
        }

        Ok(SimulationBox {
            lengths: lengths,
            periodic: periodic,
        })
    }

    /// Create a fully periodic cubic box with the given edge `length`.
    pub fn cubic(length: f64) -> Result<SimulationBox, Error> {
        SimulationBox::new(Vector3D::new(length, length, length), [true; 3])
    }

    /// Get the edge lengths of this box
    pub fn lengths(&self) -> Vector3D {
        self.lengths
    }

    /// Get the periodicity of each axis
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Check whether all three axes are periodic
    pub fn is_fully_periodic(&self) -> bool {
        self.periodic == [true; 3]
    }

    /// Wrap a position inside the box. Coordinates along periodic axes end up
    /// in `[0, L)`; coordinates along non-periodic axes are left unchanged.
    pub fn wrap_vector(&self, vector: &mut Vector3D) {
        for xyz in 0..3 {
            if self.periodic[xyz] {
                let length = self.lengths[xyz];
                vector[xyz] -= f64::floor(vector[xyz] / length) * length;
            }
        }
    }

    /// Transform `vector` into its minimum image: along periodic axes the
    /// component is wrapped into `(-L/2, L/2]`, along non-periodic axes it is
    /// left unchanged.
    pub fn vector_image(&self, vector: &mut Vector3D) {
        for xyz in 0..3 {
            if self.periodic[xyz] {
                let length = self.lengths[xyz];
                // round half down, so that a component at exactly +L/2 stays
                // at +L/2 instead of flipping to -L/2
                vector[xyz] -= f64::ceil(vector[xyz] / length - 0.5) * length;
            }
        }
    }

    /// Squared distance between the points `u` and `v`, using the minimum
    /// image convention on periodic axes
    pub fn distance2(&self, u: Vector3D, v: Vector3D) -> f64 {
        let mut d = v - u;
        self.vector_image(&mut d);
        return d.norm2();
    }

    /// Distance between the points `u` and `v`, using the minimum image
    /// convention on periodic axes
    pub fn distance(&self, u: Vector3D, v: Vector3D) -> f64 {
        return f64::sqrt(self.distance2(u, v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_lengths() {
        let result = SimulationBox::new(Vector3D::new(3.0, 0.0, 5.0), [true; 3]);
        assert!(result.is_err());

        let result = SimulationBox::new(Vector3D::new(3.0, -1.0, 5.0), [true; 3]);
        assert!(result.is_err());

        let result = SimulationBox::new(Vector3D::new(3.0, f64::NAN, 5.0), [true; 3]);
        assert!(result.is_err());

        let result = SimulationBox::cubic(f64::INFINITY);
        assert!(result.is_err());
    }

    #[test]
    fn wrap_vector() {
        let cell = SimulationBox::cubic(10.0).unwrap();
        let mut v = Vector3D::new(9.0, 18.0, -6.0);
        cell.wrap_vector(&mut v);
        assert_eq!(v, Vector3D::new(9.0, 8.0, 4.0));

        // non-periodic axes are never wrapped
        let cell = SimulationBox::new(
            Vector3D::new(10.0, 10.0, 10.0), [true, false, true]
        ).unwrap();
        let mut v = Vector3D::new(9.0, 18.0, -6.0);
        cell.wrap_vector(&mut v);
        assert_eq!(v, Vector3D::new(9.0, 18.0, 4.0));
    }

    #[test]
    fn vector_image() {
        let cell = SimulationBox::cubic(10.0).unwrap();
        let mut v = Vector3D::new(9.0, 18.0, -6.0);
        cell.vector_image(&mut v);
        assert_eq!(v, Vector3D::new(-1.0, -2.0, 4.0));

        let cell = SimulationBox::new(
            Vector3D::new(10.0, 10.0, 10.0), [false, true, false]
        ).unwrap();
        let mut v = Vector3D::new(9.0, 18.0, -6.0);
        cell.vector_image(&mut v);
        assert_eq!(v, Vector3D::new(9.0, -2.0, -6.0));
    }

    #[test]
    fn distances() {
        let cell = SimulationBox::cubic(10.0).unwrap();
        let u = Vector3D::new(1.0, 1.0, 1.0);
        let v = Vector3D::new(9.0, 1.0, 1.0);
        assert_eq!(cell.distance(u, v), 2.0);

        let open = SimulationBox::new(
            Vector3D::new(10.0, 10.0, 10.0), [false; 3]
        ).unwrap();
        assert_eq!(open.distance(u, v), 8.0);
    }
}
