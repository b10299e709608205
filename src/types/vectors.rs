use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};
use std::ops::BitXor;

/// A 3-dimensional vector type, with double precision components.
///
/// `*` between two vectors is the scalar (dot) product, and `^` is the
/// vector (cross) product:
///
/// ```
/// # use envgraph::Vector3D;
/// let u = Vector3D::new(1.0, 0.0, 0.0);
/// let v = Vector3D::new(0.0, 1.0, 0.0);
///
/// assert_eq!(u * v, 0.0);
/// assert_eq!(u ^ v, Vector3D::new(0.0, 0.0, 1.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    /// Create a new vector with the given components
    pub fn new(x: f64, y: f64, z: f64) -> Vector3D {
        Vector3D { x, y, z }
    }

    /// Create the null vector
    pub fn zero() -> Vector3D {
        Vector3D::new(0.0, 0.0, 0.0)
    }

    /// Get the squared euclidean norm of this vector
    pub fn norm2(&self) -> f64 {
        self * self
    }

    /// Get the euclidean norm of this vector
    pub fn norm(&self) -> f64 {
        f64::sqrt(self.norm2())
    }

    /// Get a normalized copy of this vector, pointing in the same direction
    pub fn normalized(&self) -> Vector3D {
        self / self.norm()
    }
}

impl From<[f64; 3]> for Vector3D {
    fn from(array: [f64; 3]) -> Vector3D {
        Vector3D::new(array[0], array[1], array[2])
    }
}

impl Index<usize> for Vector3D {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("index out of bounds: a Vector3D contains 3 values"),
        }
    }
}

impl IndexMut<usize> for Vector3D {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("index out of bounds: a Vector3D contains 3 values"),
        }
    }
}

/// Implement binary operators for all combinations of values and references
macro_rules! impl_binary_op {
    ($Op:ident, $op:ident, $Lhs:ty, $Rhs:ty, $Output:ty, $lhs:ident, $rhs:ident, $res:expr) => {
        impl $Op<$Rhs> for $Lhs {
            type Output = $Output;
            #[inline]
            fn $op(self, $rhs: $Rhs) -> $Output {
                let $lhs = self;
                $res
            }
        }

        impl $Op<$Rhs> for &$Lhs {
            type Output = $Output;
            #[inline]
            fn $op(self, $rhs: $Rhs) -> $Output {
                let $lhs = *self;
                $res
            }
        }

        impl $Op<&$Rhs> for $Lhs {
            type Output = $Output;
            #[inline]
            fn $op(self, $rhs: &$Rhs) -> $Output {
                let ($lhs, $rhs) = (self, *$rhs);
                $res
            }
        }

        impl $Op<&$Rhs> for &$Lhs {
            type Output = $Output;
            #[inline]
            fn $op(self, $rhs: &$Rhs) -> $Output {
                let ($lhs, $rhs) = (*self, *$rhs);
                $res
            }
        }
    };
}

impl_binary_op!(Add, add, Vector3D, Vector3D, Vector3D, u, v,
    Vector3D::new(u.x + v.x, u.y + v.y, u.z + v.z)
);

impl_binary_op!(Sub, sub, Vector3D, Vector3D, Vector3D, u, v,
    Vector3D::new(u.x - v.x, u.y - v.y, u.z - v.z)
);

// scalar (dot) product
impl_binary_op!(Mul, mul, Vector3D, Vector3D, f64, u, v,
    u.x * v.x + u.y * v.y + u.z * v.z
);

// vector (cross) product
impl_binary_op!(BitXor, bitxor, Vector3D, Vector3D, Vector3D, u, v,
    Vector3D::new(
        u.y * v.z - u.z * v.y,
        u.z * v.x - u.x * v.z,
        u.x * v.y - u.y * v.x,
    )
);

impl_binary_op!(Mul, mul, Vector3D, f64, Vector3D, u, s,
    Vector3D::new(u.x * s, u.y * s, u.z * s)
);

impl_binary_op!(Mul, mul, f64, Vector3D, Vector3D, s, u,
    Vector3D::new(s * u.x, s * u.y, s * u.z)
);

impl_binary_op!(Div, div, Vector3D, f64, Vector3D, u, s,
    Vector3D::new(u.x / s, u.y / s, u.z / s)
);

impl Neg for Vector3D {
    type Output = Vector3D;
    #[inline]
    fn neg(self) -> Vector3D {
        Vector3D::new(-self.x, -self.y, -self.z)
    }
}

impl Neg for &Vector3D {
    type Output = Vector3D;
    #[inline]
    fn neg(self) -> Vector3D {
        Vector3D::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign<Vector3D> for Vector3D {
    #[inline]
    fn add_assign(&mut self, other: Vector3D) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl SubAssign<Vector3D> for Vector3D {
    #[inline]
    fn sub_assign(&mut self, other: Vector3D) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}
