//! 3D vector type used by all other modules.

mod vectors;
pub use self::vectors::Vector3D;
