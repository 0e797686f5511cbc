//! The [`Point3`] value type.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A point in 3D space.
///
/// Equality and hashing are structural over the exact coordinate bits, so
/// a `Point3` can key a hash set. Construct through [`Point3::new`], which
/// folds `-0.0` into `0.0` so that the two zeros compare and hash alike.
/// NaN coordinates are never equal to anything (including themselves);
/// callers that intern points must reject them first
/// (see [`Point3::is_finite`]).
#[derive(Clone, Copy, Debug)]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// The origin.
    pub const ORIGIN: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a point, normalizing negative zero.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: fold_zero(x),
            y: fold_zero(y),
            z: fold_zero(z),
        }
    }

    /// Whether all three coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Coordinates as an array.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

#[inline]
fn fold_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl PartialEq for Point3 {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

// NaN-free points satisfy reflexivity; the interner only stores finite points.
impl Eq for Point3 {}

impl Hash for Point3 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        fold_zero(self.x).to_bits().hash(state);
        fold_zero(self.y).to_bits().hash(state);
        fold_zero(self.z).to_bits().hash(state);
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn negative_zero_matches_zero() {
        let a = Point3::new(0.0, -0.0, 0.0);
        let b = Point3::ORIGIN;
        assert_eq!(a, b);
        let set: HashSet<Point3> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn distinct_coordinates_differ() {
        assert_ne!(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn non_finite_detected() {
        assert!(Point3::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Point3::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Point3::new(0.0, f64::INFINITY, 0.0).is_finite());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(p: &Point3) -> u64 {
            let mut h = DefaultHasher::new();
            p.hash(&mut h);
            h.finish()
        }

        proptest! {
            #[test]
            fn equal_points_hash_equal(
                x in -1e6f64..1e6, y in -1e6f64..1e6, z in -1e6f64..1e6,
            ) {
                let a = Point3::new(x, y, z);
                let b = Point3::from([x, y, z]);
                prop_assert_eq!(a, b);
                prop_assert_eq!(hash_of(&a), hash_of(&b));
            }
        }
    }
}
