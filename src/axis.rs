//! The three split axes and indexing of points by them.

use std::fmt;
use std::ops::Index;

use crate::{Point3, Real};

/// One of the three coordinate axes a node can be split along.
///
/// # Examples
/// ```
/// use scene_bvh::axis::Axis;
/// use scene_bvh::Point3;
///
/// let center = Point3::new(1.0, 2.0, 3.0);
/// let picked = Axis::ALL.map(|axis| center[axis]);
///
/// assert_eq!(picked, [1.0, 2.0, 3.0]);
/// assert_eq!(Axis::Y.to_string(), "y");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All three axes in the order split candidates are generated.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Reads the coordinate of a point along an axis, e.g. the position of a center relative to a
/// split plane.
impl Index<Axis> for Point3 {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::axis::Axis;
    use crate::testbase::{tuple_to_point, TupleVec};
    use proptest::prelude::*;

    proptest! {
        // Indexing by `Axis` reads the same coordinate as the named field.
        #[test]
        fn test_point_index_by_axis(tpl: TupleVec) {
            let point = tuple_to_point(&tpl);
            prop_assert_eq!(point[Axis::X].to_bits(), point.x.to_bits());
            prop_assert_eq!(point[Axis::Y].to_bits(), point.y.to_bits());
            prop_assert_eq!(point[Axis::Z].to_bits(), point.z.to_bits());
        }
    }

    #[test]
    fn test_axes_in_generation_order() {
        let names = Axis::ALL
            .iter()
            .map(|axis| axis.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["x", "y", "z"]);
    }
}
