//! Utilities module.

use crate::aabb::Aabb;
use crate::bounding_hierarchy::BHShape;

use num_traits::Float;

/// Fast floating point minimum.  This function matches the semantics of
///
/// ```no_compile
/// if x < y { x } else { y }
/// ```
///
/// which has efficient instruction sequences on many platforms (1 instruction on x86).  For most
/// values, it matches the semantics of `x.min(y)`; the special cases are:
///
/// ```text
/// min(-0.0, +0.0); +0.0
/// min(+0.0, -0.0): -0.0
/// min( NaN,  1.0):  1.0
/// min( 1.0,  NaN):  NaN
/// ```
///
/// Note: This exists because [`std::cmp::min`] requires Ord which floating point types do not satisfy
#[inline(always)]
pub fn fast_min<T: Float>(x: T, y: T) -> T {
    if x < y {
        x
    } else {
        y
    }
}

/// Fast floating point maximum.  This function matches the semantics of
///
/// ```no_compile
/// if x > y { x } else { y }
/// ```
///
/// which has efficient instruction sequences on many platforms (1 instruction on x86).  For most
/// values, it matches the semantics of `x.max(y)`; the special cases are:
///
/// ```text
/// max(-0.0, +0.0); +0.0
/// max(+0.0, -0.0): -0.0
/// max( NaN,  1.0):  1.0
/// max( 1.0,  NaN):  NaN
/// ```
///
/// Note: This exists because [`std::cmp::max`] requires Ord which floating point types do not satisfy
#[inline(always)]
pub fn fast_max<T: Float>(x: T, y: T) -> T {
    if x > y {
        x
    } else {
        y
    }
}

/// Returns the joint [`Aabb`] of all `shapes` in the work-list.
pub fn joint_aabb_of_shapes<Shape: BHShape>(shapes: &[&Shape]) -> Aabb {
    let mut aabb = Aabb::empty();
    for shape in shapes {
        aabb.join_mut(&shape.aabb());
    }
    aabb
}

#[cfg(test)]
mod tests {
    use crate::aabb::Aabb;
    use crate::testbase::UnitBox;
    use crate::utils::{fast_max, fast_min, joint_aabb_of_shapes};
    use crate::Point3;

    #[test]
    fn test_fast_min_max() {
        assert_eq!(fast_min(1.0_f32, 2.0), 1.0);
        assert_eq!(fast_max(1.0_f32, 2.0), 2.0);
        assert_eq!(fast_min(f32::NAN, 1.0), 1.0);
        assert!(fast_min(1.0, f32::NAN).is_nan());
    }

    #[test]
    /// Test if the joint `Aabb` of no shapes is empty.
    fn test_joint_aabb_empty() {
        let shapes: Vec<&UnitBox> = Vec::new();
        assert!(joint_aabb_of_shapes(&shapes).is_empty());
    }

    #[test]
    /// Test if the joint `Aabb` encloses every unit box.
    fn test_joint_aabb_of_boxes() {
        let a = UnitBox::new(0, Point3::new(0.0, 0.0, 0.0));
        let b = UnitBox::new(1, Point3::new(4.0, -2.0, 1.0));
        let aabb = joint_aabb_of_shapes(&[&a, &b]);
        assert_eq!(
            aabb,
            Aabb::with_bounds(Point3::new(-0.5, -2.5, -0.5), Point3::new(4.5, 0.5, 1.5))
        );
    }
}
