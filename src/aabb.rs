//! Axis Aligned Bounding Boxes.

use std::fmt;
use std::ops::Index;

use crate::axis::Axis;
use crate::utils::{fast_max, fast_min};
use crate::{Matrix4, Point3, Real, Vector3};

/// Aabb struct.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum coordinates
    pub min: Point3,

    /// Maximum coordinates
    pub max: Point3,
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Min bound: {}; Max bound: {}", self.min, self.max)
    }
}

/// A trait implemented by things which can be bounded by an [`Aabb`].
pub trait Bounded {
    /// Returns the geometric bounds of this object in the form of an [`Aabb`].
    ///
    /// # Examples
    /// ```
    /// use scene_bvh::aabb::{Aabb, Bounded};
    /// use scene_bvh::Point3;
    ///
    /// struct Something;
    ///
    /// impl Bounded for Something {
    ///     fn aabb(&self) -> Aabb {
    ///         let point1 = Point3::new(0.0, 0.0, 0.0);
    ///         let point2 = Point3::new(1.0, 1.0, 1.0);
    ///         Aabb::with_bounds(point1, point2)
    ///     }
    /// }
    ///
    /// let something = Something;
    /// let aabb = something.aabb();
    ///
    /// assert!(aabb.contains(&Point3::new(0.0, 0.0, 0.0)));
    /// assert!(aabb.contains(&Point3::new(1.0, 1.0, 1.0)));
    /// ```
    fn aabb(&self) -> Aabb;
}

impl<T: Bounded + ?Sized> Bounded for &T {
    fn aabb(&self) -> Aabb {
        (**self).aabb()
    }
}

impl Aabb {
    /// Creates a new [`Aabb`] with the given bounds.
    pub fn with_bounds(min: Point3, max: Point3) -> Aabb {
        Aabb { min, max }
    }

    /// Creates a new empty [`Aabb`]. The bounds are the `+inf`/`-inf` sentinels, so growing it
    /// by anything yields exactly that thing's bounds.
    pub fn empty() -> Aabb {
        Aabb {
            min: Point3::new(Real::INFINITY, Real::INFINITY, Real::INFINITY),
            max: Point3::new(Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY),
        }
    }

    /// Returns true if nothing was ever added to this [`Aabb`].
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns true if the [`Point3`] is inside the [`Aabb`].
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns true if `other` lies inside this [`Aabb`]. Touching the boundary counts.
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains(&other.min) && self.contains(&other.max)
    }

    /// Returns true if the [`Point3`] is approximately inside the [`Aabb`]
    /// with respect to some `epsilon`.
    pub fn approx_contains_eps(&self, p: &Point3, epsilon: Real) -> bool {
        (p.x - self.min.x) > -epsilon
            && (p.x - self.max.x) < epsilon
            && (p.y - self.min.y) > -epsilon
            && (p.y - self.max.y) < epsilon
            && (p.z - self.min.z) > -epsilon
            && (p.z - self.max.z) < epsilon
    }

    /// Returns true if `other` is approximately contained in this [`Aabb`]
    /// with respect to some `epsilon`.
    pub fn approx_contains_aabb_eps(&self, other: &Aabb, epsilon: Real) -> bool {
        self.approx_contains_eps(&other.min, epsilon) && self.approx_contains_eps(&other.max, epsilon)
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and `other`.
    pub fn join(&self, other: &Aabb) -> Aabb {
        Aabb::with_bounds(
            Point3::new(
                fast_min(self.min.x, other.min.x),
                fast_min(self.min.y, other.min.y),
                fast_min(self.min.z, other.min.z),
            ),
            Point3::new(
                fast_max(self.max.x, other.max.x),
                fast_max(self.max.y, other.max.y),
                fast_max(self.max.z, other.max.z),
            ),
        )
    }

    /// Mutable version of [`Aabb::join`].
    pub fn join_mut(&mut self, other: &Aabb) {
        *self = self.join(other);
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and the point `other`.
    pub fn grow(&self, other: &Point3) -> Aabb {
        self.join(&Aabb::with_bounds(*other, *other))
    }

    /// Mutable version of [`Aabb::grow`].
    pub fn grow_mut(&mut self, other: &Point3) {
        *self = self.grow(other);
    }

    /// Returns the size of this [`Aabb`] in all three dimensions.
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Returns the center [`Point3`] of the [`Aabb`].
    pub fn center(&self) -> Point3 {
        self.min + (self.size() / 2.0)
    }

    /// Returns half of the total surface area of this [`Aabb`].
    ///
    /// Split costs are only ever compared against each other, so the factor of two is dropped.
    /// An empty [`Aabb`] has an area of zero.
    ///
    /// # Examples
    /// ```
    /// use scene_bvh::aabb::Aabb;
    /// use scene_bvh::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
    ///
    /// assert_eq!(aabb.surface_area(), 1.0 * 2.0 + 2.0 * 3.0 + 1.0 * 3.0);
    /// ```
    pub fn surface_area(&self) -> Real {
        if self.is_empty() {
            return 0.0;
        }
        let size = self.size();
        size.x * size.y + size.y * size.z + size.x * size.z
    }

    /// Returns the extent of this [`Aabb`] along `axis`.
    pub fn extent(&self, axis: Axis) -> Real {
        self.max[axis] - self.min[axis]
    }

    /// Returns the [`Aabb`] of the eight corners of this box after applying `transform`.
    pub fn transform(&self, transform: &Matrix4) -> Aabb {
        let mut aabb = Aabb::empty();
        for i in 0..8 {
            let corner = Point3::new(
                self[i & 1].x,
                self[(i >> 1) & 1].y,
                self[(i >> 2) & 1].z,
            );
            aabb.grow_mut(&transform.transform_point(&corner));
        }
        aabb
    }
}

impl Default for Aabb {
    fn default() -> Aabb {
        Aabb::empty()
    }
}

/// Make [`Aabb`]s indexable. `aabb[0]` gives a reference to the minimum bound.
/// All other indices return a reference to the maximum bound.
impl Index<usize> for Aabb {
    type Output = Point3;

    fn index(&self, index: usize) -> &Point3 {
        if index == 0 {
            &self.min
        } else {
            &self.max
        }
    }
}

/// Implementation of [`Bounded`] for [`Aabb`].
impl Bounded for Aabb {
    fn aabb(&self) -> Aabb {
        *self
    }
}

/// Implementation of [`Bounded`] for [`Point3`].
impl Bounded for Point3 {
    fn aabb(&self) -> Aabb {
        Aabb::with_bounds(*self, *self)
    }
}

#[cfg(test)]
mod tests {
    use crate::aabb::{Aabb, Bounded};
    use crate::axis::Axis;
    use crate::testbase::{tuple_to_point, tuplevec_small_strategy, TupleVec};
    use crate::{Matrix4, Point3, Vector3, EPSILON};
    use float_eq::assert_float_eq;
    use proptest::prelude::*;

    proptest! {
        // Test whether an empty `Aabb` does not contains anything.
        #[test]
        fn test_empty_contains_nothing(tpl: TupleVec) {
            let p = tuple_to_point(&tpl);
            let aabb = Aabb::empty();
            assert!(!aabb.contains(&p));
        }

        // Test whether an `Aabb` always contains its center.
        #[test]
        fn test_aabb_contains_center(a in tuplevec_small_strategy(), b in tuplevec_small_strategy()) {
            let p1 = tuple_to_point(&a);
            let p2 = tuple_to_point(&b);
            let aabb = Aabb::empty().grow(&p1).join(&p2.aabb());
            assert!(aabb.approx_contains_eps(&aabb.center(), EPSILON));
        }

        // Test whether the joint of two point-sets contains all the points.
        #[test]
        fn test_join_two_aabbs(a in proptest::collection::vec(tuplevec_small_strategy(), 5),
                               b in proptest::collection::vec(tuplevec_small_strategy(), 5)) {
            let points_a = a.iter().map(tuple_to_point).collect::<Vec<Point3>>();
            let points_b = b.iter().map(tuple_to_point).collect::<Vec<Point3>>();
            let aabb1 = points_a.iter().fold(Aabb::empty(), |aabb, point| aabb.grow(point));
            let aabb2 = points_b.iter().fold(Aabb::empty(), |aabb, point| aabb.grow(point));
            let joint = aabb1.join(&aabb2);

            for point in points_a.iter().chain(points_b.iter()) {
                assert!(joint.contains(point));
            }
        }
    }

    #[test]
    fn test_empty_is_neutral_element() {
        let aabb = Aabb::with_bounds(Point3::new(-1.0, 2.0, 0.0), Point3::new(3.0, 4.0, 0.5));
        assert_eq!(Aabb::empty().join(&aabb), aabb);
        assert!(Aabb::empty().is_empty());
        assert!(!aabb.is_empty());
        assert_float_eq!(Aabb::empty().surface_area(), 0.0, abs <= 0.0);
    }

    #[test]
    fn test_surface_area_is_half_area() {
        let aabb = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        // A cube of side 2 has a total area of 24.
        assert_float_eq!(aabb.surface_area(), 12.0, abs <= EPSILON);
        assert_float_eq!(aabb.extent(Axis::Y), 2.0, abs <= EPSILON);
    }

    #[test]
    fn test_transform_translation() {
        let aabb = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let moved = aabb.transform(&Matrix4::new_translation(&Vector3::new(10.0, -2.0, 0.5)));
        assert_float_eq!(moved.min.x, 10.0, abs <= EPSILON);
        assert_float_eq!(moved.min.y, -2.0, abs <= EPSILON);
        assert_float_eq!(moved.max.z, 1.5, abs <= EPSILON);
    }

    #[test]
    fn test_transform_rotation_covers_corners() {
        let aabb = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let rotation = Matrix4::from_scaled_axis(Vector3::z() * std::f32::consts::FRAC_PI_2);
        let rotated = aabb.transform(&rotation);
        // (2, 0, 0) rotates onto (0, 2, 0) and (0, 1, 0) onto (-1, 0, 0).
        assert_float_eq!(rotated.max.y, 2.0, abs <= 1e-4);
        assert_float_eq!(rotated.min.x, -1.0, abs <= 1e-4);
    }
}
