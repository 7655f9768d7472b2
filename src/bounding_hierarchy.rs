//! This module defines the [`BHShape`] trait, the contract every item partitioned by the
//! builder must satisfy.

use crate::aabb::{Aabb, Bounded};
use crate::Point3;

/// An item which can be partitioned into a bounding hierarchy.
///
/// The builder only ever reads items: it asks for their [`Aabb`] to grow node bounds and for
/// their [`center`] to decide which side of a split plane they fall on. Items are neither copied
/// nor mutated, and they stay owned by the caller.
///
/// [`Aabb`]: ../aabb/struct.Aabb.html
/// [`center`]: #method.center
///
/// # Examples
/// ```
/// use scene_bvh::aabb::{Aabb, Bounded};
/// use scene_bvh::bounding_hierarchy::BHShape;
/// use scene_bvh::Point3;
///
/// struct Marker(Point3);
///
/// impl Bounded for Marker {
///     fn aabb(&self) -> Aabb {
///         Aabb::with_bounds(self.0, self.0)
///     }
/// }
///
/// impl BHShape for Marker {}
///
/// let marker = Marker(Point3::new(1.0, 2.0, 3.0));
/// assert_eq!(marker.center(), Point3::new(1.0, 2.0, 3.0));
/// ```
pub trait BHShape: Bounded {
    /// The point which decides on which side of a split plane this item lands.
    /// Defaults to the center of the item's [`Aabb`](../aabb/struct.Aabb.html).
    fn center(&self) -> Point3 {
        self.aabb().center()
    }
}

impl<T: BHShape + ?Sized> BHShape for &T {
    fn center(&self) -> Point3 {
        (**self).center()
    }
}

impl BHShape for Aabb {}
