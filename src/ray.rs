//! This module defines a [`Ray`], used by the reference traversals to check the nodes a packed
//! tree would visit on the GPU.

use crate::aabb::Aabb;
use crate::utils::fast_max;
use crate::{Matrix4, Point3, Vector3};

/// A struct which defines a ray and some of its cached values.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The ray origin.
    pub origin: Point3,

    /// The ray direction.
    pub direction: Vector3,

    /// Inverse (1/x) ray direction. Cached for use in [`Aabb`] intersections.
    pub inv_direction: Vector3,
}

impl Ray {
    /// Creates a new [`Ray`] from an `origin` and a `direction`.
    /// `direction` will be normalized.
    ///
    /// # Examples
    /// ```
    /// use scene_bvh::ray::Ray;
    /// use scene_bvh::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0, 0.0, 0.0);
    /// let direction = Vector3::new(1.0, 0.0, 0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// assert_eq!(ray.origin, origin);
    /// assert_eq!(ray.direction, direction);
    /// ```
    pub fn new(origin: Point3, direction: Vector3) -> Ray {
        let direction = direction.normalize();
        Ray {
            origin,
            direction,
            inv_direction: direction.map(|x| 1.0 / x),
        }
    }

    /// Tests the intersection of a [`Ray`] with an [`Aabb`] using the slab method.
    ///
    /// Touching counts as a hit, so boxes without thickness, such as the bounds of an axis
    /// aligned triangle, can be hit.
    ///
    /// # Examples
    /// ```
    /// use scene_bvh::aabb::Aabb;
    /// use scene_bvh::ray::Ray;
    /// use scene_bvh::{Point3, Vector3};
    ///
    /// let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    ///
    /// let point1 = Point3::new(99.9, -1.0, -1.0);
    /// let point2 = Point3::new(100.1, 1.0, 1.0);
    /// let aabb = Aabb::with_bounds(point1, point2);
    ///
    /// assert!(ray.intersects_aabb(&aabb));
    /// ```
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let lbr = (aabb[0].coords - self.origin.coords).component_mul(&self.inv_direction);
        let rtr = (aabb[1].coords - self.origin.coords).component_mul(&self.inv_direction);

        let (inf, sup) = lbr.inf_sup(&rtr);

        let tmin = inf.max();
        let tmax = sup.min();

        tmax >= fast_max(tmin, 0.0)
    }

    /// Returns this ray moved by `transform`, for example from world into mesh space.
    pub fn transform(&self, transform: &Matrix4) -> Ray {
        Ray::new(
            transform.transform_point(&self.origin),
            transform.transform_vector(&self.direction),
        )
    }
}
