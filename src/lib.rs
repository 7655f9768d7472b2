//! A crate which builds binary bounding volume hierarchies with the surface area heuristic
//! and composes them into a single two-level acceleration structure for GPU ray tracing.
//!
//! ## About
//!
//! A renderer needs to answer "which item does this ray hit" for every ray it traces. A BVH
//! reduces the cost of that query from O(n) to O(log2(n)) at the cost of building the tree once
//! in advance. This crate builds one tree per unique mesh (the bottom level) and one tree over the
//! mesh instances of a scene (the top level), then concatenates all of them into one contiguous
//! node buffer that can be uploaded to the GPU as-is.
//!
//! The builder itself knows nothing about triangles or instances. It partitions anything that
//! implements [`BHShape`] and hands every finished leaf back to the caller, who decides what
//! payload the leaf carries.
//!
//! ## Example
//!
//! ```
//! use scene_bvh::aabb::{Aabb, Bounded};
//! use scene_bvh::bounding_hierarchy::BHShape;
//! use scene_bvh::bvh::{BuildConfig, BvhBuilder, LeafPayload};
//! use scene_bvh::{Point3, Vector3};
//!
//! struct Sphere {
//!     position: Point3,
//!     radius: f32,
//!     id: u32,
//! }
//!
//! impl Bounded for Sphere {
//!     fn aabb(&self) -> Aabb {
//!         let half_size = Vector3::new(self.radius, self.radius, self.radius);
//!         Aabb::with_bounds(self.position - half_size, self.position + half_size)
//!     }
//! }
//!
//! impl BHShape for Sphere {}
//!
//! let spheres = (0..100u32)
//!     .map(|i| Sphere {
//!         position: Point3::new(i as f32, (i % 7) as f32, 0.0),
//!         radius: 0.5,
//!         id: i,
//!     })
//!     .collect::<Vec<_>>();
//!
//! let mut ordered = Vec::new();
//! let bvh = BvhBuilder::new(BuildConfig::default().with_min_leaf_items(2)).build(
//!     &spheres,
//!     |node, items| {
//!         node.set_payload(LeafPayload::Range {
//!             first: ordered.len() as u32,
//!             count: items.len() as u32,
//!         });
//!         ordered.extend(items.iter().map(|sphere| sphere.id));
//!     },
//! );
//!
//! assert_eq!(ordered.len(), spheres.len());
//! assert_eq!(bvh.stats().partitioned_items, 100);
//! ```
//!
//! ## Features
//!
//! - `rayon` (default **enabled**) - scores split candidates in parallel
//! - `serde` (default **disabled**) - adds `Serialize` and `Deserialize` implementations for
//!   nodes, boxes, build configuration and build statistics
//!

/// Float type used by this crate. GPU buffers are single precision.
pub type Real = f32;

/// Point math type used by this crate. Type alias for [`nalgebra::Point3`].
pub type Point3 = nalgebra::Point3<Real>;

/// Vector math type used by this crate. Type alias for [`nalgebra::Vector3`].
pub type Vector3 = nalgebra::Vector3<Real>;

/// Matrix math type used by this crate. Type alias for [`nalgebra::Matrix4`].
pub type Matrix4 = nalgebra::Matrix4<Real>;

/// A minimal floating value used as a lower bound.
pub const EPSILON: Real = 0.00001;

pub mod aabb;
pub mod axis;
pub mod bounding_hierarchy;
pub mod bvh;
pub mod compose;
pub mod flat_bvh;
pub mod ray;
pub mod scene;
mod utils;

#[cfg(test)]
mod testbase;

pub use nalgebra;
