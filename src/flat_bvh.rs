//! This module exports the GPU layout of a node and methods to flatten a node array into it
//! and traverse it iteratively.

use crate::aabb::Aabb;
use crate::bvh::{BvhNode, BvhNodeKind, LeafPayload};
use crate::ray::Ray;
use crate::Point3;

/// A node as the GPU sees it: 32 bytes, bounds split around the two child words.
///
/// The two child words are signed so that a single comparison tells nodes apart:
///
/// | node                          | `left`    | `right`   |
/// |-------------------------------|-----------|-----------|
/// | internal                      | `child_l` | `child_r` |
/// | leaf, `Range { first, count }`| `-first`  | `count`   |
/// | leaf, `Instance { index }`    | `-index`  | `0`       |
///
/// A node is internal if and only if `left > 0`. Since the root of every tree precedes its
/// children, no internal node ever points at index zero.
///
/// # Examples
/// ```
/// use scene_bvh::aabb::Aabb;
/// use scene_bvh::bvh::{BvhNode, LeafPayload};
/// use scene_bvh::flat_bvh::GpuBvhNode;
/// use scene_bvh::Point3;
///
/// let aabb = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let leaf = BvhNode::leaf(aabb, LeafPayload::Range { first: 12, count: 3 });
///
/// let packed = GpuBvhNode::from(&leaf);
/// assert_eq!((packed.left, packed.right), (-12, 3));
/// assert_eq!(packed.unpack(), leaf);
/// assert_eq!(std::mem::size_of::<GpuBvhNode>(), 32);
/// ```
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuBvhNode {
    /// Lower corner of the node's bounds.
    pub min: [f32; 3],

    /// Left child, or the negated first index of a leaf.
    pub left: i32,

    /// Upper corner of the node's bounds.
    pub max: [f32; 3],

    /// Right child, the item count of a range leaf, or zero for an instance leaf.
    pub right: i32,
}

/// Converts an index into a child word.
pub(crate) fn to_gpu_index(index: usize) -> i32 {
    assert!(
        index <= i32::MAX as usize,
        "Index {} does not fit into a GPU node.",
        index
    );
    index as i32
}

impl From<&BvhNode> for GpuBvhNode {
    fn from(node: &BvhNode) -> GpuBvhNode {
        let (left, right) = match node.kind {
            BvhNodeKind::Internal { left, right } => {
                assert!(
                    left > 0 && right > 0,
                    "Internal nodes cannot point at index zero."
                );
                (to_gpu_index(left), to_gpu_index(right))
            }
            BvhNodeKind::Leaf(LeafPayload::Range { first, count }) => {
                assert!(count > 0, "Tried to pack a range leaf without items.");
                (-to_gpu_index(first as usize), to_gpu_index(count as usize))
            }
            BvhNodeKind::Leaf(LeafPayload::Instance { index }) => {
                (-to_gpu_index(index as usize), 0)
            }
        };

        GpuBvhNode {
            min: node.aabb.min.coords.into(),
            left,
            max: node.aabb.max.coords.into(),
            right,
        }
    }
}

impl GpuBvhNode {
    /// Returns true if this node is internal.
    pub fn is_internal(&self) -> bool {
        self.left > 0
    }

    /// Returns the bounds of this node.
    pub fn aabb(&self) -> Aabb {
        Aabb::with_bounds(Point3::from(self.min), Point3::from(self.max))
    }

    /// Decodes this node back into a [`BvhNode`].
    pub fn unpack(&self) -> BvhNode {
        if self.is_internal() {
            BvhNode::internal(self.aabb(), self.left as usize, self.right as usize)
        } else if self.right == 0 {
            BvhNode::leaf(
                self.aabb(),
                LeafPayload::Instance {
                    index: self.left.unsigned_abs(),
                },
            )
        } else {
            BvhNode::leaf(
                self.aabb(),
                LeafPayload::Range {
                    first: self.left.unsigned_abs(),
                    count: self.right as u32,
                },
            )
        }
    }
}

/// Packs a whole node array.
pub fn pack_nodes(nodes: &[BvhNode]) -> Vec<GpuBvhNode> {
    nodes.iter().map(GpuBvhNode::from).collect()
}

/// Views packed nodes as the raw bytes to upload.
pub fn as_bytes(nodes: &[GpuBvhNode]) -> &[u8] {
    bytemuck::cast_slice(nodes)
}

/// Traverses packed nodes iteratively, starting at `root`, the way a GPU kernel would.
/// Returns the payload of every leaf whose bounds are hit by `ray`.
pub fn traverse_flat_bvh(flat_nodes: &[GpuBvhNode], root: usize, ray: &Ray) -> Vec<LeafPayload> {
    let mut hits = Vec::new();
    let mut stack = vec![root];
    while let Some(index) = stack.pop() {
        let node = &flat_nodes[index];
        if !ray.intersects_aabb(&node.aabb()) {
            continue;
        }
        if node.is_internal() {
            stack.push(node.right as usize);
            stack.push(node.left as usize);
        } else {
            hits.push(node.unpack().payload());
        }
    }
    hits
}
