//! Concatenation of independently built trees into one node buffer.
//!
//! Every tree is built with its root at index zero. To place several trees in one buffer, each
//! one is appended at the current end of the buffer and the child indices of its internal nodes
//! are shifted by that offset. Leaf payloads index caller-owned tables, not nodes, and are left
//! untouched.

use anyhow::{bail, Result};

use crate::bvh::{BvhNode, BvhNodeKind};
use crate::flat_bvh::{to_gpu_index, GpuBvhNode};

/// A node whose child indices can be shifted when its tree is moved inside a larger buffer.
pub trait Relocate {
    /// Adds `offset` to both child indices if this is an internal node. Leaves are unchanged.
    fn relocate(&mut self, offset: usize);
}

impl Relocate for BvhNode {
    fn relocate(&mut self, offset: usize) {
        if let BvhNodeKind::Internal {
            ref mut left,
            ref mut right,
        } = self.kind
        {
            *left += offset;
            *right += offset;
        }
    }
}

impl Relocate for GpuBvhNode {
    fn relocate(&mut self, offset: usize) {
        // A non-positive `left` marks a leaf. Its words are payload and stay as they are.
        if self.is_internal() {
            debug_assert!(
                self.right > 0,
                "Internal node with right child {} mixes encodings.",
                self.right
            );
            self.left = to_gpu_index(self.left as usize + offset);
            self.right = to_gpu_index(self.right as usize + offset);
        }
    }
}

/// Appends `tree` to `nodes` and returns the index of its root in `nodes`.
///
/// The nodes of `tree` must be numbered from zero, as every build returns them. Internal nodes
/// are shifted by the length `nodes` had before the call; leaves are copied unchanged.
///
/// # Examples
/// ```
/// use scene_bvh::aabb::Aabb;
/// use scene_bvh::bvh::{BuildConfig, BvhBuilder};
/// use scene_bvh::compose::append_and_offset;
/// use scene_bvh::Point3;
///
/// let boxes = [
///     Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
///     Aabb::with_bounds(Point3::new(4.0, 0.0, 0.0), Point3::new(5.0, 1.0, 1.0)),
/// ];
/// let builder = BvhBuilder::new(BuildConfig::default());
///
/// let mut nodes = Vec::new();
/// let first_root = append_and_offset(&mut nodes, builder.build(&boxes, |_, _| {}).into_nodes());
/// let second_root = append_and_offset(&mut nodes, builder.build(&boxes, |_, _| {}).into_nodes());
///
/// assert_eq!((first_root, second_root), (0, 3));
/// assert_eq!(nodes[3].children(), Some((4, 5)));
/// ```
pub fn append_and_offset<N, I>(nodes: &mut Vec<N>, tree: I) -> usize
where
    N: Relocate,
    I: IntoIterator<Item = N>,
{
    let offset = nodes.len();
    nodes.extend(tree.into_iter().map(|mut node| {
        node.relocate(offset);
        node
    }));
    offset
}

/// Checks a packed buffer received from elsewhere before it is traversed.
///
/// Every internal node must point at two nodes inside the buffer that are stored after it,
/// which also rules out self references and cycles.
pub fn validate_layout(nodes: &[GpuBvhNode]) -> Result<()> {
    if nodes.is_empty() {
        bail!("Packed BVH has no nodes.");
    }

    for (index, node) in nodes.iter().enumerate() {
        if !node.is_internal() {
            continue;
        }
        if node.right <= 0 {
            bail!(
                "Node {} mixes encodings: left {} is a child, right {} is not.",
                index,
                node.left,
                node.right
            );
        }
        for child in [node.left as usize, node.right as usize] {
            if child >= nodes.len() {
                bail!(
                    "Child {} of node {} is out of bounds of {} nodes.",
                    child,
                    index,
                    nodes.len()
                );
            }
            if child <= index {
                bail!(
                    "Child {} of node {} is not stored after its parent.",
                    child,
                    index
                );
            }
        }
    }
    Ok(())
}
