//! This module defines the [`Bvh`] produced by a [`BvhBuilder`](struct.BvhBuilder.html).

use std::iter::repeat;

use log::debug;

use crate::aabb::Aabb;
use crate::bvh::{BuildStats, BvhNode, BvhNodeKind, LeafPayload};
use crate::compose::append_and_offset;
use crate::flat_bvh::{pack_nodes, GpuBvhNode};
use crate::ray::Ray;
use crate::{Point3, Real, EPSILON};

/// A built bounding volume hierarchy.
///
/// The nodes live in one flat array with the root at index zero. Every internal node is stored
/// before both of its children, so walking the array front to back visits parents first.
///
/// [`Bvh`]: struct.Bvh.html
///
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    stats: BuildStats,
}

impl Bvh {
    pub(crate) fn new(nodes: Vec<BvhNode>, stats: BuildStats) -> Bvh {
        Bvh { nodes, stats }
    }

    /// Returns all nodes, root first.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Returns the root node.
    pub fn root(&self) -> &BvhNode {
        &self.nodes[0]
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A built [`Bvh`] always has a root, so this is always false.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consumes the [`Bvh`] and returns its nodes.
    pub fn into_nodes(self) -> Vec<BvhNode> {
        self.nodes
    }

    /// Returns the counters collected while building.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Iterates over all leaves together with their node index.
    pub fn leaves(&self) -> impl Iterator<Item = (usize, &BvhNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_leaf())
    }

    /// Returns the depth of the deepest leaf. A single leaf has depth zero.
    pub fn depth(&self) -> u32 {
        let mut max_depth = 0;
        let mut stack = vec![(0, 0)];
        while let Some((node_index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some((left, right)) = self.nodes[node_index].children() {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }

    /// Appends the nodes of this tree to `nodes`, shifting child indices by the current length
    /// of `nodes`. Returns the index at which the root landed.
    pub fn append_to(self, nodes: &mut Vec<BvhNode>) -> usize {
        append_and_offset(nodes, self.nodes)
    }

    /// Packs every node into its GPU layout.
    pub fn pack(&self) -> Vec<GpuBvhNode> {
        pack_nodes(&self.nodes)
    }

    /// Traverses the [`Bvh`] and returns the index and payload of every leaf whose [`Aabb`] is
    /// hit by `ray`.
    ///
    /// [`Aabb`]: ../aabb/struct.Aabb.html
    ///
    pub fn traverse(&self, ray: &Ray) -> Vec<(usize, LeafPayload)> {
        let mut hits = Vec::new();
        let mut stack = vec![0];
        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            if !ray.intersects_aabb(&node.aabb) {
                continue;
            }
            match node.kind {
                BvhNodeKind::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
                BvhNodeKind::Leaf(payload) => hits.push((node_index, payload)),
            }
        }
        hits
    }

    /// Logs the [`Bvh`] in a tree-like visualization at debug level.
    pub fn pretty_print(&self) {
        self.print_node(0, 0);
    }

    fn print_node(&self, node_index: usize, depth: usize) {
        let node = &self.nodes[node_index];
        let padding: String = repeat(" ").take(depth).collect();
        match node.kind {
            BvhNodeKind::Internal { left, right } => {
                debug!("{}node={} {}", padding, node_index, node.aabb);
                debug!("{}{} child_l", padding, left);
                self.print_node(left, depth + 1);
                debug!("{}{} child_r", padding, right);
                self.print_node(right, depth + 1);
            }
            BvhNodeKind::Leaf(payload) => {
                debug!("{}node={} {}", padding, node_index, node.aabb);
                debug!("{}payload\t{:?}", padding, payload);
            }
        }
    }

    /// Verifies that the node at `node_index` lies inside `expected_outer_aabb`, that it was not
    /// visited before, and recurses into its children. Returns the number of visited nodes.
    fn assert_consistent_subtree(
        &self,
        node_index: usize,
        expected_outer_aabb: &Aabb,
        visited: &mut [bool],
    ) -> usize {
        assert!(
            !visited[node_index],
            "Node {} is reachable more than once.",
            node_index
        );
        visited[node_index] = true;

        let node = &self.nodes[node_index];
        assert!(
            expected_outer_aabb.approx_contains_aabb_eps(&node.aabb, EPSILON),
            "Node {} lies outside the expected bounds.\n\tBounds: {}\n\tNode: {}",
            node_index,
            expected_outer_aabb,
            node.aabb
        );

        match node.kind {
            BvhNodeKind::Internal { left, right } => {
                for child_index in [left, right] {
                    assert!(
                        child_index < self.nodes.len(),
                        "Child {} of node {} is out of bounds.",
                        child_index,
                        node_index
                    );
                    assert!(
                        child_index > node_index,
                        "Child {} of node {} is stored before its parent.",
                        child_index,
                        node_index
                    );
                }
                1 + self.assert_consistent_subtree(left, &node.aabb, visited)
                    + self.assert_consistent_subtree(right, &node.aabb, visited)
            }
            BvhNodeKind::Leaf(payload) => {
                assert!(
                    payload.item_count() > 0,
                    "Leaf {} refers to no items.",
                    node_index
                );
                1
            }
        }
    }

    /// Checks that every child index is in bounds and stored after its parent, that every node
    /// is reachable from the root exactly once, and that every node's [`Aabb`] lies within its
    /// parent's.
    ///
    /// [`Aabb`]: ../aabb/struct.Aabb.html
    ///
    pub fn assert_consistent(&self) {
        assert!(!self.nodes.is_empty(), "A BVH has at least one node.");

        // The root node of the bvh is not bounded by anything.
        let space = Aabb::with_bounds(
            Point3::new(Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY),
            Point3::new(Real::INFINITY, Real::INFINITY, Real::INFINITY),
        );

        let mut visited = vec![false; self.nodes.len()];
        let node_count = self.assert_consistent_subtree(0, &space, &mut visited);
        assert_eq!(node_count, self.nodes.len(), "Detached subtree");
    }

    /// Checks that the [`Aabb`]s in the [`Bvh`] are tight, which means that every internal
    /// node's box is exactly the union of its children's boxes.
    ///
    /// [`Aabb`]: ../aabb/struct.Aabb.html
    ///
    pub fn assert_tight(&self) {
        for (node_index, node) in self.nodes.iter().enumerate() {
            if let Some((left, right)) = node.children() {
                let joint_aabb = self.nodes[left].aabb.join(&self.nodes[right].aabb);
                assert_eq!(
                    joint_aabb, node.aabb,
                    "Node {} is not tight around its children.",
                    node_index
                );
            }
        }
    }
}
