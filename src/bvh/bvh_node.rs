use crate::aabb::Aabb;

/// The payload of a leaf node. The builder never interprets it; the leaf callback decides what
/// a leaf refers to.
///
/// A freshly materialized leaf carries `Range { first: 0, count }` with the number of items the
/// builder handed to the callback, until the callback overwrites it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LeafPayload {
    /// A contiguous range in a caller-owned table, e.g. the primitives of a bottom-level leaf.
    Range {
        /// Offset of the first entry.
        first: u32,

        /// Number of entries, at least one.
        count: u32,
    },
    /// Exactly one mesh instance, referenced by its index in the caller's instance list.
    Instance {
        /// The mesh instance index.
        index: u32,
    },
}

impl LeafPayload {
    /// Returns the number of items this payload refers to.
    pub fn item_count(&self) -> usize {
        match *self {
            LeafPayload::Range { count, .. } => count as usize,
            LeafPayload::Instance { .. } => 1,
        }
    }
}

/// Distinguishes internal nodes from leaves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BvhNodeKind {
    /// Inner node.
    Internal {
        /// Index of the left subtree's root node.
        left: usize,

        /// Index of the right subtree's root node.
        right: usize,
    },
    /// Leaf node.
    Leaf(LeafPayload),
}

/// A node in a [`Bvh`]. Every node stores its own bounds, the union of all item boxes below it.
///
/// Child indices point into the same flat node array. They are only stable within one build
/// until the array is appended to another one by
/// [`append_and_offset`](../compose/fn.append_and_offset.html).
///
/// [`Bvh`]: struct.Bvh.html
///
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvhNode {
    /// The bounds of this node.
    pub aabb: Aabb,

    /// Whether this node is internal or a leaf.
    pub kind: BvhNodeKind,
}

impl BvhNode {
    /// Creates an internal node. The children are usually unknown when the node is first
    /// appended and get filled in by [`BvhNode::set_children`].
    pub fn internal(aabb: Aabb, left: usize, right: usize) -> BvhNode {
        BvhNode {
            aabb,
            kind: BvhNodeKind::Internal { left, right },
        }
    }

    /// Creates a leaf node.
    pub fn leaf(aabb: Aabb, payload: LeafPayload) -> BvhNode {
        BvhNode {
            aabb,
            kind: BvhNodeKind::Leaf(payload),
        }
    }

    /// Returns true if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BvhNodeKind::Leaf(_))
    }

    /// Returns the indices of both children, or `None` for leaves.
    pub fn children(&self) -> Option<(usize, usize)> {
        match self.kind {
            BvhNodeKind::Internal { left, right } => Some((left, right)),
            BvhNodeKind::Leaf(_) => None,
        }
    }

    /// Returns the index of the left child node.
    pub fn child_l(&self) -> usize {
        match self.kind {
            BvhNodeKind::Internal { left, .. } => left,
            _ => panic!("Tried to get the left child of a leaf node."),
        }
    }

    /// Returns the index of the right child node.
    pub fn child_r(&self) -> usize {
        match self.kind {
            BvhNodeKind::Internal { right, .. } => right,
            _ => panic!("Tried to get the right child of a leaf node."),
        }
    }

    /// Turns this node into an internal node with the given children.
    pub fn set_children(&mut self, left: usize, right: usize) {
        self.kind = BvhNodeKind::Internal { left, right };
    }

    /// Returns the leaf payload, or `None` for internal nodes.
    pub fn leaf_payload(&self) -> Option<LeafPayload> {
        match self.kind {
            BvhNodeKind::Leaf(payload) => Some(payload),
            BvhNodeKind::Internal { .. } => None,
        }
    }

    /// Returns the leaf payload.
    pub fn payload(&self) -> LeafPayload {
        match self.kind {
            BvhNodeKind::Leaf(payload) => payload,
            _ => panic!("Tried to get the payload of an internal node."),
        }
    }

    /// Sets the leaf payload. This is what leaf callbacks use to attach their own data.
    pub fn set_payload(&mut self, payload: LeafPayload) {
        match self.kind {
            BvhNodeKind::Leaf(ref mut current) => *current = payload,
            _ => panic!("Tried to set the payload of an internal node."),
        }
    }
}
