use std::fmt;

/// Counters collected while building one [`Bvh`](struct.Bvh.html).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildStats {
    /// Number of items handed to the builder.
    pub total_items: usize,

    /// Number of nodes emitted, internal nodes and leaves.
    pub nodes: usize,

    /// Number of leaves emitted.
    pub leaves: usize,

    /// Number of items handed to leaf callbacks. Equals `total_items` once a build finished.
    pub partitioned_items: usize,

    /// Deepest recursion level reached. The root is at depth zero.
    pub max_depth: u32,

    /// Number of split candidates that were scored.
    pub candidates_evaluated: usize,
}

impl BuildStats {
    pub(crate) fn new(total_items: usize) -> BuildStats {
        BuildStats {
            total_items,
            ..Default::default()
        }
    }

    /// Returns the number of internal nodes.
    pub fn internal_nodes(&self) -> usize {
        self.nodes - self.leaves
    }

    /// Returns true if every input item ended up in exactly one leaf.
    pub fn is_complete(&self) -> bool {
        self.partitioned_items == self.total_items
    }
}

impl fmt::Display for BuildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "items={} nodes={} leaves={} partitioned={} max_depth={} candidates={}",
            self.total_items,
            self.nodes,
            self.leaves,
            self.partitioned_items,
            self.max_depth,
            self.candidates_evaluated
        )
    }
}
