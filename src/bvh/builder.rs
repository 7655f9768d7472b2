//! The recursive partitioning engine.

use std::time::Instant;

use log::{debug, trace};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::aabb::Aabb;
use crate::axis::Axis;
use crate::bounding_hierarchy::BHShape;
use crate::bvh::{
    BuildConfig, BuildStats, Bvh, BvhNode, LeafPayload, SplitScore, SplitStrategy,
    SurfaceAreaHeuristic,
};
use crate::utils::joint_aabb_of_shapes;
use crate::Real;

/// A split plane together with its score.
#[derive(Debug, Copy, Clone, PartialEq)]
struct SplitCandidate {
    axis: Axis,
    split_point: Real,
    score: SplitScore,
}

/// Builds [`Bvh`]s by recursively partitioning items with a [`SplitStrategy`].
///
/// Every node searches split planes on all three axes. Planes are spaced evenly over the node's
/// bounds and scored in parallel (with the `rayon` feature); the cheapest plane wins if it is
/// strictly cheaper than keeping the node as a leaf.
///
/// # Examples
/// ```
/// use scene_bvh::aabb::Aabb;
/// use scene_bvh::bvh::{BuildConfig, BvhBuilder};
/// use scene_bvh::Point3;
///
/// let boxes = (0..8)
///     .map(|i| {
///         let min = Point3::new(i as f32 * 2.0, 0.0, 0.0);
///         Aabb::with_bounds(min, Point3::new(min.x + 1.0, 1.0, 1.0))
///     })
///     .collect::<Vec<_>>();
///
/// let mut leaf_calls = 0;
/// let bvh = BvhBuilder::new(BuildConfig::default()).build(&boxes, |_node, items| {
///     assert_eq!(items.len(), 1);
///     leaf_calls += 1;
/// });
///
/// assert_eq!(leaf_calls, 8);
/// assert_eq!(bvh.len(), 15);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BvhBuilder<St = SurfaceAreaHeuristic> {
    config: BuildConfig,
    strategy: St,
}

impl BvhBuilder<SurfaceAreaHeuristic> {
    /// Creates a builder which scores splits with the [`SurfaceAreaHeuristic`].
    pub fn new(config: BuildConfig) -> BvhBuilder<SurfaceAreaHeuristic> {
        BvhBuilder::with_strategy(config, SurfaceAreaHeuristic)
    }
}

impl<St> BvhBuilder<St> {
    /// Creates a builder with a custom [`SplitStrategy`].
    pub fn with_strategy(config: BuildConfig, strategy: St) -> BvhBuilder<St> {
        BvhBuilder { config, strategy }
    }

    /// Returns the configuration used for every build.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Returns the split strategy.
    pub fn strategy(&self) -> &St {
        &self.strategy
    }
}

impl<St: SplitStrategy + Sync> BvhBuilder<St> {
    /// Builds a [`Bvh`] over `items`.
    ///
    /// `on_leaf` is called exactly once for every leaf, on the calling thread, with the leaf node
    /// and the complete list of items that ended up in it. It is the place to attach payload
    /// through [`BvhNode::set_payload`]; a leaf it leaves untouched keeps
    /// `LeafPayload::Range { first: 0, count }`.
    ///
    /// The returned nodes have the root at index zero, and every internal node is stored before
    /// its children.
    ///
    /// # Panics
    ///
    /// Panics if `items` is empty, if it holds more than `i32::MAX` items, or if
    /// `min_leaf_items` is zero.
    pub fn build<S, F>(&self, items: &[S], on_leaf: F) -> Bvh
    where
        S: BHShape + Sync,
        F: FnMut(&mut BvhNode, &[&S]),
    {
        assert!(!items.is_empty(), "Tried to build a BVH over zero items.");
        assert!(
            items.len() <= i32::MAX as usize,
            "Tried to build a BVH over {} items, more than a GPU index can address.",
            items.len()
        );
        assert!(
            self.config.min_leaf_items >= 1,
            "`min_leaf_items` must be at least one."
        );

        let start = Instant::now();
        let mut state = BuildState {
            config: &self.config,
            strategy: &self.strategy,
            on_leaf,
            nodes: Vec::with_capacity(items.len() * 2 - 1),
            stats: BuildStats::new(items.len()),
        };

        let work_list = items.iter().collect::<Vec<&S>>();
        let root = state.partition(work_list, 0);
        debug_assert_eq!(root, 0, "The root must be the first node.");

        let BuildState {
            nodes, mut stats, ..
        } = state;
        stats.nodes = nodes.len();
        debug_assert!(
            stats.is_complete(),
            "Leaves hold {} of {} items.",
            stats.partitioned_items,
            stats.total_items
        );

        debug!("Built BVH in {:?}: {}", start.elapsed(), stats);
        Bvh::new(nodes, stats)
    }
}

/// The mutable state of one build. Only the thread driving the recursion writes to it.
struct BuildState<'b, St, F> {
    config: &'b BuildConfig,
    strategy: &'b St,
    on_leaf: F,
    nodes: Vec<BvhNode>,
    stats: BuildStats,
}

impl<St: SplitStrategy + Sync, F> BuildState<'_, St, F> {
    /// Partitions `items` and returns the index of the node representing them.
    fn partition<S>(&mut self, items: Vec<&S>, depth: u32) -> usize
    where
        S: BHShape + Sync,
        F: FnMut(&mut BvhNode, &[&S]),
    {
        self.stats.max_depth = self.stats.max_depth.max(depth);
        let aabb = joint_aabb_of_shapes(&items);

        if items.len() <= self.config.min_leaf_items {
            return self.make_leaf(aabb, &items);
        }

        let base_cost = self.strategy.score_partition(&items);
        let candidates = split_candidates(self.config, &aabb, depth);
        self.stats.candidates_evaluated += candidates.len();

        let best = match find_best_split(self.strategy, &items, &candidates, base_cost) {
            Some(best) => best,
            None => {
                trace!(
                    "No split of {} items at depth {} beats cost {}, making a leaf.",
                    items.len(),
                    depth,
                    base_cost
                );
                return self.make_leaf(aabb, &items);
            }
        };

        // Scoring ran against a shared snapshot, so the items are only moved now.
        let (left, right): (Vec<&S>, Vec<&S>) = items
            .iter()
            .partition(|item| item.center()[best.axis] < best.split_point);
        if left.is_empty() || right.is_empty() {
            trace!(
                "Split along {} at {} leaves one side empty, making a leaf.",
                best.axis,
                best.split_point
            );
            return self.make_leaf(aabb, &items);
        }

        trace!(
            "Splitting {} items at depth {} along {} at {}: {} | {} (cost {} < {}).",
            items.len(),
            depth,
            best.axis,
            best.split_point,
            left.len(),
            right.len(),
            best.score.cost,
            base_cost
        );

        // The children are unknown until both subtrees are built.
        let node_index = self.push(BvhNode::internal(aabb, 0, 0));
        let child_l_index = self.partition(left, depth + 1);
        let child_r_index = self.partition(right, depth + 1);
        self.nodes[node_index].set_children(child_l_index, child_r_index);
        node_index
    }

    /// Hands `items` to the leaf callback and appends the resulting leaf.
    fn make_leaf<S>(&mut self, aabb: Aabb, items: &[&S]) -> usize
    where
        F: FnMut(&mut BvhNode, &[&S]),
    {
        let mut node = BvhNode::leaf(
            aabb,
            LeafPayload::Range {
                first: 0,
                count: items.len() as u32,
            },
        );
        (self.on_leaf)(&mut node, items);
        debug_assert!(node.is_leaf(), "The leaf callback must not add children.");

        self.stats.leaves += 1;
        self.stats.partitioned_items += items.len();
        self.push(node)
    }

    fn push(&mut self, node: BvhNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

/// Generates the split planes of a node, axis by axis, in increasing order along each axis.
///
/// Axes thinner than `min_side_length`, or whose step would be finer than `min_split_step`, are
/// skipped. The plane at the lower bound is never generated since no center can lie below it,
/// and every plane is generated at most once.
fn split_candidates(config: &BuildConfig, aabb: &Aabb, depth: u32) -> Vec<(Axis, Real)> {
    let mut candidates = Vec::new();
    for axis in Axis::ALL {
        let extent = aabb.extent(axis);
        if extent < config.min_side_length {
            continue;
        }

        let step = config.split_step(extent, depth);
        // Negated so that a NaN step is skipped as well.
        if !(step >= config.min_split_step) {
            continue;
        }

        let (min, max) = (aabb.min[axis], aabb.max[axis]);
        let mut previous = min;
        let mut i: u32 = 1;
        loop {
            let split_point = min + step * i as Real;
            if split_point >= max {
                break;
            }
            // Steps below the precision of `min` round onto the same plane.
            if split_point > previous {
                candidates.push((axis, split_point));
                previous = split_point;
            }
            i += 1;
        }
    }
    candidates
}

/// Scores every candidate and returns the cheapest one that is strictly cheaper than
/// `base_cost`. Ties keep the candidate that was generated first.
fn find_best_split<S, St>(
    strategy: &St,
    items: &[&S],
    candidates: &[(Axis, Real)],
    base_cost: Real,
) -> Option<SplitCandidate>
where
    S: BHShape + Sync,
    St: SplitStrategy + Sync,
{
    let score = |&(axis, split_point): &(Axis, Real)| SplitCandidate {
        axis,
        split_point,
        score: strategy.score_split(items, axis, split_point),
    };

    // Collecting keeps generation order, so the strict `<` below is deterministic.
    #[cfg(feature = "rayon")]
    let scored = candidates.par_iter().map(score).collect::<Vec<_>>();
    #[cfg(not(feature = "rayon"))]
    let scored = candidates.iter().map(score).collect::<Vec<_>>();

    let mut best = None;
    let mut best_cost = base_cost;
    for candidate in scored {
        if candidate.score.cost < best_cost {
            best_cost = candidate.score.cost;
            best = Some(candidate);
        }
    }
    best
}
