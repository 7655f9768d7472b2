//! Split-scoring strategies. The builder only ever asks two questions: what does it cost to keep
//! a work-list as one leaf, and what does it cost to split it along an axis at a given point.

use crate::aabb::Aabb;
use crate::axis::Axis;
use crate::bounding_hierarchy::BHShape;
use crate::utils::joint_aabb_of_shapes;
use crate::Real;

/// The outcome of scoring one split plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SplitScore {
    /// Number of items whose center lies strictly below the split point.
    pub left_count: usize,

    /// Number of the remaining items.
    pub right_count: usize,

    /// The estimated cost of the split. Lower is better.
    pub cost: Real,
}

impl SplitScore {
    /// Returns true if both sides of the split received at least one item.
    pub fn is_proper(&self) -> bool {
        self.left_count > 0 && self.right_count > 0
    }
}

/// A policy which scores candidate splits of a work-list.
///
/// Implementations must be pure: the builder scores many candidates of the same work-list
/// concurrently and compares the results with a strict `<`, so a split only wins if it is
/// strictly cheaper than [`SplitStrategy::score_partition`] of the same work-list.
pub trait SplitStrategy {
    /// Returns the cost of treating the whole work-list as one leaf.
    /// An empty work-list costs the maximum representable value.
    fn score_partition<S: BHShape>(&self, items: &[&S]) -> Real;

    /// Scores splitting `items` into those whose center along `axis` lies below `split_point`
    /// and the rest. Splits that leave one side empty must cost positive infinity.
    fn score_split<S: BHShape>(&self, items: &[&S], axis: Axis, split_point: Real) -> SplitScore;
}

/// The Surface Area Heuristic: the cost of a set of items is their count times the surface area
/// of their joint [`Aabb`]. Holds no state.
///
/// # Examples
/// ```
/// use scene_bvh::aabb::Aabb;
/// use scene_bvh::axis::Axis;
/// use scene_bvh::bvh::{SplitStrategy, SurfaceAreaHeuristic};
/// use scene_bvh::Point3;
///
/// let a = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
/// let b = Aabb::with_bounds(Point3::new(4.0, 0.0, 0.0), Point3::new(5.0, 1.0, 1.0));
/// let items = [&a, &b];
///
/// let sah = SurfaceAreaHeuristic;
/// let split = sah.score_split(&items, Axis::X, 2.5);
///
/// assert_eq!((split.left_count, split.right_count), (1, 1));
/// assert!(split.cost < sah.score_partition(&items));
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SurfaceAreaHeuristic;

impl SplitStrategy for SurfaceAreaHeuristic {
    fn score_partition<S: BHShape>(&self, items: &[&S]) -> Real {
        if items.is_empty() {
            return Real::MAX;
        }
        items.len() as Real * joint_aabb_of_shapes(items).surface_area()
    }

    fn score_split<S: BHShape>(&self, items: &[&S], axis: Axis, split_point: Real) -> SplitScore {
        let mut left_count = 0;
        let mut left_aabb = Aabb::empty();
        let mut right_count = 0;
        let mut right_aabb = Aabb::empty();

        for item in items {
            let (count, aabb) = if item.center()[axis] < split_point {
                (&mut left_count, &mut left_aabb)
            } else {
                (&mut right_count, &mut right_aabb)
            };
            *count += 1;
            aabb.join_mut(&item.aabb());
        }

        let cost = if left_count == 0 || right_count == 0 {
            Real::INFINITY
        } else {
            left_count as Real * left_aabb.surface_area()
                + right_count as Real * right_aabb.surface_area()
        };

        SplitScore {
            left_count,
            right_count,
            cost,
        }
    }
}
