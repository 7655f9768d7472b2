use crate::{Real, EPSILON};

/// Parameters of a single BVH build.
///
/// # Examples
/// ```
/// use scene_bvh::bvh::BuildConfig;
///
/// let config = BuildConfig::default().with_min_leaf_items(4);
/// assert_eq!(config.min_leaf_items, 4);
/// assert_eq!(config.split_resolution, 1024.0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildConfig {
    /// Work-lists of at most this many items become leaves without being scored.
    /// Must be at least one.
    pub min_leaf_items: usize,

    /// Axes along which a node is thinner than this are never split.
    pub min_side_length: Real,

    /// Axes whose candidate step would be smaller than this are never split.
    pub min_split_step: Real,

    /// Number of split candidates per axis at the root. At depth `d` an axis gets
    /// `split_resolution / (d + 1)` candidates relative to its extent, so the many small nodes
    /// deep in the tree are searched more coarsely than the few large ones near the root.
    pub split_resolution: Real,
}

impl Default for BuildConfig {
    fn default() -> BuildConfig {
        BuildConfig {
            min_leaf_items: 1,
            min_side_length: EPSILON,
            min_split_step: 1e-7,
            split_resolution: 1024.0,
        }
    }
}

impl BuildConfig {
    /// Sets [`BuildConfig::min_leaf_items`].
    pub fn with_min_leaf_items(mut self, min_leaf_items: usize) -> BuildConfig {
        self.min_leaf_items = min_leaf_items;
        self
    }

    /// Sets [`BuildConfig::min_side_length`].
    pub fn with_min_side_length(mut self, min_side_length: Real) -> BuildConfig {
        self.min_side_length = min_side_length;
        self
    }

    /// Sets [`BuildConfig::min_split_step`].
    pub fn with_min_split_step(mut self, min_split_step: Real) -> BuildConfig {
        self.min_split_step = min_split_step;
        self
    }

    /// Sets [`BuildConfig::split_resolution`].
    pub fn with_split_resolution(mut self, split_resolution: Real) -> BuildConfig {
        self.split_resolution = split_resolution;
        self
    }

    /// Returns the distance between two split candidates along an axis with the given extent.
    pub(crate) fn split_step(&self, extent: Real, depth: u32) -> Real {
        extent / (self.split_resolution / (depth as Real + 1.0))
    }
}

#[cfg(test)]
mod tests {
    use crate::bvh::BuildConfig;
    use float_eq::assert_float_eq;

    #[test]
    fn test_split_step_grows_with_depth() {
        let config = BuildConfig::default();
        let root = config.split_step(1024.0, 0);
        let deeper = config.split_step(1024.0, 3);
        assert_float_eq!(root, 1.0, abs <= 1e-6);
        assert_float_eq!(deeper, 4.0, abs <= 1e-6);
    }

    #[test]
    fn test_setters() {
        let config = BuildConfig::default()
            .with_min_leaf_items(2)
            .with_min_side_length(0.5)
            .with_min_split_step(0.25)
            .with_split_resolution(16.0);
        assert_eq!(config.min_leaf_items, 2);
        assert_eq!(config.min_side_length, 0.5);
        assert_eq!(config.min_split_step, 0.25);
        assert_eq!(config.split_resolution, 16.0);
    }
}
