#![no_main]
use std::fmt::{self, Debug, Formatter};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ordered_float::NotNan;
use scene_bvh::aabb::{Aabb, Bounded};
use scene_bvh::bounding_hierarchy::BHShape;
use scene_bvh::bvh::{BuildConfig, BvhBuilder, LeafPayload};
use scene_bvh::compose::{append_and_offset, validate_layout};
use scene_bvh::flat_bvh::traverse_flat_bvh;
use scene_bvh::ray::Ray;
use scene_bvh::{Point3, Real, Vector3};

const LIMIT: Real = 1_000_000.0;

fuzz_target!(|workload: Workload| {
    workload.fuzz();
});

#[derive(Arbitrary)]
struct ArbitraryPoint {
    coordinates: [NotNan<Real>; 3],
}

impl ArbitraryPoint {
    fn point(&self) -> Point3 {
        Point3::from(
            self.coordinates
                .map(|f| f.into_inner().clamp(-LIMIT, LIMIT)),
        )
    }
}

#[derive(Arbitrary)]
struct ArbitraryShape {
    a: ArbitraryPoint,
    b: ArbitraryPoint,
}

impl Debug for ArbitraryShape {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.aabb(), f)
    }
}

impl Bounded for ArbitraryShape {
    fn aabb(&self) -> Aabb {
        Aabb::empty().grow(&self.a.point()).grow(&self.b.point())
    }
}

impl BHShape for ArbitraryShape {}

#[derive(Arbitrary)]
struct ArbitraryRay {
    origin: ArbitraryPoint,
    destination: ArbitraryPoint,
}

impl Debug for ArbitraryRay {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.ray(), f)
    }
}

impl ArbitraryRay {
    fn ray(&self) -> Ray {
        let direction = self.destination.point() - self.origin.point();
        // Ensure no degenerate direction.
        if direction.magnitude() < 0.5 {
            Ray::new(self.origin.point(), Vector3::new(1.0, 1.0, 1.0))
        } else {
            Ray::new(self.origin.point(), direction)
        }
    }
}

#[derive(Debug, Arbitrary)]
struct ArbitraryConfig {
    min_leaf_items: u8,
    split_resolution: u16,
}

impl ArbitraryConfig {
    fn config(&self) -> BuildConfig {
        BuildConfig::default()
            .with_min_leaf_items(self.min_leaf_items.max(1) as usize)
            .with_split_resolution(self.split_resolution.max(1) as Real)
    }
}

#[derive(Debug, Arbitrary)]
struct Workload {
    shapes: Vec<ArbitraryShape>,
    second: Vec<ArbitraryShape>,
    config: ArbitraryConfig,
    ray: ArbitraryRay,
}

impl Workload {
    fn fuzz(self) {
        if self.shapes.is_empty() || self.shapes.len() > 256 || self.second.len() > 256 {
            return;
        }
        let builder = BvhBuilder::new(self.config.config());
        let ray = self.ray.ray();

        // Every item must land in exactly one leaf which bounds it.
        let mut seen = vec![0usize; self.shapes.len()];
        let bvh = builder.build(&self.shapes, |node, items| {
            for item in items {
                let index = self
                    .shapes
                    .iter()
                    .position(|shape| std::ptr::eq(shape, *item))
                    .unwrap();
                seen[index] += 1;
                assert!(node.aabb.contains_aabb(&item.aabb()));
            }
        });
        assert!(seen.iter().all(|&count| count == 1), "{:?}", seen);
        assert!(bvh.stats().is_complete());
        bvh.assert_consistent();
        bvh.assert_tight();

        // The packed walk must agree with the walk over the node array.
        let packed = bvh.pack();
        let expected = bvh
            .traverse(&ray)
            .into_iter()
            .map(|(_, payload)| payload)
            .collect::<Vec<LeafPayload>>();
        assert_eq!(traverse_flat_bvh(&packed, 0, &ray), expected);

        // A second tree appended after the first must still resolve on its own.
        if !self.second.is_empty() {
            let other = builder.build(&self.second, |_, _| {});
            let mut nodes = packed.clone();
            let root = append_and_offset(&mut nodes, other.pack());
            assert_eq!(root, packed.len());
            validate_layout(&nodes).unwrap();
            assert_eq!(
                traverse_flat_bvh(&nodes, root, &ray),
                other
                    .traverse(&ray)
                    .into_iter()
                    .map(|(_, payload)| payload)
                    .collect::<Vec<LeafPayload>>()
            );
        }
    }
}
