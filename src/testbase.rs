//! Common utilities shared by unit tests.
#![cfg(test)]

use std::ops::Range;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::bvh::{BuildConfig, Bvh, BvhBuilder};
use crate::scene::{Mesh, Triangle};
use crate::{Point3, Vector3};

/// A vector represented as a tuple
pub type TupleVec = (f32, f32, f32);

/// Generate a `TupleVec` for [`proptest::strategy::Strategy`] with whole-numbered components
/// from -1000 to 1000. Whole numbers keep box centers and joins exact in single precision.
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (-1000i32..1000, -1000i32..1000, -1000i32..1000)
        .prop_map(|(x, y, z)| (x as f32, y as f32, z as f32))
}

/// Convert a `TupleVec` to a [`Point3`].
pub fn tuple_to_point(tpl: &TupleVec) -> Point3 {
    Point3::new(tpl.0, tpl.1, tpl.2)
}

/// Convert a `TupleVec` to a [`Vector3`].
pub fn tuple_to_vector(tpl: &TupleVec) -> Vector3 {
    Vector3::new(tpl.0, tpl.1, tpl.2)
}

/// Define some `Bounded` structure.
#[derive(Debug, Clone)]
pub struct UnitBox {
    pub id: i32,
    pub pos: Point3,
}

impl UnitBox {
    pub fn new(id: i32, pos: Point3) -> UnitBox {
        UnitBox { id, pos }
    }
}

/// `UnitBox`'s `Aabb`s are unit `Aabb`s centered on the box's position.
impl Bounded for UnitBox {
    fn aabb(&self) -> Aabb {
        let min = self.pos + Vector3::new(-0.5, -0.5, -0.5);
        let max = self.pos + Vector3::new(0.5, 0.5, 0.5);
        Aabb::with_bounds(min, max)
    }
}

impl BHShape for UnitBox {}

/// Generate 21 `UnitBox`s along the X axis centered on whole numbers (-10,9,..,10).
/// The index is set to the rounded x-coordinate of the box center.
pub fn generate_aligned_boxes() -> Vec<UnitBox> {
    (-10..11)
        .map(|x| UnitBox::new(x, Point3::new(x as f32, 0.0, 0.0)))
        .collect()
}

/// Four `UnitBox`s on the corners of a 2 x 2 square in the XY plane. Ids count along X first.
pub fn quadrant_boxes() -> Vec<UnitBox> {
    vec![
        UnitBox::new(0, Point3::new(0.0, 0.0, 0.0)),
        UnitBox::new(1, Point3::new(2.0, 0.0, 0.0)),
        UnitBox::new(2, Point3::new(0.0, 2.0, 0.0)),
        UnitBox::new(3, Point3::new(2.0, 2.0, 0.0)),
    ]
}

/// Generates lists of `UnitBox`s with ids matching their position in the list.
pub fn unit_boxes_strategy(size: Range<usize>) -> impl Strategy<Value = Vec<UnitBox>> {
    prop::collection::vec(tuplevec_small_strategy(), size).prop_map(|points| {
        points
            .iter()
            .enumerate()
            .map(|(id, point)| UnitBox::new(id as i32, tuple_to_point(point)))
            .collect()
    })
}

/// Builds a [`Bvh`] over `boxes` and returns it together with the ids of every leaf, in the
/// order the leaves were emitted.
pub fn build_collecting_ids(boxes: &[UnitBox], config: BuildConfig) -> (Bvh, Vec<Vec<i32>>) {
    let mut leaves: Vec<Vec<i32>> = Vec::new();
    let bvh = BvhBuilder::new(config).build(boxes, |_, items| {
        leaves.push(items.iter().map(|unit_box| unit_box.id).collect());
    });
    (bvh, leaves)
}

/// Creates a unit size cube centered at `pos` and pushes the triangles to `shapes`.
pub fn push_cube(pos: Point3, shapes: &mut Vec<Triangle>) {
    let top_front_right = pos + Vector3::new(0.5, 0.5, -0.5);
    let top_back_right = pos + Vector3::new(0.5, 0.5, 0.5);
    let top_back_left = pos + Vector3::new(-0.5, 0.5, 0.5);
    let top_front_left = pos + Vector3::new(-0.5, 0.5, -0.5);
    let bottom_front_right = pos + Vector3::new(0.5, -0.5, -0.5);
    let bottom_back_right = pos + Vector3::new(0.5, -0.5, 0.5);
    let bottom_back_left = pos + Vector3::new(-0.5, -0.5, 0.5);
    let bottom_front_left = pos + Vector3::new(-0.5, -0.5, -0.5);

    shapes.push(Triangle::new(top_back_right, top_front_right, top_front_left));
    shapes.push(Triangle::new(top_front_left, top_back_left, top_back_right));
    shapes.push(Triangle::new(bottom_front_left, bottom_front_right, bottom_back_right));
    shapes.push(Triangle::new(bottom_back_right, bottom_back_left, bottom_front_left));
    shapes.push(Triangle::new(top_back_left, top_front_left, bottom_front_left));
    shapes.push(Triangle::new(bottom_front_left, bottom_back_left, top_back_left));
    shapes.push(Triangle::new(bottom_front_right, top_front_right, top_back_right));
    shapes.push(Triangle::new(top_back_right, bottom_back_right, bottom_front_right));
    shapes.push(Triangle::new(top_front_left, top_front_right, bottom_front_right));
    shapes.push(Triangle::new(bottom_front_right, bottom_front_left, top_front_left));
    shapes.push(Triangle::new(bottom_back_right, top_back_right, top_back_left));
    shapes.push(Triangle::new(top_back_left, bottom_back_left, bottom_back_right));
}

/// A [`Mesh`] made of one unit cube centered at the origin.
pub fn unit_cube_mesh() -> Mesh {
    let mut triangles = Vec::new();
    push_cube(Point3::origin(), &mut triangles);
    Mesh::new(triangles)
}

/// A [`Mesh`] made of `n` unit cubes in a row along the X axis, two units apart.
pub fn cube_row_mesh(n: usize) -> Mesh {
    let mut triangles = Vec::new();
    for i in 0..n {
        push_cube(Point3::new(i as f32 * 2.0, 0.0, 0.0), &mut triangles);
    }
    Mesh::new(triangles)
}

/// Creates `n` deterministic random triangles no larger than 20 units inside +-1000.
pub fn random_triangles(n: usize, seed: u64) -> Vec<Triangle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let next_point = |rng: &mut StdRng, extent: f32| {
        Vector3::new(
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
        )
    };

    (0..n)
        .map(|_| {
            let a = Point3::from(next_point(&mut rng, 1000.0));
            let b = a + next_point(&mut rng, 10.0);
            let c = a + next_point(&mut rng, 10.0);
            Triangle::new(a, b, c)
        })
        .collect()
}
