//! Two-level scene assembly: one bottom-level tree per mesh, one top-level tree over the mesh
//! instances, all composed into a single node buffer.
//!
//! The bottom-level trees come first in the buffer, in mesh order, followed by the top-level
//! tree. Bottom-level leaves are `Range`s into [`CompiledScene::primitive_indices`]. Top-level
//! leaves are `Instance`s, or `Range`s into [`CompiledScene::instance_indices`] when several
//! instances could not be told apart.

use std::time::Instant;

use anyhow::{ensure, Context, Result};
use log::{info, warn};

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::bvh::{BuildConfig, BuildStats, BvhBuilder, BvhNode, BvhNodeKind, LeafPayload};
use crate::compose::validate_layout;
use crate::flat_bvh::{pack_nodes, GpuBvhNode};
use crate::ray::Ray;
use crate::{Matrix4, Point3};

/// A triangle in mesh space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
    aabb: Aabb,
}

impl Triangle {
    pub fn new(a: Point3, b: Point3, c: Point3) -> Triangle {
        Triangle {
            a,
            b,
            c,
            aabb: Aabb::empty().grow(&a).grow(&b).grow(&c),
        }
    }
}

impl Bounded for Triangle {
    fn aabb(&self) -> Aabb {
        self.aabb
    }
}

impl BHShape for Triangle {}

/// A list of triangles sharing one bottom-level tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Mesh {
        Mesh { triangles }
    }

    /// Returns the joint [`Aabb`] of all triangles. Empty for a mesh without triangles.
    pub fn aabb(&self) -> Aabb {
        self.triangles
            .iter()
            .fold(Aabb::empty(), |aabb, triangle| aabb.join(&triangle.aabb))
    }
}

/// A placement of a [`Mesh`] in the world.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshInstance {
    /// Index of the instanced mesh.
    pub mesh: usize,

    /// Mesh to world transform.
    pub transform: Matrix4,

    /// Opaque material id, passed through to the renderer.
    pub material: u32,
}

impl MeshInstance {
    pub fn new(mesh: usize, transform: Matrix4) -> MeshInstance {
        MeshInstance {
            mesh,
            transform,
            material: 0,
        }
    }

    pub fn with_material(mut self, material: u32) -> MeshInstance {
        self.material = material;
        self
    }

    /// Returns the world space bounds of this instance of `mesh`.
    pub fn world_aabb(&self, mesh: &Mesh) -> Aabb {
        mesh.aabb().transform(&self.transform)
    }
}

/// An item of either level: an index into the caller's list and its bounds.
#[derive(Debug, Copy, Clone)]
struct IndexedBounds {
    index: u32,
    aabb: Aabb,
}

impl Bounded for IndexedBounds {
    fn aabb(&self) -> Aabb {
        self.aabb
    }
}

impl BHShape for IndexedBounds {}

/// Compiles meshes and their instances into one [`CompiledScene`].
#[derive(Debug, Clone, Default)]
pub struct SceneCompiler {
    blas_builder: BvhBuilder,
    tlas_builder: BvhBuilder,
}

impl SceneCompiler {
    /// Creates a compiler with separate configurations for the bottom-level trees (one per
    /// mesh) and the top-level tree (over the instances).
    pub fn new(blas_config: BuildConfig, tlas_config: BuildConfig) -> SceneCompiler {
        SceneCompiler {
            blas_builder: BvhBuilder::new(blas_config),
            tlas_builder: BvhBuilder::new(tlas_config),
        }
    }

    /// Builds a tree for every mesh with triangles and one over `instances`, and composes them.
    ///
    /// # Panics
    ///
    /// Panics if `instances` is empty, or if an instance refers to a mesh that does not exist
    /// or has no triangles.
    pub fn compile(&self, meshes: &[Mesh], instances: &[MeshInstance]) -> CompiledScene {
        assert!(
            !instances.is_empty(),
            "Tried to compile a scene without mesh instances."
        );
        for (index, instance) in instances.iter().enumerate() {
            assert!(
                instance.mesh < meshes.len(),
                "Instance {} refers to mesh {}, but there are only {} meshes.",
                index,
                instance.mesh,
                meshes.len()
            );
            assert!(
                !meshes[instance.mesh].triangles.is_empty(),
                "Instance {} refers to mesh {}, which has no triangles.",
                index,
                instance.mesh
            );
        }

        let start = Instant::now();
        let mut nodes = Vec::new();
        let mut primitive_indices = Vec::new();
        let mut mesh_roots = Vec::with_capacity(meshes.len());
        let mut blas_stats = Vec::with_capacity(meshes.len());

        for (mesh_index, mesh) in meshes.iter().enumerate() {
            if mesh.triangles.is_empty() {
                warn!("Skipping mesh {} without triangles.", mesh_index);
                mesh_roots.push(None);
                blas_stats.push(None);
                continue;
            }

            let items = mesh
                .triangles
                .iter()
                .enumerate()
                .map(|(index, triangle)| IndexedBounds {
                    index: index as u32,
                    aabb: triangle.aabb(),
                })
                .collect::<Vec<_>>();
            let bvh = self.blas_builder.build(&items, |node, leaf_items| {
                node.set_payload(LeafPayload::Range {
                    first: primitive_indices.len() as u32,
                    count: leaf_items.len() as u32,
                });
                primitive_indices.extend(leaf_items.iter().map(|item| item.index));
            });

            blas_stats.push(Some(*bvh.stats()));
            mesh_roots.push(Some(bvh.append_to(&mut nodes)));
        }

        let items = instances
            .iter()
            .enumerate()
            .map(|(index, instance)| IndexedBounds {
                index: index as u32,
                aabb: instance.world_aabb(&meshes[instance.mesh]),
            })
            .collect::<Vec<_>>();
        let mut instance_indices = Vec::new();
        let tlas = self.tlas_builder.build(&items, |node, leaf_items| {
            if let [item] = leaf_items {
                node.set_payload(LeafPayload::Instance { index: item.index });
            } else {
                node.set_payload(LeafPayload::Range {
                    first: instance_indices.len() as u32,
                    count: leaf_items.len() as u32,
                });
                instance_indices.extend(leaf_items.iter().map(|item| item.index));
            }
        });

        let tlas_stats = *tlas.stats();
        let tlas_root = tlas.append_to(&mut nodes);

        info!(
            "Compiled {} meshes and {} instances into {} nodes in {:?}.",
            meshes.len(),
            instances.len(),
            nodes.len(),
            start.elapsed()
        );

        CompiledScene {
            nodes,
            primitive_indices,
            instance_indices,
            mesh_roots,
            tlas_root,
            blas_stats,
            tlas_stats,
        }
    }
}

/// The composed node buffer of a scene and the tables its leaves refer to.
#[derive(Debug, Clone)]
pub struct CompiledScene {
    /// All bottom-level trees in mesh order, followed by the top-level tree.
    pub nodes: Vec<BvhNode>,

    /// Mesh-local triangle indices, referenced by bottom-level `Range` leaves.
    pub primitive_indices: Vec<u32>,

    /// Instance indices, referenced by top-level `Range` leaves.
    pub instance_indices: Vec<u32>,

    /// Root node of every mesh's tree. `None` for meshes without triangles.
    pub mesh_roots: Vec<Option<usize>>,

    /// Root node of the top-level tree.
    pub tlas_root: usize,

    /// Statistics of every mesh's build. `None` for meshes without triangles.
    pub blas_stats: Vec<Option<BuildStats>>,

    /// Statistics of the top-level build.
    pub tlas_stats: BuildStats,
}

impl CompiledScene {
    /// Packs every node into its GPU layout.
    pub fn pack(&self) -> Vec<GpuBvhNode> {
        pack_nodes(&self.nodes)
    }

    /// Checks the packed buffer and that all recorded roots lie inside it.
    pub fn validate(&self) -> Result<()> {
        validate_layout(&self.pack()).context("Compiled scene has a broken node layout")?;
        ensure!(
            self.tlas_root < self.nodes.len(),
            "Top-level root {} is out of bounds of {} nodes.",
            self.tlas_root,
            self.nodes.len()
        );
        for (mesh, root) in self.mesh_roots.iter().enumerate() {
            if let Some(root) = *root {
                ensure!(
                    root < self.tlas_root,
                    "Root {} of mesh {} is not stored before the top-level tree.",
                    root,
                    mesh
                );
            }
        }
        Ok(())
    }

    /// Walks the scene the way a GPU kernel would and returns `(instance, triangle)` for every
    /// triangle in a bottom-level leaf whose bounds are hit by `ray`.
    ///
    /// `instances` must be the list the scene was compiled from. Instances whose transform
    /// cannot be inverted are skipped.
    pub fn traverse(&self, ray: &Ray, instances: &[MeshInstance]) -> Vec<(usize, u32)> {
        let mut hits = Vec::new();
        let mut stack = vec![self.tlas_root];
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
                BvhNodeKind::Leaf(LeafPayload::Instance { index }) => {
                    self.traverse_instance(ray, index as usize, instances, &mut hits);
                }
                BvhNodeKind::Leaf(LeafPayload::Range { first, count }) => {
                    let range = first as usize..first as usize + count as usize;
                    for &index in &self.instance_indices[range] {
                        self.traverse_instance(ray, index as usize, instances, &mut hits);
                    }
                }
            }
        }
        hits
    }

    fn traverse_instance(
        &self,
        ray: &Ray,
        instance_index: usize,
        instances: &[MeshInstance],
        hits: &mut Vec<(usize, u32)>,
    ) {
        let instance = &instances[instance_index];
        let (root, inverse) = match (
            self.mesh_roots[instance.mesh],
            instance.transform.try_inverse(),
        ) {
            (Some(root), Some(inverse)) => (root, inverse),
            _ => return,
        };
        let local_ray = ray.transform(&inverse);

        let mut stack = vec![root];
        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            if !local_ray.intersects_aabb(&node.aabb) {
                continue;
            }
            match node.kind {
                BvhNodeKind::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
                BvhNodeKind::Leaf(LeafPayload::Range { first, count }) => {
                    let range = first as usize..first as usize + count as usize;
                    hits.extend(
                        self.primitive_indices[range]
                            .iter()
                            .map(|&triangle| (instance_index, triangle)),
                    );
                }
                BvhNodeKind::Leaf(LeafPayload::Instance { .. }) => {
                    unreachable!("Bottom-level trees only hold primitive ranges.")
                }
            }
        }
    }
}
