//! This module defines the [`Bvh`] itself: its construction, its queries and
//! the checks used to validate a built tree.

use std::collections::HashSet;
use std::time::Instant;

use log::{debug, log_enabled, Level};

use crate::aabb::{Aabb, IntersectsAabb};
use crate::bounding_hierarchy::{BHShape, BoundingHierarchy};
use crate::bvh::bvh_node::{BvhNode, BvhNodeBuildArgs};
use crate::bvh::iter::{BvhTraverseIterator, NodeStack};
use crate::hit::HitRecord;
use crate::ray::Ray;
use crate::Real;

/// The [`Bvh`] data structure. Contains the list of [`BvhNode`]s.
///
/// The root is node 0. A tree over `n` shapes has `2n - 1` nodes; an empty
/// tree has none.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bvh {
    /// The list of nodes of the [`Bvh`].
    pub nodes: Vec<BvhNode>,
}

impl Bvh {
    /// Creates a new [`Bvh`] from the `shapes` slice.
    ///
    /// `shapes` is partially reordered by the build. Leaves refer to shapes by their
    /// index in the reordered slice, which is why every query takes the slice again.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::bvh::Bvh;
    /// use tracebvh::shapes::{Primitive, Sphere};
    /// use tracebvh::{Point3, Real};
    ///
    /// let mut shapes: Vec<Primitive> = (0..8)
    ///     .map(|i| Sphere::new(Point3::new(i as Real, 0.0, 0.0), 0.4, i).unwrap().into())
    ///     .collect();
    ///
    /// let bvh = Bvh::build(&mut shapes);
    /// assert_eq!(bvh.len(), 15);
    /// assert_eq!(bvh.depth(), 3);
    /// assert!(bvh.is_consistent(&shapes));
    /// ```
    pub fn build<Shape: BHShape>(shapes: &mut [Shape]) -> Bvh {
        let start = Instant::now();
        let mut nodes = vec![BvhNode::placeholder(); node_count_for(shapes.len())];
        if !shapes.is_empty() {
            BvhNode::build(BvhNodeBuildArgs {
                shapes,
                shape_offset: 0,
                nodes: &mut nodes,
                node_offset: 0,
            });
        }
        let bvh = Bvh { nodes };
        bvh.log_build_stats(shapes.len(), start);
        bvh
    }

    /// Creates a new [`Bvh`] from the `shapes` slice, building large subtrees in
    /// parallel. The resulting tree and shape order are identical to [`Bvh::build`].
    ///
    /// # Examples
    /// ```
    /// use tracebvh::bvh::Bvh;
    /// use tracebvh::shapes::{Primitive, Sphere};
    /// use tracebvh::{Point3, Real};
    ///
    /// let spheres: Vec<Primitive> = (0..1000)
    ///     .map(|i| Sphere::new(Point3::new((i % 10) as Real, (i / 10 % 10) as Real, (i / 100) as Real), 0.4, i).unwrap().into())
    ///     .collect();
    ///
    /// let mut a = spheres.clone();
    /// let mut b = spheres.clone();
    /// assert_eq!(Bvh::build(&mut a), Bvh::build_par(&mut b));
    /// assert_eq!(a, b);
    /// ```
    #[cfg(feature = "rayon")]
    pub fn build_par<Shape: BHShape + Send>(shapes: &mut [Shape]) -> Bvh {
        let start = Instant::now();
        let mut nodes = vec![BvhNode::placeholder(); node_count_for(shapes.len())];
        if !shapes.is_empty() {
            BvhNode::build_par(BvhNodeBuildArgs {
                shapes,
                shape_offset: 0,
                nodes: &mut nodes,
                node_offset: 0,
            });
        }
        let bvh = Bvh { nodes };
        bvh.log_build_stats(shapes.len(), start);
        bvh
    }

    fn log_build_stats(&self, shape_count: usize, start: Instant) {
        // Computing the depth walks the whole tree.
        if !log_enabled!(Level::Debug) {
            return;
        }
        debug!(
            "built BVH over {} shapes: {} nodes, depth {}, took {:?}",
            shape_count,
            self.nodes.len(),
            self.depth(),
            start.elapsed()
        );
    }

    /// Returns the nearest hit of `ray` within `[t_min, t_max]`, or `None`.
    ///
    /// `shapes` must be the slice the tree was built from. The result is the one a
    /// linear scan over `shapes` with a shrinking `t_max` would produce.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::bvh::Bvh;
    /// use tracebvh::ray::Ray;
    /// use tracebvh::shapes::{Primitive, Sphere};
    /// use tracebvh::{Point3, Real, Vector3};
    ///
    /// let mut shapes: Vec<Primitive> = (0..8)
    ///     .map(|i| Sphere::new(Point3::new(0.0, 0.0, -2.0 * i as Real), 0.5, i).unwrap().into())
    ///     .collect();
    /// let bvh = Bvh::build(&mut shapes);
    ///
    /// let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
    /// let hit = bvh.hit(&ray, 0.001, Real::INFINITY, &shapes).unwrap();
    /// assert_eq!(hit.material_id, 0);
    /// assert!((hit.t - 9.5).abs() < 1e-5);
    ///
    /// // Everything beyond t_max is ignored.
    /// assert!(bvh.hit(&ray, 0.001, 9.0, &shapes).is_none());
    /// ```
    pub fn hit<Shape: BHShape>(
        &self,
        ray: &Ray,
        t_min: Real,
        t_max: Real,
        shapes: &[Shape],
    ) -> Option<HitRecord> {
        if self.nodes.is_empty() {
            return None;
        }
        BvhNode::hit(&self.nodes, 0, ray, t_min, t_max, shapes)
    }

    /// Same as [`Bvh::hit`], walking the tree with an explicit stack instead of recursion.
    pub fn hit_iterative<Shape: BHShape>(
        &self,
        ray: &Ray,
        t_min: Real,
        t_max: Real,
        shapes: &[Shape],
    ) -> Option<HitRecord> {
        let mut stack = NodeStack::new();
        if !self.nodes.is_empty() {
            stack.push(0);
        }

        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = t_max;
        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            if !ray.intersects_aabb(node.aabb()) {
                continue;
            }
            match *node {
                BvhNode::Leaf { shape_index, .. } => {
                    if let Some(hit) = shapes[shape_index].intersects_ray(ray, t_min, closest_so_far)
                    {
                        closest_so_far = hit.t;
                        closest = Some(hit);
                    }
                }
                BvhNode::Node {
                    child_l_index,
                    child_r_index,
                    ..
                } => {
                    stack.push(child_r_index);
                    stack.push(child_l_index);
                }
            }
        }
        closest
    }

    /// Traverses the [`Bvh`].
    /// Returns a subset of `shapes`, in which the [`Aabb`]s of the elements were hit by `query`.
    pub fn traverse<'a, Query: IntersectsAabb, Shape>(
        &'a self,
        query: &Query,
        shapes: &'a [Shape],
    ) -> Vec<&'a Shape> {
        let mut indices = Vec::new();
        self.traverse_recursive(0, query, &mut indices);
        indices.iter().map(|index| &shapes[*index]).collect()
    }

    fn traverse_recursive<Query: IntersectsAabb>(
        &self,
        node_index: usize,
        query: &Query,
        indices: &mut Vec<usize>,
    ) {
        let Some(node) = self.nodes.get(node_index) else {
            return;
        };
        if !query.intersects_aabb(node.aabb()) {
            return;
        }
        match *node {
            BvhNode::Leaf { shape_index, .. } => indices.push(shape_index),
            BvhNode::Node {
                child_l_index,
                child_r_index,
                ..
            } => {
                self.traverse_recursive(child_l_index, query, indices);
                self.traverse_recursive(child_r_index, query, indices);
            }
        }
    }

    /// Creates a [`BvhTraverseIterator`] to traverse the [`Bvh`].
    /// Returns a subset of `shapes`, in which the [`Aabb`]s of the elements were hit by `query`.
    pub fn traverse_iterator<'bvh, 'shape, Query: IntersectsAabb, Shape>(
        &'bvh self,
        query: &'bvh Query,
        shapes: &'shape [Shape],
    ) -> BvhTraverseIterator<'bvh, 'shape, Query, Shape> {
        BvhTraverseIterator::new(self, query, shapes)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` for the tree over no shapes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges on the longest path from the root to a leaf. 0 for an empty tree.
    pub fn depth(&self) -> u32 {
        if self.nodes.is_empty() {
            0
        } else {
            BvhNode::depth(&self.nodes, 0)
        }
    }

    /// Bounds of all shapes. Empty for an empty tree.
    pub fn root_aabb(&self) -> Aabb {
        self.nodes
            .first()
            .map_or_else(Aabb::empty, |root| *root.aabb())
    }

    /// Prints the [`Bvh`] in a tree-like visualization.
    pub fn pretty_print(&self) {
        if !self.nodes.is_empty() {
            self.print_node(0, 0);
        }
    }

    fn print_node(&self, node_index: usize, depth: usize) {
        let padding = " ".repeat(depth);
        match self.nodes[node_index] {
            BvhNode::Node {
                aabb,
                child_l_index,
                child_r_index,
            } => {
                println!("{}node={} {}", padding, node_index, aabb);
                println!("{}{} child_l", padding, child_l_index);
                self.print_node(child_l_index, depth + 1);
                println!("{}{} child_r", padding, child_r_index);
                self.print_node(child_r_index, depth + 1);
            }
            BvhNode::Leaf { aabb, shape_index } => {
                println!("{}node={} {}", padding, node_index, aabb);
                println!("{}shape\t{:?}", padding, shape_index);
            }
        }
    }

    /// Checks the subtree at `node_index` and returns its bounds, or `None` if
    /// anything is off. Records visited nodes and referenced shapes.
    fn is_consistent_subtree<Shape: BHShape>(
        &self,
        node_index: usize,
        visited_nodes: &mut HashSet<usize>,
        referenced_shapes: &mut HashSet<usize>,
        shapes: &[Shape],
    ) -> Option<Aabb> {
        if !visited_nodes.insert(node_index) {
            return None;
        }
        match *self.nodes.get(node_index)? {
            BvhNode::Leaf { aabb, shape_index } => {
                let shape = shapes.get(shape_index)?;
                let fresh = referenced_shapes.insert(shape_index);
                (fresh && aabb == shape.aabb()).then_some(aabb)
            }
            BvhNode::Node {
                aabb,
                child_l_index,
                child_r_index,
            } => {
                if child_l_index != node_index + 1 || child_r_index <= child_l_index {
                    return None;
                }
                let left =
                    self.is_consistent_subtree(child_l_index, visited_nodes, referenced_shapes, shapes)?;
                let right =
                    self.is_consistent_subtree(child_r_index, visited_nodes, referenced_shapes, shapes)?;
                (aabb == left.join(&right)).then_some(aabb)
            }
        }
    }

    /// Checks that every inner node's bounds are exactly the union of its children's,
    /// that every leaf's bounds are exactly its shape's, and that every node is reachable
    /// from the root while every shape is referenced by exactly one leaf.
    pub fn is_consistent<Shape: BHShape>(&self, shapes: &[Shape]) -> bool {
        if self.nodes.is_empty() {
            return shapes.is_empty();
        }
        if self.nodes.len() != node_count_for(shapes.len()) {
            return false;
        }

        let mut visited_nodes = HashSet::new();
        let mut referenced_shapes = HashSet::new();
        let subtree_consistent = self
            .is_consistent_subtree(0, &mut visited_nodes, &mut referenced_shapes, shapes)
            .is_some();

        // A node missing from the walk means a detached subtree.
        subtree_consistent
            && visited_nodes.len() == self.nodes.len()
            && referenced_shapes.len() == shapes.len()
    }

    /// Assert version of `is_consistent_subtree`.
    fn assert_consistent_subtree<Shape: BHShape>(
        &self,
        node_index: usize,
        node_count: &mut usize,
        shape_seen: &mut [bool],
        shapes: &[Shape],
    ) -> Aabb {
        *node_count += 1;
        match self.nodes[node_index] {
            BvhNode::Leaf { aabb, shape_index } => {
                assert!(
                    !shape_seen[shape_index],
                    "Shape {} is referenced by more than one leaf",
                    shape_index
                );
                shape_seen[shape_index] = true;
                let shape_aabb = shapes[shape_index].aabb();
                assert_eq!(
                    aabb, shape_aabb,
                    "Leaf {} does not match its shape.\n\tLeaf: {}\n\tShape: {}",
                    node_index, aabb, shape_aabb
                );
                aabb
            }
            BvhNode::Node {
                aabb,
                child_l_index,
                child_r_index,
            } => {
                assert_eq!(
                    child_l_index,
                    node_index + 1,
                    "Left child of node {} is not the next node",
                    node_index
                );
                let left = self.assert_consistent_subtree(child_l_index, node_count, shape_seen, shapes);
                let right = self.assert_consistent_subtree(child_r_index, node_count, shape_seen, shapes);
                let joint = left.join(&right);
                assert_eq!(
                    aabb, joint,
                    "Node {} is not the union of its children.\n\tStored: {}\n\tUnion: {}",
                    node_index, aabb, joint
                );
                aabb
            }
        }
    }

    /// Assert version of `is_consistent`.
    pub fn assert_consistent<Shape: BHShape>(&self, shapes: &[Shape]) {
        assert_eq!(
            self.nodes.len(),
            node_count_for(shapes.len()),
            "Wrong number of nodes for {} shapes",
            shapes.len()
        );
        if self.nodes.is_empty() {
            return;
        }

        let mut node_count = 0;
        let mut shape_seen = vec![false; shapes.len()];
        self.assert_consistent_subtree(0, &mut node_count, &mut shape_seen, shapes);

        assert_eq!(node_count, self.nodes.len(), "Detached subtree");
        assert!(shape_seen.iter().all(|seen| *seen), "Unreferenced shape");
    }
}

/// Number of nodes of a tree over `shape_count` shapes.
fn node_count_for(shape_count: usize) -> usize {
    (2 * shape_count).saturating_sub(1)
}

impl BoundingHierarchy for Bvh {
    fn build<Shape: BHShape>(shapes: &mut [Shape]) -> Bvh {
        Bvh::build(shapes)
    }

    fn hit<Shape: BHShape>(
        &self,
        ray: &Ray,
        t_min: Real,
        t_max: Real,
        shapes: &[Shape],
    ) -> Option<HitRecord> {
        Bvh::hit(self, ray, t_min, t_max, shapes)
    }

    fn traverse<'a, Query: IntersectsAabb, Shape: BHShape>(
        &'a self,
        query: &Query,
        shapes: &'a [Shape],
    ) -> Vec<&'a Shape> {
        Bvh::traverse(self, query, shapes)
    }

    fn pretty_print(&self) {
        Bvh::pretty_print(self);
    }
}
