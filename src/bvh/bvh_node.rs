use std::cmp::Ordering;

use crate::aabb::Aabb;
use crate::bounding_hierarchy::BHShape;
use crate::hit::HitRecord;
use crate::ray::Ray;
use crate::utils::joint_aabb_of_shapes;
use crate::Real;

/// Subtrees with at least this many shapes are built on separate rayon tasks.
#[cfg(feature = "rayon")]
const PARALLEL_BUILD_THRESHOLD: usize = 512;

/// The [`BvhNode`] enum that describes a node in a [`Bvh`](super::Bvh).
/// It's either a leaf node and references a shape (by holding its index)
/// or a regular node that has two child nodes.
/// Both kinds store the [`Aabb`] of everything below them.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BvhNode {
    /// Leaf node.
    Leaf {
        /// Bounds of the referenced shape.
        aabb: Aabb,

        /// The shape contained in this leaf.
        shape_index: usize,
    },
    /// Inner node.
    Node {
        /// The union of both children's bounds.
        aabb: Aabb,

        /// Index of the left subtree's root node. Always the node right after this one.
        child_l_index: usize,

        /// Index of the right subtree's root node. Follows the whole left subtree.
        child_r_index: usize,
    },
}

/// The arguments of one recursive build step: a run of shapes and the run of
/// node slots its subtree is written to.
pub(crate) struct BvhNodeBuildArgs<'a, S> {
    pub(crate) shapes: &'a mut [S],
    /// Index of `shapes[0]` in the complete shape slice.
    pub(crate) shape_offset: usize,
    /// Exactly `2 * shapes.len() - 1` slots.
    pub(crate) nodes: &'a mut [BvhNode],
    /// Index of `nodes[0]` in the complete node vector.
    pub(crate) node_offset: usize,
}

impl BvhNode {
    /// Filler for node slots which are about to be written by the build.
    pub(crate) fn placeholder() -> BvhNode {
        BvhNode::Leaf {
            aabb: Aabb::empty(),
            shape_index: usize::MAX,
        }
    }

    /// Bounds of this node.
    pub fn aabb(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Node { aabb, .. } => aabb,
        }
    }

    /// Returns `true` for leaf nodes.
    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }

    /// Returns the index of the shape of a leaf, `None` for inner nodes.
    pub fn shape_index(&self) -> Option<usize> {
        match *self {
            BvhNode::Leaf { shape_index, .. } => Some(shape_index),
            BvhNode::Node { .. } => None,
        }
    }

    /// Number of edges on the longest path from the node at `node_index` down to a leaf.
    pub fn depth(nodes: &[BvhNode], node_index: usize) -> u32 {
        match nodes[node_index] {
            BvhNode::Leaf { .. } => 0,
            BvhNode::Node {
                child_l_index,
                child_r_index,
                ..
            } => 1 + Self::depth(nodes, child_l_index).max(Self::depth(nodes, child_r_index)),
        }
    }

    /// Builds a [`BvhNode`] subtree recursively using median splits.
    pub(crate) fn build<S: BHShape>(args: BvhNodeBuildArgs<S>) {
        if let Some((left, right)) = Self::prep_build(args) {
            Self::build(left);
            Self::build(right);
        }
    }

    /// Builds a [`BvhNode`] subtree recursively, splitting large subtrees across
    /// the rayon thread pool. Produces the same nodes as [`BvhNode::build`].
    #[cfg(feature = "rayon")]
    pub(crate) fn build_par<S: BHShape + Send>(args: BvhNodeBuildArgs<S>) {
        if let Some((left, right)) = Self::prep_build(args) {
            if left.shapes.len() + right.shapes.len() >= PARALLEL_BUILD_THRESHOLD {
                rayon::join(|| Self::build_par(left), || Self::build_par(right));
            } else {
                Self::build(left);
                Self::build(right);
            }
        }
    }

    /// Writes the root node of `args` into its first slot.
    /// For an inner node, the shapes are partially sorted along the longest axis of
    /// their joint bounds and the arguments for both halves are returned.
    fn prep_build<S: BHShape>(
        args: BvhNodeBuildArgs<S>,
    ) -> Option<(BvhNodeBuildArgs<S>, BvhNodeBuildArgs<S>)> {
        let BvhNodeBuildArgs {
            shapes,
            shape_offset,
            nodes,
            node_offset,
        } = args;
        debug_assert_eq!(nodes.len(), 2 * shapes.len() - 1);

        let (node, child_nodes) = nodes.split_first_mut()?;

        if shapes.len() == 1 {
            *node = BvhNode::Leaf {
                aabb: shapes[0].aabb(),
                shape_index: shape_offset,
            };
            return None;
        }

        let aabb = joint_aabb_of_shapes(shapes);
        let axis = aabb.largest_axis();

        // Left half gets the lower half of centroids, right half the upper.
        let mid = shapes.len() / 2;
        shapes.select_nth_unstable_by(mid, |a, b| {
            let a: Real = a.centroid()[axis];
            let b: Real = b.centroid()[axis];
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        });

        let left_node_count = 2 * mid - 1;
        let child_l_index = node_offset + 1;
        let child_r_index = child_l_index + left_node_count;
        *node = BvhNode::Node {
            aabb,
            child_l_index,
            child_r_index,
        };

        let (shapes_l, shapes_r) = shapes.split_at_mut(mid);
        let (nodes_l, nodes_r) = child_nodes.split_at_mut(left_node_count);
        Some((
            BvhNodeBuildArgs {
                shapes: shapes_l,
                shape_offset,
                nodes: nodes_l,
                node_offset: child_l_index,
            },
            BvhNodeBuildArgs {
                shapes: shapes_r,
                shape_offset: shape_offset + mid,
                nodes: nodes_r,
                node_offset: child_r_index,
            },
        ))
    }

    /// Finds the nearest hit in the subtree rooted at `node_index`.
    ///
    /// A subtree whose bounds the ray misses is skipped. The right child is searched
    /// only up to the left child's hit, so a right hit is always at least as near.
    pub(crate) fn hit<S: BHShape>(
        nodes: &[BvhNode],
        node_index: usize,
        ray: &Ray,
        t_min: Real,
        t_max: Real,
        shapes: &[S],
    ) -> Option<HitRecord> {
        match nodes[node_index] {
            BvhNode::Leaf {
                ref aabb,
                shape_index,
            } => {
                if !ray.intersects_aabb(aabb) {
                    return None;
                }
                shapes[shape_index].intersects_ray(ray, t_min, t_max)
            }
            BvhNode::Node {
                ref aabb,
                child_l_index,
                child_r_index,
            } => {
                if !ray.intersects_aabb(aabb) {
                    return None;
                }
                let left = Self::hit(nodes, child_l_index, ray, t_min, t_max, shapes);
                let closest_so_far = left.map_or(t_max, |hit| hit.t);
                let right = Self::hit(nodes, child_r_index, ray, t_min, closest_so_far, shapes);
                right.or(left)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bvh::{Bvh, BvhNode};
    use crate::testbase::generate_aligned_spheres;
    use crate::Real;

    #[test]
    fn test_node_layout() {
        let mut shapes = generate_aligned_spheres();
        let bvh = Bvh::build(&mut shapes);

        // 21 shapes, left half holds 10 of them in 19 nodes.
        match bvh.nodes[0] {
            BvhNode::Node {
                child_l_index,
                child_r_index,
                ..
            } => {
                assert_eq!(child_l_index, 1);
                assert_eq!(child_r_index, 20);
            }
            BvhNode::Leaf { .. } => panic!("root of 21 shapes must be an inner node"),
        }
        assert_eq!(bvh.nodes.len(), 41);
        assert_eq!(bvh.nodes.iter().filter(|node| node.is_leaf()).count(), 21);
    }

    #[test]
    fn test_depth_is_balanced() {
        let mut shapes = generate_aligned_spheres();
        let bvh = Bvh::build(&mut shapes);
        // ceil(log2(21)) == 5
        assert_eq!(BvhNode::depth(&bvh.nodes, 0), 5);
    }

    #[test]
    fn test_median_split_orders_shapes() {
        let mut shapes = generate_aligned_spheres();
        shapes.reverse();
        let bvh = Bvh::build(&mut shapes);

        // The left subtree holds the 10 spheres with the smallest x.
        let left_max = shapes[..10]
            .iter()
            .map(|sphere| sphere.center().x)
            .fold(Real::MIN, Real::max);
        let right_min = shapes[10..]
            .iter()
            .map(|sphere| sphere.center().x)
            .fold(Real::MAX, Real::min);
        assert!(left_max < right_min);
        assert!(bvh.is_consistent(&shapes));
    }
}
