use crate::aabb::IntersectsAabb;
use crate::bvh::{Bvh, BvhNode};

/// Nodes kept inline before the stack spills to the heap. Median splits keep a
/// tree over `n` shapes at depth `ceil(log2(n))`, so built trees never spill.
const MAX_STACK_SIZE: usize = 64;

/// Stack of node indices used by the traversals. The first [`MAX_STACK_SIZE`]
/// entries live inline, deeper ones go to a `Vec`.
pub(crate) struct NodeStack {
    inline: [usize; MAX_STACK_SIZE],
    inline_size: usize,
    spilled: Vec<usize>,
}

impl NodeStack {
    pub(crate) fn new() -> NodeStack {
        NodeStack {
            inline: [0; MAX_STACK_SIZE],
            inline_size: 0,
            spilled: Vec::new(),
        }
    }

    /// Push node onto stack.
    pub(crate) fn push(&mut self, node: usize) {
        if self.inline_size < MAX_STACK_SIZE {
            self.inline[self.inline_size] = node;
            self.inline_size += 1;
        } else {
            // Only ever non-empty while the inline part is full.
            self.spilled.push(node);
        }
    }

    /// Pop the stack and return the node, if any.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        if let Some(node) = self.spilled.pop() {
            return Some(node);
        }
        if self.inline_size == 0 {
            return None;
        }
        self.inline_size -= 1;
        Some(self.inline[self.inline_size])
    }
}

/// Iterator to traverse a [`Bvh`]. Allocates only for trees deeper than any
/// [`Bvh::build`] produces.
/// Yields the shapes whose leaf bounds pass the query, left to right.
pub struct BvhTraverseIterator<'bvh, 'shape, Query: IntersectsAabb, Shape> {
    /// Reference to the [`Bvh`] to traverse
    bvh: &'bvh Bvh,
    /// Reference to the input query
    query: &'bvh Query,
    /// Reference to the input shapes array
    shapes: &'shape [Shape],
    /// Nodes still to visit, the next one on top.
    stack: NodeStack,
}

impl<'bvh, 'shape, Query: IntersectsAabb, Shape> BvhTraverseIterator<'bvh, 'shape, Query, Shape> {
    /// Creates a new [`BvhTraverseIterator`]
    pub fn new(bvh: &'bvh Bvh, query: &'bvh Query, shapes: &'shape [Shape]) -> Self {
        let mut stack = NodeStack::new();
        if !bvh.nodes.is_empty() {
            stack.push(0);
        }
        BvhTraverseIterator {
            bvh,
            query,
            shapes,
            stack,
        }
    }
}

impl<'shape, Query: IntersectsAabb, Shape> Iterator
    for BvhTraverseIterator<'_, 'shape, Query, Shape>
{
    type Item = &'shape Shape;

    fn next(&mut self) -> Option<&'shape Shape> {
        while let Some(node_index) = self.stack.pop() {
            let node = &self.bvh.nodes[node_index];
            if !self.query.intersects_aabb(node.aabb()) {
                continue;
            }
            match *node {
                BvhNode::Leaf { shape_index, .. } => return Some(&self.shapes[shape_index]),
                BvhNode::Node {
                    child_l_index,
                    child_r_index,
                    ..
                } => {
                    // Right first, so the left subtree is visited first.
                    self.stack.push(child_r_index);
                    self.stack.push(child_l_index);
                }
            }
        }
        None
    }
}
