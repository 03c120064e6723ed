//! This module defines a [`Bvh`], the median-split bounding volume hierarchy.

mod bvh_impl;
mod bvh_node;
mod iter;

pub use self::bvh_impl::*;
pub use self::bvh_node::*;
pub use self::iter::*;
