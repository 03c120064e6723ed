//! This module holds the [`Ray`] definition and the ray/box slab test.
mod intersect_default;
mod ray_impl;

pub use self::intersect_default::*;
pub use self::ray_impl::*;
