//! A crate which exports rays, axis-aligned bounding boxes, the four ray tracing
//! primitives (spheres, triangles, planes and cylinders) and a binary bounding volume
//! hierarchy over them.
//!
//! ## About
//!
//! A renderer spends most of its time asking "what is the nearest thing this ray hits?".
//! Answering that by testing every primitive is O(n) per ray. A BVH built once at scene
//! load turns this into roughly O(log2(n)): every node stores the box around its subtree,
//! and a ray that misses the box skips the whole subtree.
//!
//! The hierarchy in this crate is a median-split object partition. At each level the
//! primitives are ordered along the longest axis of their joint bounds and cut in half
//! by count, which keeps the tree balanced with depth `ceil(log2(n))`.
//!
//! Once built, a [`Bvh`](bvh::Bvh) is immutable. Traversal only reads it, so any number
//! of render threads can query the same tree without locking.
//!
//! ## Example
//!
//! ```
//! use tracebvh::bvh::Bvh;
//! use tracebvh::ray::Ray;
//! use tracebvh::shapes::{Primitive, Sphere};
//! use tracebvh::{Point3, Real, Vector3};
//!
//! let mut primitives = Vec::new();
//! for i in 0..100 {
//!     let center = Point3::new(i as Real * 3.0, 0.0, 0.0);
//!     let sphere = Sphere::new(center, 1.0, i).unwrap();
//!     primitives.push(Primitive::from(sphere));
//! }
//!
//! let bvh = Bvh::build(&mut primitives);
//!
//! let ray = Ray::new(Point3::new(30.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
//! let hit = bvh.hit(&ray, 0.001, Real::INFINITY, &primitives).unwrap();
//!
//! assert_eq!(hit.material_id, 10);
//! assert!((hit.t - 9.0).abs() < 1e-4);
//! ```
//!
//! ## Features
//!
//! - `rayon` (default **enabled**) - adds [`Bvh::build_par`](bvh::Bvh::build_par) and
//!   parallel batch queries on [`Scene`](scene::Scene)
//! - `serde` (default **disabled**) - adds `Serialize` and `Deserialize` implementations
//!   for shapes, boxes, the tree and scene options
//! - `f64` (default **disabled**) - switches [`Real`] from `f32` to `f64`
//! - `cli` (default **disabled**) - builds the `tracebvh` demo binary
//!

#![warn(missing_docs)]

#[cfg(feature = "f64")]
/// Float type used by this crate
pub type Real = f64;

#[cfg(not(feature = "f64"))]
/// Float type used by this crate
pub type Real = f32;

/// Point math type used by this crate. Type alias for [`nalgebra::Point3`].
pub type Point3 = nalgebra::Point3<Real>;

/// Vector math type used by this crate. Type alias for [`nalgebra::Vector3`].
pub type Vector3 = nalgebra::Vector3<Real>;

/// A minimal floating value used as a tolerance when comparing bounds.
pub const EPSILON: Real = 0.00001;

/// Default lower end of a ray's parametric interval. Keeps secondary rays from
/// re-hitting the surface they start on.
pub const RAY_T_MIN: Real = 0.001;

/// Default upper end of a ray's parametric interval.
pub const RAY_T_MAX: Real = 1e30;

/// Determinant magnitude below which a ray counts as parallel to a triangle.
pub const TRIANGLE_EPSILON: Real = 1e-7;

/// Below this, a ray counts as parallel to a plane or to a cylinder's axis.
pub const PARALLEL_EPSILON: Real = 1e-6;

/// Ray direction components at or below this magnitude are not inverted by the slab test.
pub const SLAB_EPSILON: Real = 1e-8;

/// Stand-in for `1 / d` when `|d| <= SLAB_EPSILON`.
pub const SLAB_LARGE_INVERSE: Real = 1e8;

/// Half extent of the box reported for an unbounded [`Plane`](shapes::Plane).
pub const PLANE_EXTENT: Real = 1e6;

pub mod aabb;
pub mod axis;
pub mod bounding_hierarchy;
pub mod bvh;
pub mod error;
pub mod hit;
pub mod ray;
pub mod scene;
pub mod shapes;
mod utils;

#[cfg(test)]
mod testbase;
