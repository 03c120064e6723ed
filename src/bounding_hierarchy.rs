//! This module defines the [`BoundingHierarchy`] and [`BHShape`] traits.

use crate::aabb::{Bounded, IntersectsAabb};
use crate::hit::{HitRecord, MaterialId};
use crate::ray::Ray;
use crate::{Point3, Real};

/// Describes a shape as referenced by a [`BoundingHierarchy`] leaf node.
/// This is everything a hierarchy needs from a primitive: its bounds, a
/// representative point to sort by, and the exact intersection test.
pub trait BHShape: Bounded {
    /// The point used to order this shape during construction.
    /// Defaults to the center of its [`Aabb`](crate::aabb::Aabb).
    fn centroid(&self) -> Point3 {
        self.aabb().center()
    }

    /// Material of this shape, copied into every [`HitRecord`] it produces.
    fn material_id(&self) -> MaterialId;

    /// Intersects the shape with `ray`, accepting only roots in `[t_min, t_max]`.
    /// Returns the nearest such hit.
    fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord>;
}

impl<T: BHShape> BHShape for &T {
    fn centroid(&self) -> Point3 {
        T::centroid(self)
    }

    fn material_id(&self) -> MaterialId {
        T::material_id(self)
    }

    fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        T::intersects_ray(self, ray, t_min, t_max)
    }
}

/// This trait defines an acceleration structure with space partitioning.
/// This structure is used to efficiently compute ray-scene intersections.
pub trait BoundingHierarchy {
    /// Creates a new [`BoundingHierarchy`] from the `shapes` slice.
    /// The slice may be reordered; the hierarchy refers to shapes by their
    /// index in the reordered slice, so the same slice must be passed to queries.
    ///
    /// # Examples
    ///
    /// ```
    /// use tracebvh::bounding_hierarchy::BoundingHierarchy;
    /// use tracebvh::bvh::Bvh;
    /// use tracebvh::shapes::{Primitive, Sphere};
    /// use tracebvh::{Point3, Real};
    ///
    /// let mut shapes: Vec<Primitive> = (0..10)
    ///     .map(|i| Sphere::new(Point3::new(i as Real, 0.0, 0.0), 0.25, i).unwrap().into())
    ///     .collect();
    ///
    /// let bvh = <Bvh as BoundingHierarchy>::build(&mut shapes);
    /// assert_eq!(bvh.len(), 19);
    /// ```
    fn build<Shape: BHShape>(shapes: &mut [Shape]) -> Self;

    /// Finds the nearest hit of `ray` within `[t_min, t_max]` among `shapes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tracebvh::bounding_hierarchy::BoundingHierarchy;
    /// use tracebvh::bvh::Bvh;
    /// use tracebvh::ray::Ray;
    /// use tracebvh::shapes::{Primitive, Sphere};
    /// use tracebvh::{Point3, Real, Vector3};
    ///
    /// let mut shapes: Vec<Primitive> = (0..10)
    ///     .map(|i| Sphere::new(Point3::new(i as Real, 0.0, 0.0), 0.25, i).unwrap().into())
    ///     .collect();
    /// let bvh = <Bvh as BoundingHierarchy>::build(&mut shapes);
    ///
    /// let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    /// let hit = BoundingHierarchy::hit(&bvh, &ray, 0.0, Real::INFINITY, &shapes).unwrap();
    /// assert_eq!(hit.material_id, 0);
    /// ```
    fn hit<Shape: BHShape>(
        &self,
        ray: &Ray,
        t_min: Real,
        t_max: Real,
        shapes: &[Shape],
    ) -> Option<HitRecord>;

    /// Traverses the [`BoundingHierarchy`].
    /// Returns a subset of `shapes`, in which the [`Aabb`](crate::aabb::Aabb)s of the
    /// elements were hit by `query`.
    fn traverse<'a, Query: IntersectsAabb, Shape: BHShape>(
        &'a self,
        query: &Query,
        shapes: &'a [Shape],
    ) -> Vec<&'a Shape>;

    /// Prints the [`BoundingHierarchy`] in a tree-like visualization.
    fn pretty_print(&self) {}
}

/// Finds the nearest hit of `ray` within `[t_min, t_max]` by testing every shape in
/// slice order. Each hit shrinks the interval for the remaining shapes, so among
/// equally near hits the one furthest back in `shapes` is reported.
///
/// This is the reference every [`BoundingHierarchy`] is checked against, and the
/// search used for shapes which are kept out of a hierarchy.
///
/// # Examples
///
/// ```
/// use tracebvh::bounding_hierarchy::hit_linear;
/// use tracebvh::ray::Ray;
/// use tracebvh::shapes::Sphere;
/// use tracebvh::{Point3, Real, Vector3};
///
/// let shapes = [
///     Sphere::new(Point3::new(0.0, 0.0, -10.0), 1.0, 0).unwrap(),
///     Sphere::new(Point3::new(0.0, 0.0, -5.0), 1.0, 1).unwrap(),
/// ];
/// let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
/// let hit = hit_linear(&shapes, &ray, 0.001, Real::INFINITY).unwrap();
/// assert_eq!(hit.material_id, 1);
/// ```
pub fn hit_linear<Shape: BHShape>(
    shapes: &[Shape],
    ray: &Ray,
    t_min: Real,
    t_max: Real,
) -> Option<HitRecord> {
    let mut closest = None;
    let mut closest_so_far = t_max;
    for shape in shapes {
        if let Some(hit) = shape.intersects_ray(ray, t_min, closest_so_far) {
            closest_so_far = hit.t;
            closest = Some(hit);
        }
    }
    closest
}
