//! This module defines an infinite Plane.

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::error::ShapeError;
use crate::hit::{HitRecord, MaterialId};
use crate::ray::Ray;
use crate::{Point3, Real, Vector3, PARALLEL_EPSILON, PLANE_EXTENT};

use super::{ensure_finite_point, ensure_nonzero_vector, in_interval};

/// An infinite plane through `point` with unit `normal`.
///
/// A plane cannot be bounded. [`Bounded::aabb`] reports a box of
/// `±PLANE_EXTENT` on every axis, which covers any sensible scene but makes the
/// plane a poor member of a hierarchy. [`Scene`](crate::scene::Scene) keeps planes
/// out of its [`Bvh`](crate::bvh::Bvh) by default.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    point: Point3,
    normal: Vector3,
    material_id: MaterialId,
}

impl Plane {
    /// Creates a plane through `point`. `normal` is normalized.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::shapes::Plane;
    /// use tracebvh::{Point3, Vector3};
    ///
    /// let floor = Plane::new(Point3::new(0.0,-1.0,0.0), Vector3::new(0.0,3.0,0.0), 1).unwrap();
    /// assert_eq!(floor.normal(), Vector3::new(0.0,1.0,0.0));
    /// ```
    pub fn new(point: Point3, normal: Vector3, material_id: MaterialId) -> Result<Plane, ShapeError> {
        ensure_finite_point(&point, "point")?;
        let normal = ensure_nonzero_vector(&normal, "normal")?;
        Ok(Plane {
            point,
            normal,
            material_id,
        })
    }

    /// A point on the plane.
    pub fn point(&self) -> Point3 {
        self.point
    }

    /// Unit normal of the plane.
    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// Intersects the plane with `ray`. Rays (almost) parallel to the plane never hit.
    pub fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        let denom = self.normal.dot(&ray.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.point - ray.origin).dot(&self.normal) / denom;
        if !in_interval(t, t_min, t_max) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, self.material_id))
    }
}

impl Bounded for Plane {
    fn aabb(&self) -> Aabb {
        Aabb::with_bounds(
            Point3::new(-PLANE_EXTENT, -PLANE_EXTENT, -PLANE_EXTENT),
            Point3::new(PLANE_EXTENT, PLANE_EXTENT, PLANE_EXTENT),
        )
    }
}

impl BHShape for Plane {
    fn centroid(&self) -> Point3 {
        self.point
    }

    fn material_id(&self) -> MaterialId {
        self.material_id
    }

    fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        Plane::intersects_ray(self, ray, t_min, t_max)
    }
}
