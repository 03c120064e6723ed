//! This module defines a Sphere and its intersection algorithm.

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::error::ShapeError;
use crate::hit::{HitRecord, MaterialId};
use crate::ray::Ray;
use crate::{Point3, Real, Vector3};

use super::{ensure_finite_point, ensure_positive, in_interval};

/// A representation of a Sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    center: Point3,
    radius: Real,
    material_id: MaterialId,
}

impl Sphere {
    /// Creates a sphere centered on a given point with a radius.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::error::ShapeError;
    /// use tracebvh::shapes::Sphere;
    /// use tracebvh::Point3;
    ///
    /// assert!(Sphere::new(Point3::new(0.0,0.0,0.0), 1.0, 0).is_ok());
    /// assert_eq!(
    ///     Sphere::new(Point3::new(0.0,0.0,0.0), 0.0, 0),
    ///     Err(ShapeError::NonPositive("radius"))
    /// );
    /// ```
    pub fn new(center: Point3, radius: Real, material_id: MaterialId) -> Result<Sphere, ShapeError> {
        ensure_finite_point(&center, "center")?;
        ensure_positive(radius, "radius")?;
        Ok(Sphere {
            center,
            radius,
            material_id,
        })
    }

    /// Center of the sphere.
    pub fn center(&self) -> Point3 {
        self.center
    }

    /// Radius of the sphere.
    pub fn radius(&self) -> Real {
        self.radius
    }

    /// Intersects the sphere with `ray`. The nearer root is tried first and the
    /// farther one only if the nearer lies outside `[t_min, t_max]`.
    pub fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        let oc = ray.origin - self.center;
        let a = ray.direction.norm_squared();
        if a <= 0.0 {
            return None;
        }
        let half_b = oc.dot(&ray.direction);
        let c = oc.norm_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;

        // Overflowing terms give a NaN discriminant.
        if discriminant.is_nan() || discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        let mut toi = (-half_b - sqrtd) / a;
        if !in_interval(toi, t_min, t_max) {
            toi = (-half_b + sqrtd) / a;
            if !in_interval(toi, t_min, t_max) {
                return None;
            }
        }

        let outward_normal = (ray.at(toi) - self.center) / self.radius;
        Some(HitRecord::new(ray, toi, outward_normal, self.material_id))
    }
}

impl Bounded for Sphere {
    fn aabb(&self) -> Aabb {
        let half_size = Vector3::repeat(self.radius);
        Aabb::with_bounds(self.center - half_size, self.center + half_size)
    }
}

impl BHShape for Sphere {
    fn centroid(&self) -> Point3 {
        self.center
    }

    fn material_id(&self) -> MaterialId {
        self.material_id
    }

    fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        Sphere::intersects_ray(self, ray, t_min, t_max)
    }
}
