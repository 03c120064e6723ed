//! This module defines an open Cylinder and its intersection algorithm.

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::error::ShapeError;
use crate::hit::{HitRecord, MaterialId};
use crate::ray::Ray;
use crate::{Point3, Real, Vector3, PARALLEL_EPSILON};

use super::{ensure_finite_point, ensure_nonzero_vector, ensure_positive, in_interval};

/// A finite cylinder without end caps. The side surface spans from `base`
/// along the unit `axis` up to `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cylinder {
    base: Point3,
    axis: Vector3,
    radius: Real,
    height: Real,
    material_id: MaterialId,
}

impl Cylinder {
    /// Creates a cylinder. `axis` is normalized.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::aabb::Bounded;
    /// use tracebvh::shapes::Cylinder;
    /// use tracebvh::{Point3, Vector3};
    ///
    /// let pillar = Cylinder::new(Point3::new(0.0,0.0,0.0), Vector3::new(0.0,1.0,0.0), 0.5, 3.0, 0).unwrap();
    /// let aabb = pillar.aabb();
    ///
    /// assert_eq!(aabb.min, Point3::new(-0.5,-0.5,-0.5));
    /// assert_eq!(aabb.max, Point3::new(0.5,3.5,0.5));
    /// ```
    pub fn new(
        base: Point3,
        axis: Vector3,
        radius: Real,
        height: Real,
        material_id: MaterialId,
    ) -> Result<Cylinder, ShapeError> {
        ensure_finite_point(&base, "base")?;
        let axis = ensure_nonzero_vector(&axis, "axis")?;
        ensure_positive(radius, "radius")?;
        ensure_positive(height, "height")?;
        Ok(Cylinder {
            base,
            axis,
            radius,
            height,
            material_id,
        })
    }

    /// Center of the bottom end.
    pub fn base(&self) -> Point3 {
        self.base
    }

    /// Unit axis.
    pub fn axis(&self) -> Vector3 {
        self.axis
    }

    /// Radius of the side surface.
    pub fn radius(&self) -> Real {
        self.radius
    }

    /// Distance from the base to the top along the axis.
    pub fn height(&self) -> Real {
        self.height
    }

    /// Center of the top end.
    pub fn top(&self) -> Point3 {
        self.base + self.axis * self.height
    }

    /// Intersects the side surface with `ray`.
    ///
    /// The ray is projected onto the plane perpendicular to the axis and solved
    /// against the infinite cylinder. Each root is kept only if its hit point
    /// lies between the two ends, nearer root first.
    pub fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        let oc = ray.origin - self.base;
        let d_axial = ray.direction.dot(&self.axis);
        let oc_axial = oc.dot(&self.axis);
        let d_perp = ray.direction - self.axis * d_axial;
        let oc_perp = oc - self.axis * oc_axial;

        // Parallel to the axis, the side surface is never crossed.
        let a = d_perp.norm_squared();
        if a <= PARALLEL_EPSILON * PARALLEL_EPSILON * ray.direction.norm_squared() {
            return None;
        }
        let half_b = oc_perp.dot(&d_perp);
        let c = oc_perp.norm_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant.is_nan() || discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        for toi in [(-half_b - sqrtd) / a, (-half_b + sqrtd) / a] {
            if !in_interval(toi, t_min, t_max) {
                continue;
            }
            let axial = oc_axial + toi * d_axial;
            if !(0.0..=self.height).contains(&axial) {
                continue;
            }
            let point = ray.at(toi);
            let outward_normal = (point - (self.base + self.axis * axial)) / self.radius;
            return Some(HitRecord::new(ray, toi, outward_normal, self.material_id));
        }
        None
    }
}

impl Bounded for Cylinder {
    /// Union of the boxes around the two end circles, each widened by the radius
    /// on every axis.
    fn aabb(&self) -> Aabb {
        let r = Vector3::repeat(self.radius);
        let top = self.top();
        Aabb::with_bounds(self.base - r, self.base + r).join(&Aabb::with_bounds(top - r, top + r))
    }
}

impl BHShape for Cylinder {
    fn centroid(&self) -> Point3 {
        self.base + self.axis * (self.height / 2.0)
    }

    fn material_id(&self) -> MaterialId {
        self.material_id
    }

    fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        Cylinder::intersects_ray(self, ray, t_min, t_max)
    }
}
