//! This module defines a Ray structure together with its cached values.

use crate::aabb::{Aabb, IntersectsAabb};
use crate::{Point3, Real, Vector3, RAY_T_MAX, RAY_T_MIN, SLAB_EPSILON, SLAB_LARGE_INVERSE};

use super::intersect_default::RayIntersection;

/// A struct which defines a ray and some of its cached values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    /// The ray origin.
    pub origin: Point3,

    /// The ray direction. Not required to be of unit length.
    pub direction: Vector3,

    /// Guarded inverse (1/x) ray direction. Cached for use in [`Aabb`] intersections.
    /// Components of `direction` which are (almost) zero map to a large finite value
    /// carrying the sign of the component instead of an infinity.
    pub inv_direction: Vector3,

    /// Lower end of the parametric interval used by [`Scene::hit_ray`](crate::scene::Scene::hit_ray).
    pub t_min: Real,

    /// Upper end of the parametric interval used by [`Scene::hit_ray`](crate::scene::Scene::hit_ray).
    pub t_max: Real,
}

/// Returns the inverse of one direction component as used by the slab test.
#[inline(always)]
fn guarded_inverse(d: Real) -> Real {
    if d.abs() > SLAB_EPSILON {
        1.0 / d
    } else if d >= 0.0 {
        SLAB_LARGE_INVERSE
    } else {
        -SLAB_LARGE_INVERSE
    }
}

impl Ray {
    /// Creates a new [`Ray`] from an `origin` and a `direction`.
    /// `direction` is kept as given, so `t` is measured in multiples of its length.
    /// The interval defaults to [`RAY_T_MIN`], [`RAY_T_MAX`].
    ///
    /// # Examples
    /// ```
    /// use tracebvh::ray::Ray;
    /// use tracebvh::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0,0.0,0.0);
    /// let direction = Vector3::new(2.0,0.0,0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// assert_eq!(ray.origin, origin);
    /// assert_eq!(ray.direction, direction);
    /// assert_eq!(ray.at(1.5), Point3::new(3.0,0.0,0.0));
    /// ```
    pub fn new(origin: Point3, direction: Vector3) -> Ray {
        Ray::with_interval(origin, direction, RAY_T_MIN, RAY_T_MAX)
    }

    /// Creates a new [`Ray`] whose `direction` is normalized.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::ray::Ray;
    /// use tracebvh::{Point3, Vector3};
    ///
    /// let ray = Ray::normalized(Point3::new(0.0,0.0,0.0), Vector3::new(0.0,3.0,4.0));
    /// assert!((ray.direction.norm() - 1.0).abs() < 1e-6);
    /// ```
    pub fn normalized(origin: Point3, direction: Vector3) -> Ray {
        Ray::new(origin, direction.normalize())
    }

    /// Creates a new [`Ray`] with an explicit parametric interval.
    pub fn with_interval(origin: Point3, direction: Vector3, t_min: Real, t_max: Real) -> Ray {
        Ray {
            origin,
            direction,
            inv_direction: direction.map(guarded_inverse),
            t_min,
            t_max,
        }
    }

    /// Returns the point `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: Real) -> Point3 {
        self.origin + self.direction * t
    }

    /// Orients `outward_normal` against this ray.
    /// Returns the oriented normal and whether the ray hit the front face,
    /// that is whether it travels against `outward_normal`.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::ray::Ray;
    /// use tracebvh::{Point3, Vector3};
    ///
    /// let ray = Ray::new(Point3::new(0.0,0.0,5.0), Vector3::new(0.0,0.0,-1.0));
    ///
    /// let (normal, front_face) = ray.face_normal(Vector3::new(0.0,0.0,1.0));
    /// assert!(front_face);
    /// assert_eq!(normal, Vector3::new(0.0,0.0,1.0));
    ///
    /// let (normal, front_face) = ray.face_normal(Vector3::new(0.0,0.0,-1.0));
    /// assert!(!front_face);
    /// assert_eq!(normal, Vector3::new(0.0,0.0,1.0));
    /// ```
    pub fn face_normal(&self, outward_normal: Vector3) -> (Vector3, bool) {
        let front_face = self.direction.dot(&outward_normal) < 0.0;
        if front_face {
            (outward_normal, true)
        } else {
            (-outward_normal, false)
        }
    }

    /// Tests the intersection of a [`Ray`] with an [`Aabb`] using the slab method.
    /// The box counts as hit when the parametric interval it covers ends at or
    /// after `t = 0` and is not empty. The ray's own `t_min`/`t_max` are not used.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::aabb::Aabb;
    /// use tracebvh::ray::Ray;
    /// use tracebvh::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0,0.0,0.0);
    /// let direction = Vector3::new(1.0,0.0,0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// let point1 = Point3::new(99.9,-1.0,-1.0);
    /// let point2 = Point3::new(100.1,1.0,1.0);
    /// let aabb = Aabb::with_bounds(point1, point2);
    ///
    /// assert!(ray.intersects_aabb(&aabb));
    /// ```
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.ray_intersects_aabb(aabb)
    }
}

impl IntersectsAabb for Ray {
    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.ray_intersects_aabb(aabb)
    }
}
