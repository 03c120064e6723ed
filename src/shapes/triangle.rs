//! This module defines a Triangle and its intersection algorithm.

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::error::ShapeError;
use crate::hit::{HitRecord, MaterialId};
use crate::ray::Ray;
use crate::{Point3, Real, Vector3, TRIANGLE_EPSILON};

use super::{ensure_finite_point, in_interval};

/// A triangle with a precomputed unit face normal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    v0: Point3,
    v1: Point3,
    v2: Point3,
    normal: Vector3,
    material_id: MaterialId,
}

impl Triangle {
    /// Creates a new triangle. The face normal follows the right hand rule,
    /// `(v1 - v0) x (v2 - v0)`.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::error::ShapeError;
    /// use tracebvh::shapes::Triangle;
    /// use tracebvh::{Point3, Vector3};
    ///
    /// let triangle = Triangle::new(
    ///     Point3::new(0.0,0.0,0.0),
    ///     Point3::new(1.0,0.0,0.0),
    ///     Point3::new(0.0,1.0,0.0),
    ///     0,
    /// ).unwrap();
    /// assert_eq!(triangle.normal(), Vector3::new(0.0,0.0,1.0));
    ///
    /// let line = Triangle::new(
    ///     Point3::new(0.0,0.0,0.0),
    ///     Point3::new(1.0,0.0,0.0),
    ///     Point3::new(2.0,0.0,0.0),
    ///     0,
    /// );
    /// assert_eq!(line, Err(ShapeError::DegenerateTriangle));
    /// ```
    pub fn new(
        v0: Point3,
        v1: Point3,
        v2: Point3,
        material_id: MaterialId,
    ) -> Result<Triangle, ShapeError> {
        ensure_finite_point(&v0, "vertex")?;
        ensure_finite_point(&v1, "vertex")?;
        ensure_finite_point(&v2, "vertex")?;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let cross = edge1.cross(&edge2);
        let area2 = cross.norm();
        if !(area2 > Real::EPSILON * edge1.norm() * edge2.norm()) {
            return Err(ShapeError::DegenerateTriangle);
        }

        Ok(Triangle {
            v0,
            v1,
            v2,
            normal: cross / area2,
            material_id,
        })
    }

    /// Unit face normal.
    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// Implementation of the
    /// [Möller-Trumbore triangle/ray intersection algorithm](https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm).
    /// Both faces can be hit. Rays (almost) parallel to the triangle's plane never hit.
    #[allow(clippy::many_single_char_names)]
    pub fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        // det = 0 => [dir, edge1, edge2] not linearly independent
        let h = ray.direction.cross(&edge2);
        let det = edge1.dot(&h);
        if det.abs() < TRIANGLE_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self.v0;

        let u = inv_det * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = inv_det * ray.direction.dot(&q);
        if !(0.0..=1.0).contains(&v) || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(&q);
        if !in_interval(t, t_min, t_max) {
            return None;
        }

        Some(HitRecord::new(ray, t, self.normal, self.material_id))
    }
}

impl Bounded for Triangle {
    fn aabb(&self) -> Aabb {
        Aabb::empty().grow(&self.v0).grow(&self.v1).grow(&self.v2)
    }
}

impl BHShape for Triangle {
    fn centroid(&self) -> Point3 {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    fn material_id(&self) -> MaterialId {
        self.material_id
    }

    fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        Triangle::intersects_ray(self, ray, t_min, t_max)
    }
}

#[cfg(test)]
mod tests {
    use crate::aabb::Bounded;
    use crate::bounding_hierarchy::BHShape;
    use crate::ray::Ray;
    use crate::shapes::Triangle;
    use crate::testbase::{tuple_to_point, TupleVec};
    use crate::{Point3, Real, Vector3};

    use float_eq::assert_float_eq;
    use proptest::prelude::*;
    use std::cmp;

    fn xy_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_hit_inside() {
        let ray = Ray::new(Point3::new(0.2, 0.2, 1.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = xy_triangle().intersects_ray(&ray, 0.001, Real::INFINITY).unwrap();

        assert_float_eq!(hit.t, 1.0, abs <= 1e-5);
        assert_float_eq!(hit.point.x, 0.2, abs <= 1e-5);
        assert_float_eq!(hit.point.y, 0.2, abs <= 1e-5);
        assert_float_eq!(hit.point.z, 0.0, abs <= 1e-5);
        assert_eq!(hit.normal, Vector3::new(0.0, 0.0, 1.0));
        assert!(hit.front_face);
        assert_eq!(hit.material_id, 2);
    }

    #[test]
    fn test_back_face_is_hit_with_flipped_normal() {
        let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vector3::new(0.0, 0.0, 1.0));
        let hit = xy_triangle().intersects_ray(&ray, 0.001, Real::INFINITY).unwrap();

        assert_float_eq!(hit.t, 1.0, abs <= 1e-5);
        assert!(!hit.front_face);
        assert_eq!(hit.normal, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_misses() {
        let triangle = xy_triangle();

        // Outside of u + v <= 1.
        let ray = Ray::new(Point3::new(0.8, 0.8, 1.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(triangle.intersects_ray(&ray, 0.001, Real::INFINITY).is_none());

        // Parallel to the triangle's plane.
        let ray = Ray::new(Point3::new(-1.0, 0.2, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(triangle.intersects_ray(&ray, 0.001, Real::INFINITY).is_none());

        // Behind the origin.
        let ray = Ray::new(Point3::new(0.2, 0.2, 1.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(triangle.intersects_ray(&ray, 0.001, Real::INFINITY).is_none());

        // Beyond t_max.
        let ray = Ray::new(Point3::new(0.2, 0.2, 1.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(triangle.intersects_ray(&ray, 0.001, 0.5).is_none());

        // NaN bounds admit nothing.
        assert!(triangle.intersects_ray(&ray, 0.001, Real::NAN).is_none());
        assert!(triangle.intersects_ray(&ray, Real::NAN, Real::INFINITY).is_none());
    }

    #[test]
    fn test_bounds_and_centroid() {
        let triangle = xy_triangle();
        let aabb = triangle.aabb();
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 1.0, 0.0));

        let centroid = triangle.centroid();
        assert_float_eq!(centroid.x, 1.0 / 3.0, abs <= 1e-6);
        assert_float_eq!(centroid.y, 1.0 / 3.0, abs <= 1e-6);
        assert_eq!(centroid.z, 0.0);
    }

    proptest! {
        // Test whether a `Ray` which points at a point inside of a triangle
        // intersects it from either side.
        #[test]
        fn test_ray_hits_triangle(a in (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0),
                                  b in (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0),
                                  c in (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0),
                                  u: u16,
                                  v: u16,
                                  height in 1.0f32..100.0) {
            let to_tuple = |x: (f32, f32, f32)| -> TupleVec { (x.0 as Real, x.1 as Real, x.2 as Real) };
            let (a, b, c) = (tuple_to_point(&to_tuple(a)), tuple_to_point(&to_tuple(b)), tuple_to_point(&to_tuple(c)));
            let triangle = Triangle::new(a, b, c, 0);
            prop_assume!(triangle.is_ok());
            let triangle = triangle.unwrap();

            // Reject slivers, the determinant test is absolute.
            let u_vec = b - a;
            let v_vec = c - a;
            prop_assume!(u_vec.norm() > 1.0 && v_vec.norm() > 1.0);
            prop_assume!(u_vec.cross(&v_vec).norm() > 0.1 * u_vec.norm() * v_vec.norm());

            // Get some u and v coordinates such that u+v <= 1, away from the border
            let u = u % 81 + 10;
            let v = cmp::min(90 - u, v % 81 + 10);
            prop_assume!(u + v <= 90 && v >= 10);
            let u = u as Real / 100.0;
            let v = v as Real / 100.0;

            let point_on_triangle = a + u_vec * u + v_vec * v;
            let origin = point_on_triangle + triangle.normal() * height as Real;
            let ray = Ray::new(origin, point_on_triangle - origin);

            let hit = triangle.intersects_ray(&ray, 0.001, Real::INFINITY);
            prop_assert!(hit.is_some());
            let hit = hit.unwrap();
            prop_assert!((hit.t - 1.0).abs() < 1e-3);
            prop_assert!(hit.front_face);

            // From the other side.
            let origin = point_on_triangle - triangle.normal() * height as Real;
            let ray = Ray::new(origin, point_on_triangle - origin);
            let hit = triangle.intersects_ray(&ray, 0.001, Real::INFINITY);
            prop_assert!(hit.is_some());
            prop_assert!(!hit.unwrap().front_face);
        }
    }
}
