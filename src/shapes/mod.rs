//! The four ray tracing primitives and the closed [`Primitive`] sum type over them.

mod cylinder;
mod plane;
mod sphere;
mod triangle;

pub use self::cylinder::Cylinder;
pub use self::plane::Plane;
pub use self::sphere::Sphere;
pub use self::triangle::Triangle;

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::error::ShapeError;
use crate::hit::{HitRecord, MaterialId};
use crate::ray::Ray;
use crate::{Point3, Real, Vector3};

/// Any primitive a scene can hold. Dispatch is a `match`, so the set of shapes is
/// closed and every operation is checked for exhaustiveness.
///
/// # Examples
/// ```
/// use tracebvh::bounding_hierarchy::BHShape;
/// use tracebvh::ray::Ray;
/// use tracebvh::shapes::{Plane, Primitive, Sphere};
/// use tracebvh::{Point3, Real, Vector3};
///
/// let shapes: Vec<Primitive> = vec![
///     Sphere::new(Point3::new(0.0,0.0,0.0), 1.0, 0).unwrap().into(),
///     Plane::new(Point3::new(0.0,-1.0,0.0), Vector3::new(0.0,1.0,0.0), 1).unwrap().into(),
/// ];
///
/// let ray = Ray::new(Point3::new(0.0,5.0,0.0), Vector3::new(0.0,-1.0,0.0));
/// let hit = shapes[0].intersects_ray(&ray, 0.001, Real::INFINITY).unwrap();
/// assert_eq!(hit.material_id, 0);
/// assert!(!shapes[1].is_bounded());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    /// A [`Sphere`].
    Sphere(Sphere),
    /// A two-sided [`Triangle`].
    Triangle(Triangle),
    /// An infinite [`Plane`]. Its bounds are a large stand-in box.
    Plane(Plane),
    /// An open [`Cylinder`] without end caps.
    Cylinder(Cylinder),
}

impl Primitive {
    /// False for shapes whose [`Aabb`] is only a stand-in for an infinite extent.
    pub fn is_bounded(&self) -> bool {
        !matches!(self, Primitive::Plane(_))
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Primitive {
        Primitive::Sphere(sphere)
    }
}

impl From<Triangle> for Primitive {
    fn from(triangle: Triangle) -> Primitive {
        Primitive::Triangle(triangle)
    }
}

impl From<Plane> for Primitive {
    fn from(plane: Plane) -> Primitive {
        Primitive::Plane(plane)
    }
}

impl From<Cylinder> for Primitive {
    fn from(cylinder: Cylinder) -> Primitive {
        Primitive::Cylinder(cylinder)
    }
}

impl Bounded for Primitive {
    fn aabb(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.aabb(),
            Primitive::Triangle(t) => t.aabb(),
            Primitive::Plane(p) => p.aabb(),
            Primitive::Cylinder(c) => c.aabb(),
        }
    }
}

impl BHShape for Primitive {
    fn centroid(&self) -> Point3 {
        match self {
            Primitive::Sphere(s) => s.centroid(),
            Primitive::Triangle(t) => t.centroid(),
            Primitive::Plane(p) => p.centroid(),
            Primitive::Cylinder(c) => c.centroid(),
        }
    }

    fn material_id(&self) -> MaterialId {
        match self {
            Primitive::Sphere(s) => s.material_id(),
            Primitive::Triangle(t) => t.material_id(),
            Primitive::Plane(p) => p.material_id(),
            Primitive::Cylinder(c) => c.material_id(),
        }
    }

    #[inline]
    fn intersects_ray(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        match self {
            Primitive::Sphere(s) => s.intersects_ray(ray, t_min, t_max),
            Primitive::Triangle(t) => t.intersects_ray(ray, t_min, t_max),
            Primitive::Plane(p) => p.intersects_ray(ray, t_min, t_max),
            Primitive::Cylinder(c) => c.intersects_ray(ray, t_min, t_max),
        }
    }
}

/// True if `t` is a finite distance within `[t_min, t_max]`. NaN is rejected.
pub(crate) fn in_interval(t: Real, t_min: Real, t_max: Real) -> bool {
    t.is_finite() && t >= t_min && t <= t_max
}

pub(crate) fn ensure_finite_point(point: &Point3, name: &'static str) -> Result<(), ShapeError> {
    if point.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(ShapeError::NonFinite(name))
    }
}

pub(crate) fn ensure_positive(value: Real, name: &'static str) -> Result<(), ShapeError> {
    if !value.is_finite() {
        Err(ShapeError::NonFinite(name))
    } else if value <= 0.0 {
        Err(ShapeError::NonPositive(name))
    } else {
        Ok(())
    }
}

/// Returns `vector` normalized.
pub(crate) fn ensure_nonzero_vector(
    vector: &Vector3,
    name: &'static str,
) -> Result<Vector3, ShapeError> {
    if !vector.iter().all(|x| x.is_finite()) {
        return Err(ShapeError::NonFinite(name));
    }
    let norm = vector.norm();
    if norm <= Real::EPSILON {
        return Err(ShapeError::ZeroVector(name));
    }
    Ok(vector / norm)
}

#[cfg(test)]
mod tests {
    use crate::aabb::Bounded;
    use crate::bounding_hierarchy::BHShape;
    use crate::ray::Ray;
    use crate::shapes::{Cylinder, Plane, Primitive, Sphere, Triangle};
    use crate::{Point3, Real, Vector3};

    fn one_of_each() -> Vec<Primitive> {
        vec![
            Sphere::new(Point3::new(0.0, 0.0, -10.0), 1.0, 0).unwrap().into(),
            Triangle::new(
                Point3::new(-1.0, -1.0, -5.0),
                Point3::new(1.0, -1.0, -5.0),
                Point3::new(0.0, 1.0, -5.0),
                1,
            )
            .unwrap()
            .into(),
            Plane::new(Point3::new(0.0, 0.0, -20.0), Vector3::new(0.0, 0.0, 1.0), 2)
                .unwrap()
                .into(),
            Cylinder::new(Point3::new(0.0, -1.0, -3.0), Vector3::new(0.0, 1.0, 0.0), 0.5, 2.0, 3)
                .unwrap()
                .into(),
        ]
    }

    #[test]
    fn test_dispatch_matches_concrete_shapes() {
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        let expected_t: [Real; 4] = [9.0, 5.0, 20.0, 2.5];

        for (primitive, t) in one_of_each().iter().zip(expected_t) {
            let hit = primitive.intersects_ray(&ray, 0.001, Real::INFINITY).unwrap();
            assert!((hit.t - t).abs() < 1e-4, "{:?} hit at {}", primitive, hit.t);
            assert_eq!(hit.material_id, primitive.material_id());
            assert!(primitive.aabb().approx_contains_eps(&hit.point, 1e-4));
        }
    }

    #[test]
    fn test_only_planes_are_unbounded() {
        let bounded: Vec<bool> = one_of_each().iter().map(Primitive::is_bounded).collect();
        assert_eq!(bounded, vec![true, true, false, true]);
    }

    #[test]
    fn test_centroid_inside_bounds() {
        for primitive in one_of_each() {
            assert!(primitive.aabb().contains(&primitive.centroid()));
        }
    }
}
