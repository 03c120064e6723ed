//! The result of a successful ray/primitive intersection.

use crate::ray::Ray;
use crate::{Point3, Real, Vector3};

/// Identifier of a material. Indexes a materials table owned by the caller.
pub type MaterialId = usize;

/// Everything a shading routine needs to know about a ray/surface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitRecord {
    /// The point where the ray meets the surface.
    pub point: Point3,

    /// Unit surface normal, oriented against the incoming ray.
    pub normal: Vector3,

    /// Ray parameter of the hit, `point == ray.at(t)`.
    pub t: Real,

    /// Whether the ray hit the outer side of the surface.
    pub front_face: bool,

    /// Material of the primitive which was hit.
    pub material_id: MaterialId,
}

impl HitRecord {
    /// Creates a [`HitRecord`] for `ray` at parameter `t`. The outward normal is
    /// flipped if necessary so that the stored normal points against the ray.
    ///
    /// # Examples
    /// ```
    /// use tracebvh::hit::HitRecord;
    /// use tracebvh::ray::Ray;
    /// use tracebvh::{Point3, Vector3};
    ///
    /// // A ray leaving a surface from the inside.
    /// let ray = Ray::new(Point3::new(0.0,0.0,0.0), Vector3::new(0.0,0.0,1.0));
    /// let hit = HitRecord::new(&ray, 1.0, Vector3::new(0.0,0.0,1.0), 7);
    ///
    /// assert_eq!(hit.point, Point3::new(0.0,0.0,1.0));
    /// assert_eq!(hit.normal, Vector3::new(0.0,0.0,-1.0));
    /// assert!(!hit.front_face);
    /// assert_eq!(hit.material_id, 7);
    /// ```
    pub fn new(ray: &Ray, t: Real, outward_normal: Vector3, material_id: MaterialId) -> HitRecord {
        let (normal, front_face) = ray.face_normal(outward_normal);
        HitRecord {
            point: ray.at(t),
            normal,
            t,
            front_face,
            material_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::hit::HitRecord;
    use crate::ray::Ray;
    use crate::{Point3, Vector3};

    #[test]
    fn test_front_face_keeps_outward_normal() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = HitRecord::new(&ray, 4.0, Vector3::new(0.0, 0.0, 1.0), 3);

        assert!(hit.front_face);
        assert_eq!(hit.normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(hit.point, Point3::new(0.0, 0.0, 1.0));
        assert_eq!(hit.t, 4.0);
    }
}
