use crate::aabb::Aabb;
use crate::Point3;

/// A trait implemented by things that may or may not intersect an AABB and, by extension,
/// things that can be used to traverse a BVH.
pub trait IntersectsAabb {
    /// Returns whether this object intersects an [`Aabb`].
    ///
    /// # Examples
    /// ```
    /// use tracebvh::aabb::{Aabb, IntersectsAabb};
    /// use tracebvh::Point3;
    ///
    /// struct XyPlane;
    ///
    /// impl IntersectsAabb for XyPlane {
    ///     fn intersects_aabb(&self, aabb: &Aabb) -> bool {
    ///         aabb.min[2] <= 0.0 && aabb.max[2] >= 0.0
    ///     }
    /// }
    ///
    /// let xy_plane = XyPlane;
    /// let aabb = Aabb::with_bounds(Point3::new(-1.0,-1.0,-1.0), Point3::new(1.0,1.0,1.0));
    /// assert!(xy_plane.intersects_aabb(&aabb));
    /// ```
    fn intersects_aabb(&self, aabb: &Aabb) -> bool;
}

impl IntersectsAabb for Aabb {
    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for i in 0..3 {
            if self.max[i] < aabb.min[i] || aabb.max[i] < self.min[i] {
                return false;
            }
        }
        true
    }
}

impl IntersectsAabb for Point3 {
    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        aabb.contains(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::aabb::{Aabb, IntersectsAabb};
    use crate::Point3;

    #[test]
    fn test_touching_boxes_intersect() {
        let a = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::with_bounds(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let c = Aabb::with_bounds(Point3::new(1.5, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));

        assert!(a.intersects_aabb(&b));
        assert!(b.intersects_aabb(&a));
        assert!(!a.intersects_aabb(&c));
    }

    #[test]
    fn test_point_query() {
        let aabb = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert!(Point3::new(0.5, 0.5, 0.5).intersects_aabb(&aabb));
        assert!(!Point3::new(0.5, 1.5, 0.5).intersects_aabb(&aabb));
    }
}
