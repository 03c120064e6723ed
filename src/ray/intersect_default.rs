//! This file contains the slab implementation of [`RayIntersection`].

use super::Ray;
use crate::aabb::Aabb;
use crate::utils::{fast_max, fast_min};
use crate::Real;

/// The [`RayIntersection`] trait holds the ray/box test used during traversal.
pub trait RayIntersection {
    /// Returns true if the ray's forward half-line passes through `aabb`.
    fn ray_intersects_aabb(&self, aabb: &Aabb) -> bool;
}

impl RayIntersection for Ray {
    fn ray_intersects_aabb(&self, aabb: &Aabb) -> bool {
        let mut tmin = Real::NEG_INFINITY;
        let mut tmax = Real::INFINITY;

        for axis in 0..3 {
            let inv = self.inv_direction[axis];
            let mut t1 = (aabb.min[axis] - self.origin[axis]) * inv;
            let mut t2 = (aabb.max[axis] - self.origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = fast_max(tmin, t1);
            tmax = fast_min(tmax, t2);
        }

        tmax >= 0.0 && tmin <= tmax
    }
}
