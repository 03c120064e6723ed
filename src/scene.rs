//! A [`Scene`] owns its primitives and the [`Bvh`] built over them, and answers
//! nearest-hit queries for the renderer.

use log::{info, warn};

use crate::bounding_hierarchy::hit_linear;
use crate::bvh::Bvh;
use crate::hit::HitRecord;
use crate::ray::Ray;
use crate::shapes::Primitive;
use crate::Real;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Where a [`Scene`] puts primitives without a finite extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnboundedPolicy {
    /// Keep them in a separate list which every query scans.
    #[default]
    Separate,
    /// Put them into the [`Bvh`] with their stand-in bounds. Every box above such a
    /// leaf becomes huge, so rays can no longer skip those subtrees.
    InHierarchy,
}

/// Runtime options of a [`Scene`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneOptions {
    /// Where planes go when the acceleration structure is built.
    pub unbounded_primitives: UnboundedPolicy,
}

/// A list of primitives plus zero or one acceleration structure over them.
///
/// Adding a primitive discards the structure; queries fall back to a linear scan
/// until [`Scene::build_acceleration_structure`] is called again.
///
/// # Examples
/// ```
/// use tracebvh::ray::Ray;
/// use tracebvh::scene::Scene;
/// use tracebvh::shapes::{Plane, Sphere};
/// use tracebvh::{Point3, Real, Vector3};
///
/// let mut scene = Scene::new();
/// scene.add(Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, 0).unwrap());
/// scene.add(Plane::new(Point3::new(0.0, -0.5, 0.0), Vector3::new(0.0, 1.0, 0.0), 1).unwrap());
/// scene.build_acceleration_structure();
///
/// let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
/// assert_eq!(scene.hit(&ray, 0.001, Real::INFINITY).unwrap().material_id, 0);
///
/// let down = Ray::new(Point3::origin(), Vector3::new(0.0, -1.0, 1.0));
/// assert_eq!(scene.hit(&down, 0.001, Real::INFINITY).unwrap().material_id, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
    unbounded: Vec<Primitive>,
    bvh: Option<Bvh>,
    options: SceneOptions,
}

impl Scene {
    /// Creates an empty scene with default options.
    pub fn new() -> Scene {
        Scene::default()
    }

    /// Creates an empty scene with the given options.
    pub fn with_options(options: SceneOptions) -> Scene {
        Scene {
            options,
            ..Scene::default()
        }
    }

    /// Adds a primitive and drops the acceleration structure, if any.
    pub fn add(&mut self, primitive: impl Into<Primitive>) {
        self.primitives.push(primitive.into());
        self.bvh = None;
    }

    /// Builds the [`Bvh`] over the scene's primitives. Reorders [`Scene::primitives`].
    pub fn build_acceleration_structure(&mut self) {
        if self.options.unbounded_primitives == UnboundedPolicy::Separate {
            let (bounded, unbounded): (Vec<_>, Vec<_>) =
                self.primitives.drain(..).partition(Primitive::is_bounded);
            self.primitives = bounded;
            self.unbounded.extend(unbounded);
        } else {
            self.primitives.append(&mut self.unbounded);
            let planes = self.primitives.iter().filter(|p| !p.is_bounded()).count();
            if planes > 0 {
                warn!(
                    "{} unbounded primitive(s) placed in the BVH, culling will be poor",
                    planes
                );
            }
        }

        #[cfg(feature = "rayon")]
        let bvh = Bvh::build_par(&mut self.primitives);
        #[cfg(not(feature = "rayon"))]
        let bvh = Bvh::build(&mut self.primitives);

        info!(
            "scene acceleration structure: {} primitives in the BVH ({} nodes, depth {}), {} scanned linearly",
            self.primitives.len(),
            bvh.len(),
            bvh.depth(),
            self.unbounded.len()
        );
        self.bvh = Some(bvh);
    }

    /// Nearest hit within `[t_min, t_max]`.
    pub fn hit(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        let Some(bvh) = &self.bvh else {
            return self.hit_brute_force(ray, t_min, t_max);
        };
        let closest = bvh.hit(ray, t_min, t_max, &self.primitives);
        self.hit_unbounded(ray, t_min, t_max, closest)
    }

    /// Nearest hit within `[t_min, t_max]`, testing every primitive.
    pub fn hit_brute_force(&self, ray: &Ray, t_min: Real, t_max: Real) -> Option<HitRecord> {
        let closest = hit_linear(&self.primitives, ray, t_min, t_max);
        self.hit_unbounded(ray, t_min, t_max, closest)
    }

    fn hit_unbounded(
        &self,
        ray: &Ray,
        t_min: Real,
        t_max: Real,
        closest: Option<HitRecord>,
    ) -> Option<HitRecord> {
        let closest_so_far = closest.map_or(t_max, |hit| hit.t);
        hit_linear(&self.unbounded, ray, t_min, closest_so_far).or(closest)
    }

    /// Nearest hit within the ray's own interval.
    pub fn hit_ray(&self, ray: &Ray) -> Option<HitRecord> {
        self.hit(ray, ray.t_min, ray.t_max)
    }

    /// [`Scene::hit_ray`] for a batch of rays, in order.
    pub fn hit_all(&self, rays: &[Ray]) -> Vec<Option<HitRecord>> {
        #[cfg(feature = "rayon")]
        {
            rays.par_iter().map(|ray| self.hit_ray(ray)).collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            rays.iter().map(|ray| self.hit_ray(ray)).collect()
        }
    }

    /// Primitives covered by the [`Bvh`] once built, in tree order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Primitives kept out of the [`Bvh`].
    pub fn unbounded(&self) -> &[Primitive] {
        &self.unbounded
    }

    /// The acceleration structure, or `None` if it was never built or a primitive
    /// was added since.
    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    /// Options the scene was created with.
    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    /// Total number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len() + self.unbounded.len()
    }

    /// Returns `true` if the scene holds no primitives.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
