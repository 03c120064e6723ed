#![no_main]
use std::collections::HashSet;
use std::fmt::{self, Debug, Formatter};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ordered_float::NotNan;
use tracebvh::bounding_hierarchy::{hit_linear, BHShape};
use tracebvh::bvh::Bvh;
use tracebvh::ray::Ray;
use tracebvh::shapes::{Cylinder, Plane, Primitive, Sphere, Triangle};
use tracebvh::{Point3, Real, Vector3};

const LIMIT: Real = 1_000.0;

fuzz_target!(|workload: Workload| {
    workload.fuzz();
});

#[derive(Debug, Arbitrary)]
struct ArbitraryPoint {
    coordinates: [NotNan<Real>; 3],
}

impl ArbitraryPoint {
    fn point(&self) -> Point3 {
        let [x, y, z] = self.coordinates.map(|f| f.into_inner().clamp(-LIMIT, LIMIT));
        Point3::new(x, y, z)
    }

    fn vector(&self) -> Vector3 {
        self.point().coords
    }
}

#[derive(Debug, Arbitrary)]
enum ArbitraryShape {
    Sphere(ArbitraryPoint, NotNan<Real>),
    Triangle(ArbitraryPoint, ArbitraryPoint, ArbitraryPoint),
    Plane(ArbitraryPoint, ArbitraryPoint),
    Cylinder(ArbitraryPoint, ArbitraryPoint, NotNan<Real>, NotNan<Real>),
}

impl ArbitraryShape {
    /// `None` for input the constructors reject.
    fn primitive(&self, material_id: usize) -> Option<Primitive> {
        let size = |f: &NotNan<Real>| f.into_inner().abs().min(LIMIT);
        let primitive = match self {
            ArbitraryShape::Sphere(center, radius) => {
                Sphere::new(center.point(), size(radius), material_id).ok()?.into()
            }
            ArbitraryShape::Triangle(a, b, c) => {
                Triangle::new(a.point(), b.point(), c.point(), material_id).ok()?.into()
            }
            ArbitraryShape::Plane(point, normal) => {
                Plane::new(point.point(), normal.vector(), material_id).ok()?.into()
            }
            ArbitraryShape::Cylinder(base, axis, radius, height) => Cylinder::new(
                base.point(),
                axis.vector(),
                size(radius),
                size(height),
                material_id,
            )
            .ok()?
            .into(),
        };
        Some(primitive)
    }
}

#[derive(Arbitrary)]
struct ArbitraryRay {
    origin: ArbitraryPoint,
    destination: ArbitraryPoint,
}

impl Debug for ArbitraryRay {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.ray(), f)
    }
}

impl ArbitraryRay {
    fn ray(&self) -> Ray {
        let direction = self.destination.point() - self.origin.point();
        // Ensure no degenerate direction.
        if direction.norm() < 1e-3 {
            return Ray::new(self.origin.point(), Vector3::new(1.0, 1.0, 1.0).normalize());
        }
        Ray::normalized(self.origin.point(), direction)
    }
}

#[derive(Debug, Arbitrary)]
struct Workload {
    shapes: Vec<ArbitraryShape>,
    ray: ArbitraryRay,
}

impl Workload {
    fn fuzz(self) {
        let mut shapes: Vec<Primitive> = self
            .shapes
            .iter()
            .enumerate()
            .filter_map(|(i, shape)| shape.primitive(i))
            .collect();
        let bvh = Bvh::build(&mut shapes);
        let ray = self.ray.ray();

        bvh.assert_consistent(&shapes);

        // Both broad phase queries see the same leaves.
        let traverse: HashSet<usize> = bvh
            .traverse(&ray, &shapes)
            .into_iter()
            .map(|shape| shape.material_id())
            .collect();
        let traverse_iterator: HashSet<usize> = bvh
            .traverse_iterator(&ray, &shapes)
            .map(|shape| shape.material_id())
            .collect();
        assert_eq!(traverse, traverse_iterator);

        let expected = hit_linear(&shapes, &ray, 0.001, Real::INFINITY);
        let actual = bvh.hit(&ray, 0.001, Real::INFINITY, &shapes);
        let iterative = bvh.hit_iterative(&ray, 0.001, Real::INFINITY, &shapes);
        assert_eq!(actual, iterative);

        // A box rejected by a rounding error may hide a hit, never invent one.
        if let Some(actual) = actual {
            let expected = expected.expect("BVH hit missed by the linear scan");
            assert!(expected.t <= actual.t, "{:?} is nearer than {:?}", expected, actual);
        }
    }
}
