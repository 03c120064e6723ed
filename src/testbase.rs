//! Common utilities shared by unit tests.
#![cfg(test)]

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aabb::Aabb;
use crate::bounding_hierarchy::{hit_linear, BoundingHierarchy};
use crate::bvh::Bvh;
use crate::hit::HitRecord;
use crate::ray::Ray;
use crate::shapes::{Cylinder, Primitive, Sphere, Triangle};
use crate::{Point3, Real, Vector3};

/// A vector represented as a tuple
pub type TupleVec = (Real, Real, Real);

/// Generate a `TupleVec` for [`proptest::strategy::Strategy`] from -10e10 to 10e10
/// A small enough range to prevent most fp32 errors from breaking certain tests
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -10e10 as Real..10e10 as Real,
        -10e10 as Real..10e10 as Real,
        -10e10 as Real..10e10 as Real,
    )
}

/// Convert a `TupleVec` to a [`Point3`].
pub fn tuple_to_point(tpl: &TupleVec) -> Point3 {
    Point3::new(tpl.0, tpl.1, tpl.2)
}

/// Generates 21 spheres of radius 0.5 centered at `(x, 0, 0)` for `x` in `-10..=10`.
/// The material id of each sphere is `x + 10`, so ids run 0 to 20 from left to right.
/// Neighbours touch.
pub fn generate_aligned_spheres() -> Vec<Sphere> {
    (-10i32..=10)
        .map(|x| {
            Sphere::new(Point3::new(x as Real, 0.0, 0.0), 0.5, (x + 10) as usize)
                .expect("valid sphere")
        })
        .collect()
}

/// Creates a [`BoundingHierarchy`] for a fixed scene structure.
pub fn build_some_bh<BH: BoundingHierarchy>() -> (Vec<Sphere>, BH) {
    let mut spheres = generate_aligned_spheres();
    let bh = BH::build(&mut spheres);
    (spheres, bh)
}

fn expect_hit<BH: BoundingHierarchy>(
    bh: &BH,
    shapes: &[Sphere],
    ray: &Ray,
    t_max: Real,
    expected: Option<(usize, Real)>,
) {
    let hit = bh.hit(ray, 0.001, t_max, shapes);
    match (hit, expected) {
        (None, None) => {}
        (Some(hit), Some((material_id, t))) => {
            assert_eq!(hit.material_id, material_id, "{:?}", ray);
            assert!((hit.t - t).abs() < 1e-4, "expected t {} got {}", t, hit.t);
        }
        (hit, expected) => panic!("{:?}: expected {:?} got {:?}", ray, expected, hit),
    }
}

/// Perform some fixed nearest-hit queries on BH structures.
pub fn hit_some_bh<BH: BoundingHierarchy>() {
    let (shapes, bh) = build_some_bh::<BH>();
    let ray = |o: (Real, Real, Real), d: (Real, Real, Real)| {
        Ray::new(Point3::new(o.0, o.1, o.2), Vector3::new(d.0, d.1, d.2))
    };

    // Along the row from either end, only the first sphere counts.
    expect_hit(&bh, &shapes, &ray((-20.0, 0.0, 0.0), (1.0, 0.0, 0.0)), Real::INFINITY, Some((0, 9.5)));
    expect_hit(&bh, &shapes, &ray((20.0, 0.0, 0.0), (-1.0, 0.0, 0.0)), Real::INFINITY, Some((20, 9.5)));

    // Across the row.
    expect_hit(&bh, &shapes, &ray((3.0, -10.0, 0.0), (0.0, 1.0, 0.0)), Real::INFINITY, Some((13, 9.5)));
    expect_hit(&bh, &shapes, &ray((3.0, 0.0, 10.0), (0.0, 0.0, -2.0)), Real::INFINITY, Some((13, 4.75)));

    // Above the row.
    expect_hit(&bh, &shapes, &ray((-20.0, 5.0, 0.0), (1.0, 0.0, 0.0)), Real::INFINITY, None);

    // The first sphere is beyond t_max.
    expect_hit(&bh, &shapes, &ray((-20.0, 0.0, 0.0), (1.0, 0.0, 0.0)), 9.0, None);

    // From the center of a sphere, the far side is hit.
    expect_hit(&bh, &shapes, &ray((0.0, 0.0, 0.0), (0.0, 1.0, 0.0)), Real::INFINITY, Some((10, 0.5)));
}

/// Side length of a grid cell of the random scenes. Every shape stays within
/// 0.9 of its cell center, so shapes never touch.
const CELL_SIZE: Real = 2.0;

/// Centers of `n` cells of a cubic grid around the origin, slightly jittered.
fn jittered_cell_centers(rng: &mut StdRng, n: usize) -> Vec<Point3> {
    let side = (n as f64).cbrt().ceil() as usize;
    let half = side as Real * CELL_SIZE / 2.0;
    (0..n)
        .map(|i| {
            let cell = Point3::new(
                (i % side) as Real,
                (i / side % side) as Real,
                (i / (side * side)) as Real,
            );
            let jitter = Vector3::new(
                rng.random_range(-0.1..0.1),
                rng.random_range(-0.1..0.1),
                rng.random_range(-0.1..0.1),
            );
            cell * CELL_SIZE - Vector3::repeat(half) + jitter
        })
        .collect()
}

fn random_unit_vector(rng: &mut StdRng) -> Vector3 {
    loop {
        let v = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let norm = v.norm();
        if norm > 0.1 && norm <= 1.0 {
            return v / norm;
        }
    }
}

/// `n` non-overlapping spheres on a jittered grid. Material ids are `0..n`.
pub fn random_sphere_scene(n: usize, seed: u64) -> Vec<Primitive> {
    let mut rng = StdRng::seed_from_u64(seed);
    jittered_cell_centers(&mut rng, n)
        .into_iter()
        .enumerate()
        .map(|(i, center)| {
            let radius = rng.random_range(0.2..0.7);
            Sphere::new(center, radius, i).expect("valid sphere").into()
        })
        .collect()
}

/// `n` non-overlapping spheres, triangles and cylinders on a jittered grid.
/// Triangles and cylinders are randomly oriented. Material ids are `0..n`.
pub fn random_mixed_scene(n: usize, seed: u64) -> Vec<Primitive> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers = jittered_cell_centers(&mut rng, n);
    centers
        .into_iter()
        .enumerate()
        .map(|(i, center)| match rng.random_range(0..3) {
            0 => Sphere::new(center, rng.random_range(0.2..0.7), i)
                .expect("valid sphere")
                .into(),
            1 => loop {
                let mut vertex = || {
                    let distance: Real = rng.random_range(0.3..0.75);
                    center + random_unit_vector(&mut rng) * distance
                };
                let (a, b, c) = (vertex(), vertex(), vertex());
                if let Ok(triangle) = Triangle::new(a, b, c, i) {
                    break triangle.into();
                }
            },
            _ => {
                let axis = random_unit_vector(&mut rng);
                let height: Real = rng.random_range(0.3..0.9);
                let radius: Real = rng.random_range(0.1..0.3);
                let base = center - axis * (height / 2.0);
                Cylinder::new(base, axis, radius, height, i)
                    .expect("valid cylinder")
                    .into()
            }
        })
        .collect()
}

/// `count` rays starting around `bounds` and aimed at random points inside it.
/// Some rays have one or two zero direction components, some are not normalized.
pub fn random_rays(rng: &mut StdRng, bounds: &Aabb, count: usize) -> Vec<Ray> {
    let size = bounds.size();
    let random_point = |rng: &mut StdRng, margin: Real| {
        Point3::new(
            bounds.min.x - size.x * margin + rng.random::<Real>() * size.x * (1.0 + 2.0 * margin),
            bounds.min.y - size.y * margin + rng.random::<Real>() * size.y * (1.0 + 2.0 * margin),
            bounds.min.z - size.z * margin + rng.random::<Real>() * size.z * (1.0 + 2.0 * margin),
        )
    };

    (0..count)
        .map(|i| {
            let origin = random_point(rng, 0.5);
            let mut direction = random_point(rng, 0.0) - origin;
            if i % 7 == 0 {
                direction.y = 0.0;
            }
            if i % 11 == 0 {
                direction.z = 0.0;
            }
            if direction.norm() < 1e-3 {
                direction = Vector3::new(1.0, 0.0, 0.0);
            }
            if i % 3 == 0 {
                Ray::new(origin, direction)
            } else {
                Ray::normalized(origin, direction)
            }
        })
        .collect()
}

/// Axis-parallel rays through the corners of each sphere's box. They pass the
/// sphere's box but miss the sphere.
pub fn grazing_rays(shapes: &[Primitive]) -> Vec<Ray> {
    let mut rays = Vec::new();
    for shape in shapes {
        let Primitive::Sphere(sphere) = shape else {
            continue;
        };
        let c = sphere.center();
        let off = sphere.radius() * 0.95;
        for (sa, sb) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
            rays.push(Ray::new(
                Point3::new(c.x + sa * off, c.y + sb * off, c.z - 1000.0),
                Vector3::new(0.0, 0.0, 1.0),
            ));
            rays.push(Ray::new(
                Point3::new(c.x + 1000.0, c.y + sa * off, c.z + sb * off),
                Vector3::new(-1.0, 0.0, 0.0),
            ));
        }
    }
    rays
}

/// Both results are misses, or both hit the same material at the same distance.
pub fn assert_same_hit(expected: &Option<HitRecord>, actual: &Option<HitRecord>) {
    match (expected, actual) {
        (None, None) => {}
        (Some(e), Some(a)) => {
            assert_eq!(e.material_id, a.material_id, "expected {:?}\n got {:?}", e, a);
            assert!(
                (e.t - a.t).abs() <= 1e-4 * e.t.abs().max(1.0),
                "expected t {} got {}",
                e.t,
                a.t
            );
        }
        _ => panic!("expected {:?}\n got {:?}", expected, actual),
    }
}

/// Builds a [`Bvh`] over `shapes` and checks it against [`hit_linear`] for `ray_count`
/// random rays, half of them with a finite `t_max`.
pub fn compare_with_brute_force(mut shapes: Vec<Primitive>, ray_count: usize, seed: u64) {
    let bvh = Bvh::build(&mut shapes);
    bvh.assert_consistent(&shapes);

    let bounds = if shapes.is_empty() {
        Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    } else {
        bvh.root_aabb()
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let rays = random_rays(&mut rng, &bounds, ray_count);
    let mut hits = 0;
    for (i, ray) in rays.iter().enumerate() {
        let t_max = if i % 2 == 0 {
            Real::INFINITY
        } else {
            rng.random_range(1.0..50.0)
        };
        let expected = hit_linear(&shapes, ray, 0.001, t_max);
        let actual = bvh.hit(ray, 0.001, t_max, &shapes);
        assert_same_hit(&expected, &actual);
        hits += usize::from(actual.is_some());
    }

    if shapes.len() >= 100 {
        assert!(hits > 0, "no ray hit anything, the comparison is vacuous");
    }
}
