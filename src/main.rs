//! Traces random rays through a random sphere scene, once through the [`Bvh`] and once
//! by brute force, and reports the timings and any disagreement between the two.
//!
//! [`Bvh`]: tracebvh::bvh::Bvh

use std::error::Error;
use std::time::Instant;

use clap::Parser;
use flexi_logger::{detailed_format, Logger};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use tracebvh::hit::HitRecord;
use tracebvh::ray::Ray;
use tracebvh::scene::Scene;
use tracebvh::shapes::{Plane, Sphere};
use tracebvh::{Point3, Real, Vector3};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Number of spheres in the scene.
    #[arg(long, default_value_t = 10_000)]
    spheres: usize,
    /// Number of rays to trace.
    #[arg(long, default_value_t = 100_000)]
    rays: usize,
    /// Seed of the scene and ray generator. Random if not given.
    #[arg(long)]
    seed: Option<u64>,
    /// Trace rays on all cores.
    #[arg(long)]
    parallel: bool,
}

/// Spheres sit in grid cells of this size and never leave them.
const CELL_SIZE: Real = 2.0;

fn random_scene(rng: &mut StdRng, spheres: usize) -> Result<Scene, Box<dyn Error>> {
    let mut scene = Scene::new();
    let side = (spheres as f64).cbrt().ceil() as usize;
    for i in 0..spheres {
        let cell = Vector3::new(
            (i % side) as Real,
            (i / side % side) as Real,
            (i / (side * side)) as Real,
        );
        let jitter = Vector3::new(
            rng.random_range(-0.2..0.2),
            rng.random_range(-0.2..0.2),
            rng.random_range(-0.2..0.2),
        );
        let center = Point3::from(cell * CELL_SIZE + jitter);
        scene.add(Sphere::new(center, rng.random_range(0.1..0.7), i)?);
    }
    scene.add(Plane::new(
        Point3::new(0.0, -CELL_SIZE, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        spheres,
    )?);
    Ok(scene)
}

/// Side length of the cube the spheres occupy. Never below one cell, so an empty
/// scene still gets a non-empty range to aim rays at.
fn scene_extent(spheres: usize) -> Real {
    ((spheres as f64).cbrt().ceil() as Real * CELL_SIZE).max(CELL_SIZE)
}

fn random_rays(rng: &mut StdRng, extent: Real, count: usize) -> Vec<Ray> {
    (0..count)
        .map(|_| {
            let origin = Point3::new(
                rng.random_range(-extent..2.0 * extent),
                rng.random_range(-extent..2.0 * extent),
                rng.random_range(-extent..2.0 * extent),
            );
            let target = Point3::new(
                rng.random_range(0.0..extent),
                rng.random_range(0.0..extent),
                rng.random_range(0.0..extent),
            );
            let direction = target - origin;
            if direction.norm() > 0.0 {
                Ray::normalized(origin, direction)
            } else {
                Ray::new(origin, Vector3::new(0.0, 0.0, 1.0))
            }
        })
        .collect()
}

fn same_hit(a: &Option<HitRecord>, b: &Option<HitRecord>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.material_id == b.material_id && (a.t - b.t).abs() <= 1e-4 * a.t.abs().max(1.0)
        }
        _ => false,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let _logger = Logger::try_with_env_or_str("info")?
        .format(detailed_format)
        .start()?;

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    info!(
        "{} spheres, {} rays, seed {}, parallel: {}",
        cli.spheres, cli.rays, seed, cli.parallel
    );
    let mut rng = StdRng::seed_from_u64(seed);

    let mut scene = random_scene(&mut rng, cli.spheres)?;
    let start = Instant::now();
    scene.build_acceleration_structure();
    info!("Built acceleration structure in {:?}", start.elapsed());

    let rays = random_rays(&mut rng, scene_extent(cli.spheres), cli.rays);

    let start = Instant::now();
    let accelerated: Vec<_> = if cli.parallel {
        scene.hit_all(&rays)
    } else {
        rays.iter().map(|ray| scene.hit_ray(ray)).collect()
    };
    let bvh_duration = start.elapsed();

    let start = Instant::now();
    let brute_force: Vec<_> = if cli.parallel {
        rays.par_iter()
            .map(|ray| scene.hit_brute_force(ray, ray.t_min, ray.t_max))
            .collect()
    } else {
        rays.iter()
            .map(|ray| scene.hit_brute_force(ray, ray.t_min, ray.t_max))
            .collect()
    };
    let brute_force_duration = start.elapsed();

    let hits = accelerated.iter().filter(|hit| hit.is_some()).count();
    let mismatches = accelerated
        .iter()
        .zip(&brute_force)
        .filter(|(a, b)| !same_hit(a, b))
        .count();

    info!(
        "BVH: {:?}, brute force: {:?}, speedup {:.1}x, {} of {} rays hit",
        bvh_duration,
        brute_force_duration,
        brute_force_duration.as_secs_f64() / bvh_duration.as_secs_f64(),
        hits,
        rays.len()
    );

    if mismatches > 0 {
        error!("{} rays disagree between BVH and brute force", mismatches);
        return Err(format!("{} mismatches (seed {})", mismatches, seed).into());
    }
    info!("BVH and brute force agree on every ray");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use tracebvh::Real;

    use super::{random_rays, random_scene, same_hit, scene_extent, CELL_SIZE};

    #[test]
    fn test_empty_scene_still_traces() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut scene = random_scene(&mut rng, 0).unwrap();
        scene.build_acceleration_structure();
        assert_eq!(scene_extent(0), CELL_SIZE);

        let rays = random_rays(&mut rng, scene_extent(0), 10);
        assert_eq!(rays.len(), 10);
        for ray in &rays {
            let accelerated = scene.hit_ray(ray);
            let brute_force = scene.hit_brute_force(ray, ray.t_min, ray.t_max);
            assert!(same_hit(&accelerated, &brute_force));
        }
    }

    #[test]
    fn test_extent_covers_grid() {
        assert_eq!(scene_extent(1), CELL_SIZE);
        for spheres in [2, 8, 27, 28, 1000] {
            let side = scene_extent(spheres) / CELL_SIZE;
            assert!(side * side * side >= spheres as Real);
        }
    }
}
