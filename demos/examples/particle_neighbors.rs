// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Particle neighbor lists.
//!
//! Seed a lattice of particles, then run a few explicit Euler steps, rebuilding
//! the searcher and neighbor lists each step.
//!
//! Run:
//! - `cargo run -p understory_demos --example particle_neighbors`

use understory_particles::{ParticleSystemConfig, ParticleSystemData2};
use understory_point_search::{BoundingBox, GridResolution, Point2, SearcherKind, triangle_lattice};

fn main() {
    let spacing = 0.05;
    let radius = 1.2 * spacing;
    let bounds = BoundingBox::from_corners(Point2::new(0.0, 0.0), Point2::new(1.0, 0.5));
    let positions = triangle_lattice(bounds, spacing);
    let velocities: Vec<Point2> = positions
        .iter()
        .map(|p| Point2::new(0.5 - p.x, 0.25 - p.y) * 0.1)
        .collect();

    let config = ParticleSystemConfig::default()
        .with_resolution(GridResolution::uniform(32))
        .with_searcher_kind(SearcherKind::ParallelHashGrid);
    let mut particles = ParticleSystemData2::with_config(0, config);
    if let Err(err) = particles.add_particles(&positions, &velocities, &[]) {
        eprintln!("failed to seed particles: {err}");
        return;
    }
    let density = particles.add_scalar_data(0.0);

    let dt = 0.1;
    for step in 0..5 {
        let vel = particles.velocities().to_vec();
        for (p, v) in particles.positions_mut().iter_mut().zip(vel) {
            *p = *p + v * dt;
        }
        particles.build_neighbor_searcher(radius);
        particles.build_neighbor_lists(radius);

        let counts: Vec<f64> = particles
            .neighbor_lists()
            .iter()
            .map(|list| list.len() as f64)
            .collect();
        particles.scalar_data_at_mut(density).copy_from_slice(&counts);

        let max = counts.iter().copied().fold(0.0, f64::max);
        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        println!(
            "step {step}: {} particles, mean neighbors {mean:.2}, max {max}",
            particles.number_of_particles()
        );
    }
}
