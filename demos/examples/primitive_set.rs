// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive set.
//!
//! Scatter spheres, then run nearest and ray queries through the lazily built BVH.
//!
//! Run:
//! - `cargo run -p understory_demos --example primitive_set`

use understory_point_search::{BoundingBox, Point3, PrimitiveSet, Ray, Sphere, bcc_lattice};

fn main() {
    let bounds = BoundingBox::from_corners(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 4.0));
    let mut set = PrimitiveSet::from_primitives(
        bcc_lattice(bounds, 2.0)
            .into_iter()
            .map(|c| Sphere::new(c, 0.3)),
    );
    println!("{} spheres, bvh built: {}", set.len(), set.is_bvh_built());

    let probe = Point3::new(2.1, 1.9, 2.4);
    if let Some(hit) = set.nearest(probe) {
        println!("nearest sphere {} at distance {:.3}", hit.index, hit.distance);
    }
    println!("bvh built: {}", set.is_bvh_built());

    let ray = Ray::new(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
    match set.closest_intersection(&ray) {
        Some(hit) => println!("ray hits sphere {} at t = {:.3}", hit.index, hit.t),
        None => println!("ray misses"),
    }

    set.add(Sphere::new(Point3::new(-0.5, 0.0, 0.0), 0.1));
    println!("after add, bvh built: {}", set.is_bvh_built());
    let hit = set.closest_intersection(&ray);
    assert_eq!(hit.map(|h| h.index), Some(set.len() - 1), "new sphere is first on the ray");
}
