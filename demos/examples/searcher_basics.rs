// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Searcher basics.
//!
//! Build each backend over the same points, run a radius query, and check that
//! they agree.
//!
//! Run:
//! - `cargo run -p understory_demos --example searcher_basics`

use kurbo::Point;
use understory_point_search::{
    GridResolution, NeighborSearcherBuilder, Point2, PointNeighborSearcher, SearcherKind,
};

fn main() {
    let points: Vec<Point2> = [
        Point::new(1.0, 3.0),
        Point::new(2.0, 5.0),
        Point::new(-1.0, 3.0),
    ]
    .into_iter()
    .map(Point2::from)
    .collect();
    let origin = Point2::from(Point::ORIGIN);
    let radius = 10.0_f64.sqrt();

    let mut first: Option<Vec<usize>> = None;
    for kind in SearcherKind::ALL {
        let mut searcher: Box<dyn PointNeighborSearcher<Point2>> = NeighborSearcherBuilder::new()
            .with_kind(kind)
            .with_resolution(GridResolution::uniform(4))
            .with_grid_spacing(2.0 * radius)
            .build();
        searcher.build(&points);

        let mut hits = Vec::new();
        searcher.for_each_nearby_point(origin, radius, &mut |i, p| {
            hits.push(i);
            let k: Point = p.into();
            println!("{kind}: point {i} at {k:?}");
        });
        hits.sort_unstable();
        println!("{kind}: {} hit(s) {hits:?}", hits.len());

        match &first {
            None => first = Some(hits),
            Some(want) => assert_eq!(&hits, want, "{kind} should agree with the first backend"),
        }
    }
    assert_eq!(first, Some(vec![0, 2]), "the point at (2, 5) is outside the radius");
}
