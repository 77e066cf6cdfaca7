// The landscape bundle: everything spatial a run consumes, read-only.
//
// A `Landscape` holds the directed river network, the marsh boundary
// polylines, the competition raster, and the founder populations. The sim
// never mutates any of it. The runner loads a landscape from JSON or falls
// back to `Landscape::demo`, a procedural site built deterministically from
// a seed — the same demo backs the benchmarks and integration tests.
//
// See also: `river.rs`, `raster.rs`, `geometry.rs` for the pieces,
// `sim.rs` for founder spawning.

use crate::geometry::{NearestPoint, Polyline};
use crate::raster::{CompetitionRaster, OPEN_WATER};
use crate::river::RiverGraph;
use crate::types::Point;
use serde::{Deserialize, Serialize};
use tidevetch_prng::SimRng;

/// An initial population: `count` first-generation adults scattered around
/// `position` at construction time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Founder {
    pub position: Point,
    pub count: u32,
}

/// The read-only spatial inputs of a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Landscape {
    pub river: RiverGraph,
    /// Marsh boundary polylines (the land side of the tidal edge).
    pub marsh: Vec<Polyline>,
    pub raster: CompetitionRaster,
    pub founders: Vec<Founder>,
}

impl Landscape {
    /// The closest point on any marsh boundary to `p`, or None if the
    /// landscape has no marsh polylines. Ties keep the earliest polyline.
    pub fn nearest_point_on_marsh(&self, p: Point) -> Option<NearestPoint> {
        let mut best: Option<NearestPoint> = None;
        for line in &self.marsh {
            let hit = line.nearest_point(p);
            if best.is_none_or(|b| hit.distance < b.distance) {
                best = Some(hit);
            }
        }
        best
    }

    /// A procedural demo site: a trunk channel that forks into two
    /// branches, marsh strips flanking every reach, a competition raster
    /// graded by distance from the water, and three founder stands on the
    /// trunk bank. Deterministic for a given seed.
    pub fn demo(seed: u64) -> Self {
        let mut rng = SimRng::new(seed);

        let mut river = RiverGraph::new();
        let trunk_a = Point::new(10.0, 60.0);
        let trunk_b = Point::new(120.0, 60.0);
        let branch_hi = Point::new(190.0, 95.0);
        let branch_lo = Point::new(190.0, 25.0);
        let n0 = river.add_node(trunk_a);
        let n1 = river.add_node(trunk_b);
        let n2 = river.add_node(branch_hi);
        let n3 = river.add_node(branch_lo);
        river.add_edge(n0, n1, jittered_line(trunk_a, trunk_b, &mut rng));
        river.add_edge(n1, n2, jittered_line(trunk_b, branch_hi, &mut rng));
        river.add_edge(n1, n3, jittered_line(trunk_b, branch_lo, &mut rng));

        // Marsh boundary strips 2.0 units to either side of each reach.
        let mut marsh = Vec::new();
        for (a, b) in [(trunk_a, trunk_b), (trunk_b, branch_hi), (trunk_b, branch_lo)] {
            let (left, right) = flanking_lines(a, b, 2.0);
            marsh.push(left);
            marsh.push(right);
        }

        // Habitat grades off with distance from the channel: open water in
        // the channel itself, the prime band along the marsh edge, then
        // poorer classes toward the upland.
        let width = 200u32;
        let height = 120u32;
        let mut raster = CompetitionRaster::filled(width, height, Point::new(0.0, 0.0), 20);
        for y in 0..height {
            for x in 0..width {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let Some(loc) = river.nearest_point(center) else {
                    continue;
                };
                let cell = crate::types::GridCell::new(x, y);
                if loc.distance < 1.0 {
                    raster.set_class(cell, OPEN_WATER);
                } else if loc.distance < 6.0 {
                    raster.set_class(cell, 130 + (rng.range_u64(0, 8) as i32));
                } else if loc.distance < 12.0 {
                    raster.set_class(cell, 85 + (rng.range_u64(0, 10) as i32));
                }
            }
        }

        let founders = vec![
            Founder {
                position: Point::new(30.0, 63.0),
                count: 25,
            },
            Founder {
                position: Point::new(60.0, 57.0),
                count: 25,
            },
            Founder {
                position: Point::new(95.0, 63.0),
                count: 25,
            },
        ];

        Self {
            river,
            marsh,
            raster,
            founders,
        }
    }
}

/// A straight reach with a couple of interior vertices nudged off-axis, so
/// the demo channel meanders a little.
fn jittered_line(a: Point, b: Point, rng: &mut SimRng) -> Polyline {
    let mut points = vec![a];
    for t in [0.33, 0.66] {
        let base = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
        points.push(Point::new(
            base.x + rng.range_f64(-1.0, 1.0),
            base.y + rng.range_f64(-1.0, 1.0),
        ));
    }
    points.push(b);
    Polyline::new(points)
}

/// Two straight polylines offset perpendicular to the a->b axis.
fn flanking_lines(a: Point, b: Point, offset: f64) -> (Polyline, Polyline) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    let (nx, ny) = (-dy / len * offset, dx / len * offset);
    let left = Polyline::new(vec![
        Point::new(a.x + nx, a.y + ny),
        Point::new(b.x + nx, b.y + ny),
    ]);
    let right = Polyline::new(vec![
        Point::new(a.x - nx, a.y - ny),
        Point::new(b.x - nx, b.y - ny),
    ]);
    (left, right)
}
