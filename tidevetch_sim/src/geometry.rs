// Planar geometry primitives for the landscape.
//
// River reaches and marsh boundaries are polylines: ordered vertex chains in
// map units. Floating seeds address positions along a reach by arc-length
// index (`point_at_index`), and plants find their river entry points with
// the nearest-point projection queries here.
//
// See also: `river.rs` for the reach graph built from these polylines,
// `landscape.rs` for the marsh boundary set.

use crate::types::Point;
use serde::{Deserialize, Serialize};

/// An ordered chain of vertices. Positions along it are addressed by
/// arc-length index in [0, length].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

/// Result of projecting a point onto a polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestPoint {
    /// The closest point on the polyline.
    pub point: Point,
    /// Arc-length index of that point.
    pub index: f64,
    /// Euclidean distance from the query point.
    pub distance: f64,
}

impl Polyline {
    /// Build a polyline from its vertices. Panics on fewer than two.
    pub fn new(points: Vec<Point>) -> Self {
        assert!(points.len() >= 2, "a polyline needs at least two vertices");
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn first(&self) -> Point {
        self.points[0]
    }

    pub fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Total arc length.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(w[1]))
            .sum()
    }

    /// The point at the given arc-length index, clamped to [0, length].
    pub fn point_at_index(&self, index: f64) -> Point {
        if index <= 0.0 {
            return self.first();
        }
        let mut remaining = index;
        for w in self.points.windows(2) {
            let seg_len = w[0].distance_to(w[1]);
            if remaining <= seg_len {
                if seg_len == 0.0 {
                    return w[0];
                }
                let t = remaining / seg_len;
                return Point::new(
                    w[0].x + t * (w[1].x - w[0].x),
                    w[0].y + t * (w[1].y - w[0].y),
                );
            }
            remaining -= seg_len;
        }
        self.last()
    }

    /// Project `p` onto the polyline: the closest point, its arc-length
    /// index, and the distance. Ties keep the earliest segment.
    pub fn nearest_point(&self, p: Point) -> NearestPoint {
        let mut best = NearestPoint {
            point: self.first(),
            index: 0.0,
            distance: p.distance_to(self.first()),
        };
        let mut cumulative = 0.0;
        for w in self.points.windows(2) {
            let seg_len = w[0].distance_to(w[1]);
            let candidate = project_onto_segment(p, w[0], w[1]);
            let dist = p.distance_to(candidate.point);
            if dist < best.distance {
                best = NearestPoint {
                    point: candidate.point,
                    index: cumulative + candidate.offset,
                    distance: dist,
                };
            }
            cumulative += seg_len;
        }
        best
    }
}

struct SegmentProjection {
    point: Point,
    /// Arc-length offset of the projection from the segment start.
    offset: f64,
}

fn project_onto_segment(p: Point, a: Point, b: Point) -> SegmentProjection {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return SegmentProjection {
            point: a,
            offset: 0.0,
        };
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    SegmentProjection {
        point: Point::new(a.x + t * abx, a.y + t * aby),
        offset: t * len_sq.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Polyline {
        // 10 units east, then 5 units north.
        Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
        ])
    }

    #[test]
    fn length_sums_segments() {
        assert_eq!(l_shape().length(), 15.0);
    }

    #[test]
    fn point_at_index_interpolates() {
        let line = l_shape();
        assert_eq!(line.point_at_index(0.0), Point::new(0.0, 0.0));
        assert_eq!(line.point_at_index(3.0), Point::new(3.0, 0.0));
        // Exactly at the interior vertex.
        assert_eq!(line.point_at_index(10.0), Point::new(10.0, 0.0));
        // On the second segment.
        assert_eq!(line.point_at_index(12.0), Point::new(10.0, 2.0));
        assert_eq!(line.point_at_index(15.0), Point::new(10.0, 5.0));
    }

    #[test]
    fn point_at_index_clamps() {
        let line = l_shape();
        assert_eq!(line.point_at_index(-2.0), line.first());
        assert_eq!(line.point_at_index(99.0), line.last());
    }

    #[test]
    fn nearest_point_projects_onto_interior() {
        let line = l_shape();
        let hit = line.nearest_point(Point::new(4.0, 3.0));
        assert_eq!(hit.point, Point::new(4.0, 0.0));
        assert_eq!(hit.index, 4.0);
        assert_eq!(hit.distance, 3.0);
    }

    #[test]
    fn nearest_point_clamps_to_endpoints() {
        let line = l_shape();
        let hit = line.nearest_point(Point::new(-3.0, -4.0));
        assert_eq!(hit.point, Point::new(0.0, 0.0));
        assert_eq!(hit.index, 0.0);
        assert_eq!(hit.distance, 5.0);

        let hit = line.nearest_point(Point::new(10.0, 9.0));
        assert_eq!(hit.point, Point::new(10.0, 5.0));
        assert_eq!(hit.index, 15.0);
        assert_eq!(hit.distance, 4.0);
    }

    #[test]
    fn nearest_point_roundtrips_through_index() {
        let line = l_shape();
        let hit = line.nearest_point(Point::new(7.2, -1.5));
        let via_index = line.point_at_index(hit.index);
        assert!(via_index.distance_to(hit.point) < 1e-12);
    }

    #[test]
    fn tie_keeps_earliest_segment() {
        // A point equidistant from both arms of the L projects onto the
        // first one.
        let line = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
        ]);
        let hit = line.nearest_point(Point::new(2.0, 2.0));
        assert_eq!(hit.point, Point::new(2.0, 0.0));
    }

    #[test]
    #[should_panic]
    fn single_vertex_rejected() {
        let _ = Polyline::new(vec![Point::new(0.0, 0.0)]);
    }
}
