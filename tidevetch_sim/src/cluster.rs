// DBSCAN over the year-end reproducing population.
//
// The diagnostic partitions the reproducing-plant locations into spatial
// clusters: density-reachable groups within `epsilon`, expanded breadth
// first, with one deviation from canonical DBSCAN — noise points are
// emitted as singleton clusters at the end, so the output is always a
// partition of the input. At `min_points = 1` (the production setting)
// nothing is ever noise and the clusters are the connected components of
// the epsilon graph.
//
// The partition is independent of input order: which point seeds a cluster
// varies with iteration order, but membership is fixed by reachability.
// Expansion therefore scans its worklist to exhaustion, absorbing the
// neighborhoods of every core point it reaches.
//
// Clustering runs once, at termination, outside the event loop — the only
// place in the crate where `rayon` parallelism is allowed, because no
// simulation randomness flows through it. Epsilon-neighborhood queries go
// through an epsilon-sized grid bucket index; the bucket map is keyed
// lookup only, never iterated, so the hash map cannot leak ordering.
//
// See also: `environment.rs` for the termination hook and the population
// cutoff above which clustering is skipped.

use crate::types::Point;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Partition `points` into DBSCAN clusters (noise as singletons). Returns
/// clusters of indices into `points`; every index appears exactly once.
pub fn cluster(points: &[Point], epsilon: f64, min_points: usize) -> Vec<Vec<usize>> {
    assert!(epsilon > 0.0, "epsilon must be positive");
    assert!(min_points >= 1, "min_points must be at least 1");
    if points.is_empty() {
        return Vec::new();
    }

    let neighborhoods = neighborhoods(points, epsilon);

    let n = points.len();
    let mut visited = vec![false; n];
    let mut clustered = vec![false; n];
    let mut noise = vec![false; n];
    let mut clusters: Vec<Vec<usize>> = Vec::new();

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        if neighborhoods[i].len() < min_points {
            noise[i] = true;
            continue;
        }

        let mut members = vec![i];
        clustered[i] = true;
        let mut worklist = neighborhoods[i].clone();
        let mut next = 0;
        while next < worklist.len() {
            let j = worklist[next];
            next += 1;
            if !visited[j] {
                visited[j] = true;
                if neighborhoods[j].len() >= min_points {
                    worklist.extend_from_slice(&neighborhoods[j]);
                }
            }
            if !clustered[j] {
                members.push(j);
                clustered[j] = true;
                // Reachable after all: un-mark earlier noise.
                noise[j] = false;
            }
        }
        clusters.push(members);
    }

    for (i, &is_noise) in noise.iter().enumerate() {
        if is_noise {
            clusters.push(vec![i]);
        }
    }

    debug_assert_eq!(
        clusters.iter().map(|c| c.len()).sum::<usize>(),
        n,
        "cluster output must partition the input"
    );
    clusters
}

fn bucket_of(p: Point, epsilon: f64) -> (i64, i64) {
    ((p.x / epsilon).floor() as i64, (p.y / epsilon).floor() as i64)
}

/// Closed epsilon-neighborhoods (each point neighbors itself), via a grid
/// bucket index so each query scans at most nine buckets.
fn neighborhoods(points: &[Point], epsilon: f64) -> Vec<Vec<usize>> {
    let mut buckets: FxHashMap<(i64, i64), Vec<usize>> = FxHashMap::default();
    for (i, &p) in points.iter().enumerate() {
        buckets.entry(bucket_of(p, epsilon)).or_default().push(i);
    }

    (0..points.len())
        .into_par_iter()
        .map(|i| {
            let p = points[i];
            let (bx, by) = bucket_of(p, epsilon);
            let mut neighbors = Vec::new();
            for dx in -1..=1 {
                for dy in -1..=1 {
                    if let Some(ids) = buckets.get(&(bx + dx, by + dy)) {
                        for &j in ids {
                            if points[j].distance_to(p) <= epsilon {
                                neighbors.push(j);
                            }
                        }
                    }
                }
            }
            neighbors.sort_unstable();
            neighbors
        })
        .collect()
}
