// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Polygon approximation and the quadrilateral search.
//
// Each ranked border is simplified with closed-curve Douglas-Peucker at a
// tolerance proportional to its perimeter. The first simplified polygon with
// the requested vertex count wins. There is no scoring of aspect ratio or
// convexity, so a small quad-shaped noise border is picked over a larger
// border that does not simplify to four corners.

use imageproc::geometry::arc_length;
use imageproc::point::Point;
use platescan_core::config::ShapeConfig;
use platescan_core::types::BoundingRect;
use tracing::{debug, info, instrument};

use crate::detect::contours::Boundary;

/// Starting-pair refinement passes when splitting a closed curve.
const FAR_PAIR_ITERATIONS: usize = 3;

/// Ordered polygon vertices in image coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<Point<i32>>,
}

impl Polygon {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// A polygon with no vertices, meaning "nothing selected".
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounds of the vertices, `None` when empty.
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        BoundingRect::from_points(self.points.iter().map(|p| (p.x, p.y)))
    }
}

/// The selected plate outline and where it sat in the area ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadMatch {
    pub polygon: Polygon,
    /// Position of the source border in the ranked list (0 = largest).
    pub rank: usize,
    /// Enclosed area of the source border.
    pub area: f64,
}

/// Walk `ranked` in order and return the first border whose simplified
/// polygon has exactly `config.vertex_count` vertices.
#[instrument(skip_all, fields(candidates = ranked.len(), vertex_count = config.vertex_count))]
pub fn select_quad(ranked: &[Boundary], config: &ShapeConfig) -> Option<QuadMatch> {
    for (rank, boundary) in ranked.iter().enumerate() {
        let perimeter = arc_length(&boundary.points, true);
        let epsilon = config.epsilon_ratio * perimeter;
        let approx = approximate_closed(&boundary.points, epsilon);

        if approx.len() == config.vertex_count {
            info!(rank, area = boundary.area, perimeter, "Plate outline selected");
            return Some(QuadMatch {
                polygon: Polygon::new(approx),
                rank,
                area: boundary.area,
            });
        }
        debug!(rank, vertices = approx.len(), "Border rejected");
    }

    info!("No border simplified to a plate outline");
    None
}

/// Simplify a closed curve so no dropped point lies further than `epsilon`
/// from the kept outline.
///
/// The curve is first cut at an approximately farthest pair of points, each
/// half is reduced with Douglas-Peucker, and a final pass removes vertices
/// that sit nearly on the chord between their neighbours.
pub fn approximate_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }
    let eps_sq = epsilon * epsilon;

    // Farthest-pair search, restarting from the last far point each pass.
    let mut start = 0usize;
    let mut far = 0usize;
    let mut far_dist_sq = 0.0f64;
    for _ in 0..FAR_PAIR_ITERATIONS {
        if far_dist_sq > 0.0 {
            start = far;
        }
        let (index, dist_sq) = farthest_from(points, start);
        far = index;
        far_dist_sq = dist_sq;
    }
    if far_dist_sq <= eps_sq {
        return vec![points[start]];
    }

    let mut kept = Vec::new();
    // Half from `start` forward to `far`, then from `far` forward back to `start`.
    let split = if far > start { far } else { far + n };
    simplify_span(points, start, split, eps_sq, &mut kept);
    simplify_span(points, split, start + n, eps_sq, &mut kept);

    drop_near_collinear(kept, eps_sq)
}

/// Douglas-Peucker over the cyclic index span `[first, last]`, pushing every
/// kept point except `last`.
fn simplify_span(
    points: &[Point<i32>],
    first: usize,
    last: usize,
    eps_sq: f64,
    out: &mut Vec<Point<i32>>,
) {
    let n = points.len();
    let at = |i: usize| points[i % n];

    // Spans are processed left to right so output stays in curve order.
    let mut stack = vec![(first, last)];
    while let Some((lo, hi)) = stack.pop() {
        let a = at(lo);
        let b = at(hi);
        let dx = (b.x - a.x) as f64;
        let dy = (b.y - a.y) as f64;

        let mut max_dist = 0.0f64;
        let mut split = lo;
        for i in lo + 1..hi {
            let p = at(i);
            let dist = ((p.y - a.y) as f64 * dx - (p.x - a.x) as f64 * dy).abs();
            if dist > max_dist {
                max_dist = dist;
                split = i;
            }
        }

        if hi - lo > 1 && max_dist * max_dist > eps_sq * (dx * dx + dy * dy) {
            stack.push((split, hi));
            stack.push((lo, split));
        } else {
            out.push(a);
        }
    }
}

/// One pass around the polygon dropping vertices that lie between their
/// neighbours and within `sqrt(0.5) * epsilon` of the diagonal chord joining them.
fn drop_near_collinear(polygon: Vec<Point<i32>>, eps_sq: f64) -> Vec<Point<i32>> {
    let n = polygon.len();
    if n <= 2 {
        return polygon;
    }

    let mut kept: Vec<Point<i32>> = Vec::with_capacity(n);
    let mut remaining = n;
    let mut anchor = polygon[n - 1];
    for i in 0..n {
        let pt = polygon[i];
        let next = if i + 1 < n {
            polygon[i + 1]
        } else {
            kept.first().copied().unwrap_or(polygon[0])
        };

        let dx = (next.x - anchor.x) as f64;
        let dy = (next.y - anchor.y) as f64;
        let dist = ((pt.x - anchor.x) as f64 * dy - (pt.y - anchor.y) as f64 * dx).abs();
        let between = (pt.x - anchor.x) as f64 * (next.x - pt.x) as f64
            + (pt.y - anchor.y) as f64 * (next.y - pt.y) as f64;

        let removable = remaining > 2
            && dx != 0.0
            && dy != 0.0
            && between >= 0.0
            && dist * dist <= 0.5 * eps_sq * (dx * dx + dy * dy);
        if removable {
            remaining -= 1;
            continue;
        }
        kept.push(pt);
        anchor = pt;
    }
    kept
}

fn farthest_from(points: &[Point<i32>], origin: usize) -> (usize, f64) {
    let o = points[origin];
    let mut best = (origin, 0.0f64);
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - o.x) as f64;
        let dy = (p.y - o.y) as f64;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq > best.1 {
            best = (i, dist_sq);
        }
    }
    best
}
