// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour discovery and ranking.
//
// Borders are traced with the Suzuki-Abe follower from `imageproc`, which
// returns every outer and hole border along with its parent in the nesting
// tree. Each traced chain is then compressed to the points where the walking
// direction changes, so straight runs collapse to their two end points.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::contour_area;
use imageproc::point::Point;
use tracing::{debug, instrument};

/// A closed border found in a binary image.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// Direction-change points of the border, in tracing order.
    pub points: Vec<Point<i32>>,
    /// `true` for a hole border (inner edge of a foreground region).
    pub is_hole: bool,
    /// Index of the enclosing border in the extraction order, if any.
    pub parent: Option<usize>,
    /// Unsigned enclosed area of `points`.
    pub area: f64,
}

/// Trace every border of the non-zero regions in `edges`, nested ones included.
#[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
pub fn find_boundaries(edges: &GrayImage) -> Vec<Boundary> {
    if edges.width() == 0 || edges.height() == 0 {
        return Vec::new();
    }

    let boundaries: Vec<Boundary> = find_contours::<i32>(edges)
        .into_iter()
        .map(|contour| {
            let points = compress_chain(&contour.points);
            let area = contour_area(&points);
            Boundary {
                points,
                is_hole: contour.border_type == BorderType::Hole,
                parent: contour.parent,
                area,
            }
        })
        .collect();

    debug!(
        count = boundaries.len(),
        holes = boundaries.iter().filter(|b| b.is_hole).count(),
        nested = boundaries.iter().filter(|b| b.parent.is_some()).count(),
        "Borders traced"
    );
    boundaries
}

/// Sort boundaries by enclosed area, largest first.
///
/// The sort is stable, so equal areas keep their extraction order.
pub fn rank_by_area(mut boundaries: Vec<Boundary>) -> Vec<Boundary> {
    boundaries.sort_by(|a, b| b.area.total_cmp(&a.area));
    boundaries
}

/// Keep only the points of a closed chain where the step direction changes.
///
/// Chains of one or two points are returned as-is.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let mut kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let here = points[i];
            let next = points[(i + 1) % n];
            (here.x - prev.x, here.y - prev.y) != (next.x - here.x, next.y - here.y)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        kept.push(points[0]);
    }
    kept
}
