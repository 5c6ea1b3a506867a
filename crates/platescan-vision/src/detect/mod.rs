// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plate detection — edge extraction, contour ranking, and the quadrilateral search.

pub mod contours;
pub mod edges;
pub mod shape;

pub use contours::{Boundary, find_boundaries, rank_by_area};
pub use edges::detect_edges;
pub use shape::{Polygon, QuadMatch, select_quad};
