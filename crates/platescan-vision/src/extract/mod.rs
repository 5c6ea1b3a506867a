// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region extraction — polygon masks and cropping of the selected plate.

pub mod region;

pub use region::{extract_region, polygon_mask};
