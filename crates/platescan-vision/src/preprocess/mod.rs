// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing — intensity conversion and the noise-reduction pre-step.

pub mod grayscale;
pub mod smooth;

pub use grayscale::color_to_gray;
pub use smooth::{GaussianKernel, smooth};
