// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core value types for the Platescan pipeline.

use serde::{Deserialize, Serialize};

/// How the Gaussian smoother normalises its running sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Divide the accumulator by the raw kernel sum after every tap.
    ///
    /// Later taps therefore weigh more than earlier ones and a flat region
    /// comes out slightly brighter than its input. This is the reference
    /// behaviour the detector was tuned against.
    #[default]
    PerTap,
    /// Divide once, after the whole window has been accumulated.
    Final,
}

/// Smallest axis-aligned rectangle containing a point set.
///
/// `x`/`y` are the top-left corner; both bounds are inclusive of the
/// extreme points, so a single point has size 1x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRect {
    /// Bounding rectangle of `points`, or `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = (i32, i32)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for (x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x) as u32 + 1,
            height: (max_y - min_y) as u32 + 1,
        })
    }

    /// Clip the rectangle to an image of the given size.
    ///
    /// Returns `None` when nothing of the rectangle lies inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let left = self.x.max(0) as i64;
        let top = self.y.max(0) as i64;
        let right = (self.x as i64 + self.width as i64).min(width as i64);
        let bottom = (self.y as i64 + self.height as i64).min(height as i64);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }

    /// Area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for BoundingRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_rect_of_quad() {
        let rect = BoundingRect::from_points([(10, 5), (40, 6), (41, 20), (9, 19)]).unwrap();
        assert_eq!(rect, BoundingRect { x: 9, y: 5, width: 33, height: 16 });
        assert_eq!(rect.area(), 33 * 16);
    }

    #[test]
    fn bounding_rect_of_nothing_is_none() {
        assert!(BoundingRect::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn clamp_trims_to_image() {
        let rect = BoundingRect { x: -3, y: 2, width: 10, height: 10 };
        let clamped = rect.clamp_to(5, 8).unwrap();
        assert_eq!(clamped, BoundingRect { x: 0, y: 2, width: 5, height: 6 });
    }

    #[test]
    fn clamp_outside_image_is_none() {
        let rect = BoundingRect { x: 20, y: 20, width: 4, height: 4 };
        assert!(rect.clamp_to(10, 10).is_none());
    }

    #[test]
    fn normalization_serializes_snake_case() {
        let json = serde_json::to_string(&Normalization::PerTap).unwrap();
        assert_eq!(json, "\"per_tap\"");
        let parsed: Normalization = serde_json::from_str("\"final\"").unwrap();
        assert_eq!(parsed, Normalization::Final);
    }
}
