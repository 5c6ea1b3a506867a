// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the plate pipeline. Covers the hand-rolled
// Gaussian smoother on its own and the full locate step on a synthetic scene.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma, Rgb, RgbImage};

use platescan_core::PipelineConfig;
use platescan_core::config::SmoothingConfig;
use platescan_vision::PlateScanner;
use platescan_vision::preprocess::smooth;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 320x240 dark scene with a bright 160x60 plate in the middle.
fn synthetic_scene() -> RgbImage {
    RgbImage::from_fn(320, 240, |x, y| {
        if (80..240).contains(&x) && (90..150).contains(&y) {
            Rgb([230, 230, 225])
        } else {
            Rgb([30, 35, 25])
        }
    })
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Smoothing dominates the pre-edge cost: 25 taps per interior pixel.
fn bench_smoothing(c: &mut Criterion) {
    let gray = GrayImage::from_fn(320, 240, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
    let config = SmoothingConfig::default();

    c.bench_function("smooth sigma=0.8 (320x240)", |b| {
        b.iter(|| black_box(smooth(black_box(&gray), &config)));
    });
}

/// Grayscale through quad selection on a scene with one clean plate.
fn bench_locate(c: &mut Criterion) {
    let scene = synthetic_scene();
    let scanner = PlateScanner::new(PipelineConfig::default()).expect("default config is valid");

    c.bench_function("locate plate (320x240)", |b| {
        b.iter(|| black_box(scanner.locate(black_box(&scene))));
    });
}

criterion_group!(benches, bench_smoothing, bench_locate);
criterion_main!(benches);
