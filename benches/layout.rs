//! Benchmarks for timeline layout and export.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tlview::layout::suggested_export_width;
use tlview::{layout, CellValue, ExportFormat, ExportRenderer, FeatureColorMap, LayoutConfig, Matrix};

/// A program with the usual fixed rows plus `features` generic rows.
fn program(steps: usize, features: usize) -> Matrix {
    let mut rows = Vec::new();
    let mut duration = vec![CellValue::from("Duration")];
    duration.extend((0..steps).map(|i| CellValue::Number(10.0 + i as f64)));
    rows.push(duration);
    let mut temperature = vec![CellValue::from("Temperature")];
    temperature.extend((0..steps).map(|_| CellValue::Number(38.0)));
    rows.push(temperature);
    let mut music = vec![CellValue::from("Musica")];
    music.extend((0..steps).map(|_| CellValue::from("Ambient")));
    rows.push(music);
    for f in 0..features {
        let mut row = vec![CellValue::from(format!("Feature {f}"))];
        row.extend((0..steps).map(|i| CellValue::from(if (i + f) % 3 == 0 { "1" } else { "0" })));
        rows.push(row);
    }
    Matrix::from_rows(rows)
}

fn config_for(matrix: &Matrix) -> LayoutConfig {
    LayoutConfig::default().with_suggested_export_width(suggested_export_width(matrix.step_count()))
}

/// Benchmark layout across program sizes
fn bench_layout(c: &mut Criterion) {
    let colors = FeatureColorMap::default();
    let mut group = c.benchmark_group("layout");
    for (steps, features) in [(10, 5), (60, 10), (240, 20)] {
        let matrix = program(steps, features);
        let config = config_for(&matrix);
        group.throughput(Throughput::Elements((steps * (features + 3)) as u64));
        group.bench_with_input(
            BenchmarkId::new("layout", format!("{steps}x{features}")),
            &matrix,
            |b, m| b.iter(|| layout(black_box(m), &config, &colors)),
        );
    }
    group.finish();
}

/// Benchmark raster and vector export of a mid-sized program
fn bench_export(c: &mut Criterion) {
    let matrix = program(30, 8);
    let descriptor = layout(&matrix, &config_for(&matrix), &FeatureColorMap::default());
    let renderer = ExportRenderer::new();

    c.bench_function("export_png_1920", |b| {
        b.iter(|| {
            renderer
                .export(ExportFormat::Raster, black_box(&descriptor), 1920)
                .expect("raster export")
        })
    });
    c.bench_function("export_svg_1920", |b| {
        b.iter(|| {
            renderer
                .export(ExportFormat::Vector, black_box(&descriptor), 1920)
                .expect("vector export")
        })
    });
}

criterion_group!(benches, bench_layout, bench_export);
criterion_main!(benches);
