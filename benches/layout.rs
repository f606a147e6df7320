use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use logogrid::{export::SlideDeck, layout, trim, Canvas, Cols, LayoutConfig, LogoGrid};
use std::hint::black_box;

// Helper function to create a logo surrounded by a transparent border
fn create_test_logo(width: u32, height: u32, border: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width + 2 * border, height + 2 * border, |x, y| {
        let inside = x >= border && x < border + width && y >= border && y < border + height;
        if inside && (x + y) % 7 != 0 {
            Rgba([20, 60, 200, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    DynamicImage::ImageRgba8(img)
}

fn create_roster(count: usize) -> Vec<DynamicImage> {
    (0..count)
        .map(|i| create_test_logo(120 + (i as u32 % 5) * 40, 60, 16))
        .collect()
}

// Benchmark trimming different logo sizes
fn bench_trim(c: &mut Criterion) {
    let mut group = c.benchmark_group("trim");
    let sizes = [(100, 40), (500, 200), (1000, 400), (2000, 800)];

    for (width, height) in sizes {
        let img = create_test_logo(width, height, width / 10);
        group.bench_with_input(
            BenchmarkId::new("size", format!("{}x{}", width, height)),
            &img,
            |b, img| {
                b.iter(|| black_box(trim(img)));
            },
        );
    }
    group.finish();
}

// Benchmark the pure geometry for growing rosters
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();

    for count in [1, 10, 50, 200] {
        let roster = create_roster(count);
        group.bench_with_input(BenchmarkId::new("logos", count), &roster, |b, roster| {
            b.iter(|| black_box(layout(roster, &Canvas::STANDARD, Cols::Auto, &config)));
        });
    }
    group.finish();
}

// Compare parallel and sequential pipelines
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let roster = create_roster(24);

    for parallel in [true, false] {
        let config = LayoutConfig::default().with_parallel(parallel);
        group.bench_with_input(
            BenchmarkId::new("parallel", parallel),
            &config,
            |b, config| {
                b.iter(|| {
                    black_box(
                        LogoGrid::try_from_images_with_config(
                            &roster,
                            Canvas::STANDARD,
                            Cols::Auto,
                            config.clone(),
                        )
                        .unwrap(),
                    )
                });
            },
        );
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let grid = LogoGrid::try_from(&create_roster(24)[..]).unwrap();
    c.bench_function("export_24_logos", |b| {
        b.iter(|| black_box(SlideDeck::from_grid(&grid).unwrap().to_bytes().unwrap()));
    });
}

criterion_group!(benches, bench_trim, bench_layout, bench_pipeline, bench_export);
criterion_main!(benches);
