// Codec and surface benchmarks
// Performance of the per-frame conversion path

use criterion::{criterion_group, criterion_main, Criterion};
use ips_sim::display::{from_gray8, from_rgb565, GrayTable, HeadlessTarget, Pixel};
use ips_sim::{PresentationPump, SurfaceManager};
use std::hint::black_box;

/// Camera frame geometry
const WIDTH: usize = 188;
const HEIGHT: usize = 120;

/// Helper function to create a gradient test frame
fn gradient_frame() -> Vec<u8> {
    (0..WIDTH * HEIGHT).map(|i| (i % 256) as u8).collect()
}

/// Benchmark grayscale conversion: direct arithmetic vs cached table
fn bench_gray_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("gray_conversion");
    let frame = gradient_frame();
    let mut output = vec![Pixel::BLACK; frame.len()];

    group.bench_function("from_gray8", |b| {
        b.iter(|| {
            for (dst, &sample) in output.iter_mut().zip(&frame) {
                *dst = from_gray8(sample);
            }
            black_box(&output);
        });
    });

    group.bench_function("gray_table", |b| {
        let table = GrayTable::new();
        b.iter(|| {
            table.convert_into(black_box(&frame), &mut output);
            black_box(&output);
        });
    });

    group.finish();
}

/// Benchmark RGB565 expansion over the whole color space
fn bench_rgb565(c: &mut Criterion) {
    c.bench_function("from_rgb565_all_colors", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for color in 0..=u16::MAX {
                acc ^= from_rgb565(black_box(color)).0;
            }
            black_box(acc)
        });
    });
}

/// Benchmark a full producer iteration against the headless target
fn bench_frame_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_cycle");
    let frame = gradient_frame();

    group.bench_function("write_frame", |b| {
        let mut screen = SurfaceManager::new(HeadlessTarget::new(), 2);
        b.iter(|| {
            screen
                .write_frame(black_box(&frame), WIDTH, HEIGHT)
                .unwrap();
        });
    });

    group.bench_function("write_frame_and_present", |b| {
        let mut screen = SurfaceManager::new(HeadlessTarget::new(), 2);
        b.iter(|| {
            screen
                .write_frame(black_box(&frame), WIDTH, HEIGHT)
                .unwrap();
            screen.write_point(94, 60, 0xF800);
            screen.present();
            black_box(screen.is_open())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_gray_conversion,
    bench_rgb565,
    bench_frame_cycle
);
criterion_main!(benches);
