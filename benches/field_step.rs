//! Benchmarks for the per-frame field update and the link rebuild.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use plexus::{FieldConfig, ParticleField, SegmentBuffer};

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_step");

    for count in [36usize, 72, 144, 288] {
        group.bench_with_input(BenchmarkId::new("nodes", count), &count, |b, &count| {
            let config = FieldConfig::default().with_node_count(count);
            let mut field = ParticleField::new(config, &mut StdRng::seed_from_u64(1));
            field.set_pointer(Vec2::new(50.0, -20.0));
            b.iter(|| {
                field.step(black_box(1.0));
                black_box(field.segments().len())
            })
        });
    }

    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_rebuild");
    let mut rng = StdRng::seed_from_u64(2);
    let positions: Vec<Vec3> = (0..72)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-420.0..420.0),
                rng.gen_range(-260.0..260.0),
                rng.gen_range(-180.0..180.0),
            )
        })
        .collect();

    // Sparse: typical scatter. Saturated: every pair in range, capped early.
    for (name, distance) in [("sparse", 130.0f32), ("saturated", 2000.0)] {
        group.bench_function(name, |b| {
            let mut buffer = SegmentBuffer::with_capacity(250);
            b.iter(|| black_box(buffer.rebuild(black_box(&positions), distance)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_rebuild);
criterion_main!(benches);
