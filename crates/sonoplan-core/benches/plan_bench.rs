//! Benchmarks for volume resampling and delay computation
//!
//! Run with: cargo bench -p sonoplan-core --bench plan_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use sonoplan_core::prelude::*;

fn grid_volume(n: usize) -> Volume {
    let half = (n as f64 - 1.0) / 2.0;
    let ax = |id: &str| Axis::linspace(id, -half, half, n, LengthUnit::Mm).unwrap();
    let coords = [ax("x"), ax("y"), ax("z")];
    let data = Grid3::from_fn(n, n, n, |i, j, k| (i + j + k) as f64);
    Volume::new("bench", data, coords, Matrix4::identity()).unwrap()
}

fn linear_array(n: usize) -> Transducer {
    let offset = (n as f64 - 1.0) / 2.0 * 0.3;
    let elements = (0..n)
        .map(|i| Element::new(i, [i as f64 * 0.3 - offset, 0.0, 0.0], [0.0; 3], LengthUnit::Mm))
        .collect();
    Transducer::new("bench", elements, 1.0e6, LengthUnit::Mm).unwrap()
}

fn bench_volume_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume_transform");
    for &n in &[16usize, 32, 48] {
        let vol = grid_volume(n);
        let coords = vol.coords().clone();
        let rot = Matrix4::rot_z(0.3);
        group.throughput(Throughput::Elements((n * n * n) as u64));
        for method in [InterpMethod::Nearest, InterpMethod::Linear, InterpMethod::Cubic] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", method).to_lowercase(), n),
                &n,
                |b, _| {
                    b.iter(|| {
                        vol.transform(
                            black_box(&coords),
                            black_box(&rot),
                            method,
                            OutOfBounds::Fill(f64::NAN),
                        )
                        .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_direct_delays(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_delays");
    let focus = Point::new("f", [0.0, 0.0, 40.0], LengthUnit::Mm);
    let method = DelayMethod::Direct { c0: Some(1540.0) };
    for &n in &[64usize, 256, 1024] {
        let xdc = linear_array(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| method.calc_delays(black_box(&xdc), black_box(&focus), None).unwrap())
        });
    }
    group.finish();
}

fn bench_wheel_plan(c: &mut Criterion) {
    let xdc = linear_array(128);
    let target = Point::new("t", [0.0, 0.0, 40.0], LengthUnit::Mm);
    let pattern = FocalPattern::Wheel {
        center: true,
        num_spokes: 8,
        spoke_radius: 2.0,
        units: LengthUnit::Mm,
    };
    let delay = DelayMethod::Direct { c0: Some(1540.0) };
    let apod = ApodMethod::Uniform;
    c.bench_function("wheel_plan_9_foci", |b| {
        b.iter(|| {
            plan_sources(
                black_box(&xdc),
                black_box(&pattern),
                black_box(&target),
                &delay,
                &apod,
                None,
            )
            .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_volume_transform,
    bench_direct_delays,
    bench_wheel_plan
);
criterion_main!(benches);
