//! # Occupation Benchmarks
//!
//! Performance benchmarks for galhalo-core occupation statistics and CAM.
//!
//! Run with: `cargo bench -p galhalo-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use galhalo_core::synthetic::{fake_galaxy_catalog, fake_halo_catalog};
use galhalo_core::{CamConfig, ConditionalAbunMatch, HaloQuery, HodModel, Leauthaud11Sats, OccupationModel};
use std::hint::black_box;

fn cam_bins() -> Vec<f64> {
    (0..13).map(|i| 10f64.powf(9.0 + 0.25 * f64::from(i))).collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_mean_occupation(c: &mut Criterion) {
    let mut group = c.benchmark_group("mean_occupation");
    let model = HodModel::zheng07(-20.0).expect("model");

    for size in [1_000, 10_000, 100_000].iter() {
        let halos = fake_halo_catalog(*size, 43).expect("halos");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(
                    model
                        .mean_occupation("satellites", &HaloQuery::halo_table(&halos))
                        .expect("mean"),
                )
            });
        });
    }

    group.finish();
}

fn bench_populate_occupations(c: &mut Criterion) {
    let mut group = c.benchmark_group("populate_occupations");
    let model = HodModel::zheng07(-20.0).expect("model");

    for size in [1_000, 10_000, 100_000].iter() {
        let halos = fake_halo_catalog(*size, 43).expect("halos");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(
                    model
                        .populate_occupations_seeded(&HaloQuery::halo_table(&halos), 43)
                        .expect("populate"),
                )
            });
        });
    }

    group.finish();
}

fn bench_satellite_rebuild(c: &mut Criterion) {
    let mut model = Leauthaud11Sats::new(10.5).expect("model");
    let mut bsat = 10.0;

    c.bench_function("leauthaud11_set_param", |b| {
        b.iter(|| {
            bsat += 1e-6;
            model.set_param("bsat", black_box(bsat)).expect("set");
        });
    });
}

fn bench_cam_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("cam_build");

    for size in [10_000, 100_000].iter() {
        let reference = fake_galaxy_catalog(*size, 43).expect("reference");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let config = CamConfig::new("gr_color", "stellar_mass", "zhalf", cam_bins());
                black_box(ConditionalAbunMatch::new(config, &reference).expect("cam"))
            });
        });
    }

    group.finish();
}

fn bench_cam_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("cam_assign");
    let reference = fake_galaxy_catalog(50_000, 43).expect("reference");
    let cam = ConditionalAbunMatch::new(
        CamConfig::new("gr_color", "stellar_mass", "zhalf", cam_bins()),
        &reference,
    )
    .expect("cam");

    for size in [1_000, 10_000, 100_000].iter() {
        let target = fake_galaxy_catalog(*size, 7).expect("target");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(cam.assign_seeded(&target, 11).expect("assign")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_mean_occupation,
    bench_populate_occupations,
    bench_satellite_rebuild,
    bench_cam_build,
    bench_cam_assign,
);

criterion_main!(benches);
