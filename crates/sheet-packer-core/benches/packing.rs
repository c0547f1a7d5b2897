use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use sheet_packer_core::prelude::*;

fn generate_images(count: usize, min_size: u32, max_size: u32) -> Vec<SourceImage<()>> {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            SourceImage::sized(format!("img_{}", i), w, h)
        })
        .collect()
}

fn bench_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack");

    for count in [50usize, 200, 1000] {
        let images = generate_images(count, 8, 64);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("grow", count), &images, |b, images| {
            let cfg = PackerConfig::builder().grow().build();
            b.iter(|| black_box(pack(images.clone(), &cfg).map(|p| p.layout())));
        });

        group.bench_with_input(BenchmarkId::new("fixed_4096", count), &images, |b, images| {
            let cfg = PackerConfig::builder().fixed(4096, 4096).build();
            b.iter(|| black_box(pack(images.clone(), &cfg).map(|p| p.layout())));
        });
    }

    group.finish();
}

fn bench_ordering(c: &mut Criterion) {
    let images = generate_images(5000, 1, 256);
    c.bench_function("packing_order_5000", |b| {
        b.iter(|| black_box(packing_order(&images)));
    });
}

criterion_group!(benches, bench_modes, bench_ordering);
criterion_main!(benches);
