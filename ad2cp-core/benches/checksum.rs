use ad2cp_core::checksum;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, RngCore, SeedableRng};

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");
    let mut rng = StdRng::seed_from_u64(42);

    for &len in &[10usize, 1023, 65536] {
        let mut data = vec![0u8; len];
        rng.fill_bytes(&mut data);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &data, |b, data| {
            b.iter(|| criterion::black_box(checksum(criterion::black_box(data))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_checksum);
criterion_main!(benches);
