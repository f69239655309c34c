use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use uibind_bridge::ConfigMap;

fn layered_maps(keys: usize) -> (ConfigMap, ConfigMap, ConfigMap) {
    let mut builtin = ConfigMap::new();
    let mut shared = ConfigMap::new();
    let mut declared = ConfigMap::new();
    for i in 0..keys {
        builtin.insert(format!("key{i}"), i as i64);
        if i % 2 == 0 {
            shared.insert(format!("key{i}"), (i as i64) * 10);
        }
        if i % 4 == 0 {
            declared.insert(format!("key{i}"), (i as i64) * 100);
        }
    }
    (builtin, shared, declared)
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    for keys in [8usize, 64, 512] {
        let (builtin, shared, declared) = layered_maps(keys);
        group.bench_function(format!("{keys}_keys"), |b| {
            b.iter(|| {
                black_box(ConfigMap::assemble(
                    black_box(&builtin),
                    Some(black_box(&shared)),
                    black_box(&declared),
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_assemble);
criterion_main!(benches);
