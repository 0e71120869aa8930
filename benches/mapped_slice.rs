use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mapped_slice::MappedSlice;
use rand::Rng;
use std::hint::black_box;
use tempfile::TempDir;

fn bench_append_with_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    // Measure amortized growth cost at different final sizes
    for count in [32, 1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("u64", count), &count, |b, &count| {
            b.iter(|| {
                let temp_dir = TempDir::new().unwrap();
                let mut slice =
                    MappedSlice::<u64>::open(temp_dir.path().join("append.bin")).unwrap();
                for i in 0..count as u64 {
                    slice.append(i).unwrap();
                }
                slice.close().unwrap();
            });
        });
    }
    group.finish();
}

fn bench_random_access(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let mut slice = MappedSlice::<u64>::open(temp_dir.path().join("random.bin")).unwrap();
    for i in 0..100_000u64 {
        slice.append(i).unwrap();
    }

    let mut rng = rand::thread_rng();
    let mut group = c.benchmark_group("random_access");

    group.bench_function("get", |b| {
        b.iter(|| {
            let index = rng.gen_range(0..100_000);
            black_box(slice.get(index).unwrap())
        });
    });

    group.bench_function("set", |b| {
        b.iter(|| {
            let index = rng.gen_range(0..100_000);
            slice.set(index, black_box(index as u64)).unwrap();
        });
    });

    group.finish();
}

fn bench_shifting(c: &mut Criterion) {
    let mut group = c.benchmark_group("shift");

    for len in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("insert_remove_head", len), &len, |b, &len| {
            let temp_dir = TempDir::new().unwrap();
            let mut slice =
                MappedSlice::<u64>::open(temp_dir.path().join("shift.bin")).unwrap();
            for i in 0..len as u64 {
                slice.append(i).unwrap();
            }

            b.iter(|| {
                slice.insert_at(0, 42).unwrap();
                slice.remove_at(0).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let mut slice = MappedSlice::<u64>::open(temp_dir.path().join("iter.bin")).unwrap();
    for i in 0..100_000u64 {
        slice.append(i).unwrap();
    }

    let mut group = c.benchmark_group("iteration");

    group.bench_function("iter_sum", |b| {
        b.iter(|| black_box(slice.iter().sum::<u64>()));
    });

    group.bench_function("to_vec", |b| {
        b.iter(|| black_box(slice.to_vec().unwrap()));
    });

    group.bench_function("cursor_walk", |b| {
        b.iter(|| {
            let mut cursor = slice.cursor();
            let mut total = cursor.seek(0).unwrap().unwrap_or(0);
            while let Some(v) = cursor.next().unwrap() {
                total += v;
            }
            black_box(total)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_append_with_growth,
    bench_random_access,
    bench_shifting,
    bench_iteration
);
criterion_main!(benches);
