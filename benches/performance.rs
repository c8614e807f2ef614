use capvec::CapVec;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn bench_sequential_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_push");

    for size in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("push_back", size), size, |b, &size| {
            b.iter(|| {
                let mut vec = CapVec::new();
                for i in 0..size {
                    vec.push_back(black_box(i)).unwrap();
                }
                black_box(vec.len())
            });
        });
        group.bench_with_input(
            BenchmarkId::new("reserved_push_back", size),
            size,
            |b, &size| {
                b.iter(|| {
                    let mut vec = CapVec::new();
                    vec.reserve(size).unwrap();
                    for i in 0..size {
                        vec.push_back(black_box(i)).unwrap();
                    }
                    black_box(vec.len())
                });
            },
        );
    }
    group.finish();
}

fn bench_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_access");

    for size in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("at", size), size, |b, &size| {
            let vec: CapVec<usize> = (0..size).collect();

            b.iter(|| {
                for i in 0..size {
                    black_box(vec.at(i).unwrap());
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("cursor_index", size), size, |b, &size| {
            let vec: CapVec<usize> = (0..size).collect();

            b.iter(|| {
                let mut cursor = vec.cbegin();
                while cursor != vec.cend() {
                    black_box(vec[cursor]);
                    cursor.inc();
                }
            });
        });
    }
    group.finish();
}

fn bench_iterator_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterator");

    for size in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("full_iteration", size),
            size,
            |b, &size| {
                let vec: CapVec<usize> = (0..size).collect();

                b.iter(|| {
                    for item in black_box(&vec) {
                        black_box(item);
                    }
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("reverse_iteration", size),
            size,
            |b, &size| {
                let vec: CapVec<usize> = (0..size).collect();

                b.iter(|| {
                    for item in black_box(&vec).iter_rev() {
                        black_box(item);
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_insert_erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_erase");

    for size in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("insert_front_erase_front", size),
            size,
            |b, &size| {
                b.iter(|| {
                    let mut vec = CapVec::new();
                    for i in 0..size {
                        black_box(vec.insert(vec.begin(), i).unwrap());
                    }
                    while !vec.is_empty() {
                        black_box(vec.erase(vec.begin()));
                    }
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("insert_iter_middle", size),
            size,
            |b, &size| {
                let base: CapVec<usize> = (0..size).collect();

                b.iter(|| {
                    let mut vec = base.clone();
                    let middle = vec.begin() + (size / 2) as isize;
                    black_box(vec.insert_iter(middle, 0..size).unwrap());
                    black_box(vec.len())
                });
            },
        );
    }
    group.finish();
}

fn bench_assign_and_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_resize");

    for size in [1024, 4096].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("assign", size), size, |b, &size| {
            let mut vec = CapVec::new();
            b.iter(|| {
                vec.assign(size, black_box(7u8)).unwrap();
                vec.assign(size / 2, black_box(3u8)).unwrap();
            });
        });
        group.bench_with_input(BenchmarkId::new("resize", size), size, |b, &size| {
            b.iter(|| {
                let mut vec = CapVec::new();
                for step in 1..=8 {
                    vec.resize(size * step / 8, black_box(1u8)).unwrap();
                }
                black_box(vec.capacity())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_push,
    bench_random_access,
    bench_iterator_performance,
    bench_insert_erase,
    bench_assign_and_resize
);
criterion_main!(benches);
