use std::hint::black_box;

use criterion::{criterion_group, Criterion};
use lineage_arena::{Pool, Slab};
use rand::Rng;

#[derive(Debug, Clone, Copy)]
enum Action {
    Insert(char),
    Remove(usize),
    Access(usize),
}

#[derive(Clone, Copy)]
struct WorkloadConfig {
    inserts: usize,
    removals: usize,
    accesses: usize,
}

// slot indices are recorded against `slab::Slab`, both slabs reuse slots last in first out
fn make_workload(rng: &mut impl Rng, config: WorkloadConfig) -> Vec<Action> {
    assert!(config.removals <= config.inserts);

    let mut slab = slab::Slab::<char>::new();
    let mut workload = Vec::new();
    let mut may_access = Vec::new();
    let (mut inserts, mut removals, mut accesses) =
        (config.inserts, config.removals, config.accesses);

    while inserts + removals + accesses != 0 {
        let pick = rng.random_range(0..inserts + removals + accesses);

        if pick < inserts || may_access.is_empty() {
            if inserts == 0 {
                break;
            }
            inserts -= 1;
            let c = rng.random();
            may_access.push(slab.insert(c));
            workload.push(Action::Insert(c));
        } else if pick < inserts + removals {
            removals -= 1;
            let key = may_access.swap_remove(rng.random_range(0..may_access.len()));
            slab.remove(key);
            workload.push(Action::Remove(key));
        } else {
            accesses -= 1;
            let key = may_access[rng.random_range(0..may_access.len())];
            workload.push(Action::Access(key));
        }
    }

    workload
}

fn bench_slabs(c: &mut Criterion) {
    let mut bench_workload = move |name: &str, config: WorkloadConfig| {
        let workload = make_workload(&mut rand::rng(), config);

        c.benchmark_group(name)
            .throughput(criterion::Throughput::Elements(workload.len() as u64))
            .bench_function("slab", |b| {
                b.iter(|| run_workload_slab(&workload));
            })
            .bench_function("lineage", |b| {
                b.iter(|| run_workload_lineage(&workload));
            });
    };

    bench_workload(
        "insert-removal",
        WorkloadConfig {
            inserts: 1024,
            removals: 1024,
            accesses: 0,
        },
    );

    bench_workload(
        "read-heavy",
        WorkloadConfig {
            inserts: 1024,
            removals: 64,
            accesses: 1024,
        },
    );
}

fn bench_pool(c: &mut Criterion) {
    c.benchmark_group("bulk-reclaim")
        .throughput(criterion::Throughput::Elements(1024))
        .bench_function("slab-clear", |b| {
            let mut slab = Slab::new();
            b.iter(|| {
                for i in 0..1024_u32 {
                    black_box(slab.insert(i));
                }
                slab.clear();
            });
        })
        .bench_function("pool-reset", |b| {
            let mut pool = Pool::new();
            b.iter(|| {
                for i in 0..1024_u32 {
                    black_box(pool.insert(i));
                }
                pool.reset();
            });
        });
}

fn run_workload_lineage(workload: &[Action]) {
    let mut slab = Slab::new();
    for &action in workload {
        match action {
            Action::Insert(c) => {
                slab.insert(c);
            }
            Action::Remove(index) => {
                if let Some(key) = slab.key_at(index) {
                    slab.remove(key);
                }
            }
            Action::Access(index) => {
                black_box(slab.key_at(index).map(|key| slab[key]));
            }
        }
    }
}

fn run_workload_slab(workload: &[Action]) {
    let mut slab = slab::Slab::new();
    for &action in workload {
        match action {
            Action::Insert(c) => {
                slab.insert(c);
            }
            Action::Remove(key) => {
                slab.remove(key);
            }
            Action::Access(key) => {
                black_box(slab[key]);
            }
        }
    }
}

criterion_group!(bench_workloads, bench_slabs, bench_pool);
criterion::criterion_main! { bench_workloads }
