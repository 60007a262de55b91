//! Performance benchmarks for contact-engine
//!
//! # Running Benchmarks
//!
//! Run all benchmarks:
//! ```bash
//! cargo bench
//! ```
//!
//! Run specific benchmark group:
//! ```bash
//! cargo bench --bench performance skinning
//! cargo bench --bench performance submodel
//! cargo bench --bench performance broad_phase
//! cargo bench --bench performance contact_step
//! ```
//!
//! View HTML reports:
//! ```bash
//! open target/criterion/report/index.html
//! ```
//!
//! # Benchmark Groups
//!
//! - **skinning**: Boundary-face extraction at different element counts
//! - **submodel**: Contact submodel construction from two penetrating slabs
//! - **broad_phase**: All-pairs vs k-d tree candidate search
//! - **contact_step**: Complete per-step force computation

use contact_engine::config::ContactConfig;
use contact_engine::contact::{AllPairsSearch, BroadPhase, ContactManager, KdTreeSearch};
use contact_engine::mesh::{skin_blocks, Vec3};
use contact_engine::partition::{PartitionTopology, SingleProcess};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use synthetic_mesh::{calculate_grid_dimensions, generate_hex_grid, generate_penetrating_slabs};

fn slab_config() -> ContactConfig {
    ContactConfig {
        primary_blocks: vec!["lower".to_string()],
        secondary_blocks: vec!["upper".to_string()],
        penalty_parameter: 1000.0,
    }
}

/// Benchmark skin extraction at different scales
fn benchmark_skinning(c: &mut Criterion) {
    let mut group = c.benchmark_group("skinning");

    let scales = vec![("1K", 1_000), ("10K", 10_000), ("100K", 100_000)];

    for (name, target_elements) in scales {
        let (nx, ny, nz) = calculate_grid_dimensions(target_elements);
        let actual_elements = nx * ny * nz;

        let mesh = generate_hex_grid(nx, ny, nz, 1.0);
        let offset = mesh.max_node_global_id();

        group.throughput(Throughput::Elements(actual_elements as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &mesh, |b, mesh| {
            b.iter(|| {
                let skin = skin_blocks(black_box(mesh), &[1], offset).unwrap();
                black_box(skin);
            });
        });
    }

    group.finish();
}

/// Benchmark submodel construction (skinning + entity building)
fn benchmark_submodel(c: &mut Criterion) {
    let mut group = c.benchmark_group("submodel");
    group.sample_size(10);

    let scales = vec![
        ("100_faces", 10, 10),
        ("1K_faces", 32, 32),
        ("10K_faces", 100, 100),
    ];

    for (name, nx, ny) in scales {
        let mesh = generate_penetrating_slabs(nx, ny, 0.001, 1.0);
        let config = slab_config();

        group.throughput(Throughput::Elements((nx * ny) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &mesh, |b, mesh| {
            b.iter(|| {
                let manager = ContactManager::new(
                    black_box(mesh),
                    &config,
                    mesh.max_node_global_id(),
                    &SingleProcess,
                    &PartitionTopology::default(),
                )
                .unwrap();
                black_box(manager);
            });
        });
    }

    group.finish();
}

/// Benchmark the two broad-phase backends against each other
fn benchmark_broad_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("broad_phase");
    group.sample_size(10);

    let scales = vec![("1K_faces", 32, 32), ("10K_faces", 100, 100)];

    for (name, nx, ny) in scales {
        let mesh = generate_penetrating_slabs(nx, ny, 0.001, 1.0);
        let manager = ContactManager::new(
            &mesh,
            &slab_config(),
            mesh.max_node_global_id(),
            &SingleProcess,
            &PartitionTopology::default(),
        )
        .unwrap();
        let nodes = manager.submodel().contact_nodes().to_vec();
        let triangles = manager.submodel().contact_triangles().to_vec();

        group.throughput(Throughput::Elements((nx * ny) as u64));
        group.bench_with_input(
            BenchmarkId::new("all_pairs", name),
            &(&nodes, &triangles),
            |b, (nodes, triangles)| {
                b.iter(|| {
                    let pairs = AllPairsSearch.candidate_pairs(black_box(nodes), black_box(triangles));
                    black_box(pairs);
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("kdtree", name),
            &(&nodes, &triangles),
            |b, (nodes, triangles)| {
                b.iter(|| {
                    let pairs = KdTreeSearch.candidate_pairs(black_box(nodes), black_box(triangles));
                    black_box(pairs);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark complete contact steps (move, search, project, scatter)
fn benchmark_contact_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("contact_step");
    group.sample_size(10);

    let scales = vec![
        ("100_faces", 10, 10),
        ("1K_faces", 32, 32),
        ("10K_faces", 100, 100),
    ];

    for (name, nx, ny) in scales {
        let mesh = generate_penetrating_slabs(nx, ny, 0.001, 1.0);
        let mut manager = ContactManager::new(
            &mesh,
            &slab_config(),
            mesh.max_node_global_id(),
            &SingleProcess,
            &PartitionTopology::default(),
        )
        .unwrap();

        let displacement = vec![Vec3::zeros(); mesh.num_nodes()];
        let mut contact_force = vec![Vec3::zeros(); mesh.num_nodes()];

        group.throughput(Throughput::Elements((nx * ny) as u64));
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                for f in contact_force.iter_mut() {
                    *f = Vec3::zeros();
                }
                let active = manager
                    .compute_contact_force(
                        black_box(&displacement),
                        &mut contact_force,
                        &SingleProcess,
                    )
                    .unwrap();
                black_box(active);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_skinning,
    benchmark_submodel,
    benchmark_broad_phase,
    benchmark_contact_step,
);
criterion_main!(benches);
