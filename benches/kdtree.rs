use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use raykd::geometry::{normalize, sub};
use raykd::{BoundingBox, KdTree, Ray, random_triangles};

const SIZES: [usize; 4] = [100, 1_000, 10_000, 50_000];
const NUM_RAYS: usize = 10_000;

fn scene(count: usize) -> Vec<raykd::Triangle> {
    let bounds = BoundingBox::from_corners([0.0; 3], [100.0; 3]);
    let mut rng = StdRng::seed_from_u64(123456789);
    // Keep the triangle size roughly proportional to the spacing between them
    let edge = 100.0 / (count as f64).cbrt();
    random_triangles(&mut rng, count, &bounds, edge, edge * edge * 1e-3)
}

fn rays(count: usize) -> Vec<Ray> {
    let mut rng = StdRng::seed_from_u64(987654321);
    (0..count)
        .map(|_| {
            let origin = [rng.gen_range(-50.0..150.0), rng.gen_range(-50.0..150.0), 200.0];
            let target = [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)];
            Ray::new(origin, normalize(sub(target, origin)))
        })
        .collect()
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for &size in &SIZES {
        let triangles = scene(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &triangles, |b, tris| {
            // Reuse the tree to measure the rebuild cost
            let mut tree = KdTree::new();
            b.iter(|| {
                tree.build(black_box(tris), 24);
            })
        });
    }
    group.finish();
}

fn benchmark_traverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("traverse");
    let rays = rays(NUM_RAYS);

    for &size in &SIZES {
        let mut tree = KdTree::new();
        tree.build(&scene(size), 24);
        println!("N: {:6}, {}", size, tree.nodes_statistics());

        group.bench_with_input(BenchmarkId::from_parameter(size), &tree, |b, tree| {
            b.iter(|| {
                let mut hits = 0;
                for ray in &rays {
                    if tree.traverse(black_box(ray)).is_hit() {
                        hits += 1;
                    }
                }
                hits
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_traverse);
criterion_main!(benches);
