//! Criterion benchmarks for level generation, maze filling and pathfinding.
//!
//! Run with: cargo bench --bench map_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use delve::{
    BiasedRecursiveBacktracker, BinaryTree, Builder, GenerationConfig, Map, MazeFiller, Position,
    Rect, RecursiveBacktracker, SideWinder, Tile,
};

fn bench_generate_level(c: &mut Criterion) {
    c.bench_function("generate_level_140x30", |b| {
        b.iter(|| {
            let config = GenerationConfig::new(black_box(7));
            let mut rng = config.rng();
            let mut builder = Builder::new(config);
            builder.generate_level(&mut rng).unwrap();
            builder.into_map()
        })
    });
}

fn bench_maze_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("maze_fill");
    let config = GenerationConfig::new(11);
    let rect = Map::new(config.width, config.height, Tile::SolidRock).rect();

    let algos: [(&str, fn(Rect) -> Box<dyn MazeFiller>); 4] = [
        ("binary_tree", |rect| Box::new(BinaryTree::new(rect))),
        ("sidewinder", |rect| Box::new(SideWinder::new(rect))),
        ("backtracker", |rect| Box::new(RecursiveBacktracker::new(rect))),
        ("biased", |rect| {
            Box::new(
                BiasedRecursiveBacktracker::new(rect)
                    .with_straight_line_bias(3.0)
                    .with_reconnect_prob(0.2),
            )
        }),
    ];
    for (name, make) in algos {
        group.bench_with_input(BenchmarkId::from_parameter(name), &rect, |b, rect| {
            b.iter(|| {
                let mut rng = config.rng();
                let mut builder = Builder::new(config.clone());
                builder.maze_fill(make(*rect).as_mut(), &mut rng).unwrap();
                builder.into_map()
            })
        });
    }
    group.finish();
}

fn bench_pathfinding(c: &mut Criterion) {
    let config = GenerationConfig::new(3);
    let mut rng = config.rng();
    let mut builder = Builder::new(config);
    let rect = builder.map().rect();
    builder
        .maze_fill(&mut RecursiveBacktracker::new(rect), &mut rng)
        .unwrap();
    let map = builder.into_map();
    let start = Position::new(0, 0);
    let (far, _) = map.dist_metrics(start, None, None).furthest();

    c.bench_function("shortest_path_maze", |b| {
        b.iter(|| map.shortest_path(black_box(start), black_box(far)))
    });
    c.bench_function("dist_metrics_maze", |b| {
        b.iter(|| map.dist_metrics(black_box(start), None, None))
    });
}

criterion_group!(benches, bench_generate_level, bench_maze_fill, bench_pathfinding);
criterion_main!(benches);
