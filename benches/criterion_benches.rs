use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pushpull_solver::config::Method;
use pushpull_solver::solver;
use pushpull_solver::LoadPuzzle;

fn bench_two_boxes_bfs(c: &mut Criterion) {
    bench_level(c, Method::Bfs, "levels/custom/03-two-boxes.txt");
}

fn bench_two_boxes_astar(c: &mut Criterion) {
    bench_level(c, Method::AStar, "levels/custom/03-two-boxes.txt");
}

fn bench_level(c: &mut Criterion, method: Method, level_path: &str) {
    let puzzle = level_path.load_puzzle().unwrap();

    c.bench_function(&format!("{} {}", method, level_path), |b| {
        b.iter(|| black_box(solver::solve(black_box(&puzzle), method, false)))
    });
}

criterion_group!(benches, bench_two_boxes_bfs, bench_two_boxes_astar);
criterion_main!(benches);
