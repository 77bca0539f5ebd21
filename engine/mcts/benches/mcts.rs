//! MCTS benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Heatmap computation on boards at different stages of a game
//! - Rollouts with the hunt/target policy
//! - Full heuristic and guided searches with varying simulation counts
//! - Tree operations (expansion, backpropagation, reroot)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use games_battleship::{BoardState, Coord};
use mcts::{
    rollout, GuidedMcts, Heatmap, HeatmapEvaluator, HeuristicMcts, MctsConfig, MctsTree,
    UniformEvaluator,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Board with the standard fleet and `shots` random cells already fired at.
fn board_after(seed: u64, shots: usize) -> BoardState {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut board = BoardState::new();
    board.place_fleet(&mut rng).unwrap();
    for _ in 0..shots {
        let legal = board.legal_moves();
        board.shoot_at(legal[rng.gen_range(0..legal.len())]);
        if board.has_won() {
            break;
        }
    }
    board
}

/// Opening, midgame and late game boards.
fn phases() -> [(&'static str, BoardState); 3] {
    [
        ("opening", board_after(42, 0)),
        ("midgame", board_after(42, 12)),
        ("late", board_after(42, 24)),
    ]
}

// =============================================================================
// Heatmap and rollout
// =============================================================================

fn bench_heatmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("heatmap");

    for (phase, board) in phases() {
        group.bench_with_input(BenchmarkId::new("compute", phase), &board, |b, board| {
            b.iter(|| black_box(Heatmap::compute(black_box(board), 0.3, 0.7)))
        });
    }

    group.finish();
}

fn bench_rollout(c: &mut Criterion) {
    let mut group = c.benchmark_group("rollout");

    for (phase, board) in phases() {
        let heatmap = Heatmap::compute(&board, 0.3, 0.7);
        group.bench_with_input(BenchmarkId::new("hunt_target", phase), &board, |b, board| {
            let mut rng = ChaCha20Rng::seed_from_u64(7);
            b.iter(|| black_box(rollout(board.clone(), &heatmap, &mut rng)))
        });
    }

    group.finish();
}

// =============================================================================
// Full searches
// =============================================================================

fn bench_heuristic_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_search");
    let board = board_after(42, 0);

    for sims in [50, 100, 200, 400] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("opening", sims), &sims, |b, &sims| {
            let config = MctsConfig::for_heuristic()
                .with_simulations(sims)
                .with_tree_reuse(false);
            let mut engine = HeuristicMcts::with_seed(config, 42);
            b.iter(|| black_box(engine.run(&board).unwrap()))
        });
    }

    group.finish();
}

fn bench_guided_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("guided_search");
    let board = board_after(42, 0);

    for sims in [50, 100, 200, 400] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("uniform", sims), &sims, |b, &sims| {
            let config = MctsConfig::for_guided().with_simulations(sims);
            let mut engine = GuidedMcts::with_seed(UniformEvaluator::new(), config, 42);
            b.iter(|| black_box(engine.run(&board).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("heatmap", sims), &sims, |b, &sims| {
            let config = MctsConfig::for_guided().with_simulations(sims);
            let mut engine = GuidedMcts::with_seed(HeatmapEvaluator::default(), config, 42);
            b.iter(|| black_box(engine.run(&board).unwrap()))
        });
    }

    group.finish();
}

fn bench_game_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_phases");

    for (phase, board) in phases() {
        group.bench_with_input(BenchmarkId::new("200_sims", phase), &board, |b, board| {
            let config = MctsConfig::for_heuristic().with_tree_reuse(false);
            let mut engine = HeuristicMcts::with_seed(config, 42);
            b.iter(|| black_box(engine.run(board).unwrap()))
        });
    }

    group.finish();
}

// =============================================================================
// Tree operations
// =============================================================================

fn bench_tree_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_operations");
    let board = board_after(42, 0);
    let uniform = [1.0 / 36.0; 36];

    group.bench_function("expand_all_root", |b| {
        b.iter(|| {
            let mut tree = MctsTree::new(board.clone());
            black_box(tree.expand_all(tree.root(), &uniform).unwrap())
        })
    });

    // Two-level tree: 36 root children, each with 35 grandchildren
    let mut deep = MctsTree::new(board.clone());
    deep.expand_all(deep.root(), &uniform).unwrap();
    let children = deep.root_node().children.clone();
    for &child in &children {
        deep.expand_all(child, &uniform).unwrap();
    }
    let leaf = deep.get(children[0]).children[0];

    group.bench_function("backpropagate_depth_2", |b| {
        let mut tree = deep.clone();
        b.iter(|| tree.backpropagate(black_box(leaf), 1.0))
    });

    group.bench_function("select_hybrid_child", |b| {
        let mut tree = deep.clone();
        for (i, &child) in children.iter().enumerate() {
            let node = tree.get_mut(child);
            node.visit_count = i as u32 + 1;
            node.value_sum = 1.0;
        }
        tree.get_mut(tree.root()).visit_count = 1000;
        b.iter(|| black_box(tree.select_hybrid_child(tree.root(), 1.41, 0.5)))
    });

    group.bench_function("reroot", |b| {
        let target = Coord::new(3, 3).unwrap();
        b.iter(|| {
            let mut tree = deep.clone();
            let child = tree.find_child(tree.root(), target).unwrap();
            tree.reroot(child).unwrap();
            black_box(tree.len())
        })
    });

    group.bench_function("snapshot", |b| b.iter(|| black_box(deep.snapshot())));

    group.finish();
}

criterion_group!(
    benches,
    bench_heatmap,
    bench_rollout,
    bench_heuristic_search,
    bench_guided_search,
    bench_game_phases,
    bench_tree_operations,
);

criterion_main!(benches);
