use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bl_bench::bench_state;
use bl_mcts::{expand, SearchNode};

fn bench_best_child(c: &mut Criterion) {
    // Root with every legal child attached and representative visit stats.
    let state = bench_state(6);
    let root = SearchNode::new_root(state.clone());
    for (i, action) in state.possible_actions().into_iter().enumerate() {
        let child = expand(&root, action);
        let mut n = child.borrow_mut();
        n.visits = (i as u32 % 17) + 1;
        n.total_reward = (i as f32).sin() * 40.0;
    }
    {
        let mut r = root.borrow_mut();
        r.visits = r.children.iter().map(|c| c.borrow().visits).sum();
    }

    c.bench_function("bl_mcts_best_child_uct", |b| {
        b.iter(|| black_box(root.borrow().best_child(black_box(1.0))))
    });
    c.bench_function("bl_mcts_best_child_greedy", |b| {
        b.iter(|| black_box(root.borrow().best_child(black_box(0.0))))
    });
}

fn bench_untried_actions(c: &mut Criterion) {
    let state = bench_state(6);
    let root = SearchNode::new_root(state.clone());
    // Half the legal set expanded.
    let actions = state.possible_actions();
    for &action in actions.iter().take(actions.len() / 2) {
        expand(&root, action);
    }

    c.bench_function("bl_mcts_untried_actions", |b| {
        b.iter(|| black_box(root.borrow().untried_actions()))
    });
}

criterion_group!(benches, bench_best_child, bench_untried_actions);
criterion_main!(benches);
