//! bl-bench: shared fixtures for the Criterion benches.

use bl_core::{Beluga, Jig, JigTypeId, ProblemState, ProductionLine, Rack};

/// Mid-game snapshot with `n_racks` racks and partially filled surfaces.
///
/// Deterministic: the same arguments produce the same snapshot.
pub fn bench_state(n_racks: usize) -> ProblemState {
    let types = JigTypeId::ALL;
    let jigs: Vec<Jig> = (0..n_racks * 2 + 4)
        .map(|i| Jig::new(types[i % types.len()], i % 3 == 0))
        .collect();

    let racks: Vec<Rack> = (0..n_racks)
        .map(|r| {
            // Two jigs per rack, everything fits with room to spare.
            Rack::new(120, vec![r * 2, r * 2 + 1])
        })
        .collect();

    let n = jigs.len();
    ProblemState::new(
        jigs,
        vec![Beluga::new(
            vec![n - 4, n - 3],
            vec![JigTypeId::TypeA, JigTypeId::TypeB],
        )],
        vec![Some(n - 2), None],
        vec![Some(n - 1), None],
        racks,
        vec![
            ProductionLine::new(vec![0, 2]),
            ProductionLine::new(vec![1, 3]),
        ],
        vec![None, None],
    )
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
