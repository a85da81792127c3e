//! bl-mcts: Monte Carlo Tree Search for the Beluga Challenge.
//!
//! The design uses:
//! - UCT selection over owned child vectors with `Weak` parent back-edges
//! - bounded uniform-random rollouts (no learned policy)
//! - root parallelization: independent per-worker trees whose root-level
//!   statistics are merged after all workers join

pub mod mcts;
pub mod node;

pub use mcts::{Mcts, MctsConfig, MctsError, TrainingPair};
pub use node::{backpropagate, expand, NodeRef, SearchNode};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}
