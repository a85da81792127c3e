//! bl-core: Beluga Challenge domain rules, snapshot, actions, and
//! configuration.

pub mod action;
#[cfg(test)]
mod action_tests;
pub mod config;
pub mod engine;
pub mod scenario;
pub mod state;

pub use action::{Action, ActionKind, PARAM_ACTION_ORDER};
pub use config::{CollectParams, Config, ConfigError, SearchParams};
pub use scenario::ScenarioError;
pub use state::{
    Beluga, Jig, JigId, JigTypeId, ProblemState, ProductionLine, Rack, SubgoalScores, DEFAULT_MU,
};

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
