//! bl-replay: training-sample shards for the value net.

pub mod schema;
pub mod writer;

pub use schema::{ACTION_SET_ID, PROTOCOL_VERSION, T_OBSERVATIONS, T_VALUES};
pub use writer::{ReplayError, SampleWriter, SampleWriterConfig, ShardMeta, TrainingSample};

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
