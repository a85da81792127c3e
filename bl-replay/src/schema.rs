//! Shard tensor schema and identifiers.

/// Protocol version for training shards.
pub const PROTOCOL_VERSION: u32 = 1;

/// Action set identifier recorded in shard metadata.
pub const ACTION_SET_ID: &str = "beluga_atomic_v1";

/// Tensor names inside safetensors.
pub const T_OBSERVATIONS: &str = "observations";
pub const T_VALUES: &str = "values";
