//! High-level observation schema v1.
//!
//! A fixed-length real-valued view of the snapshot for value-net training.
//! Absent slots (fewer trailers/hangars/racks than the schema reserves)
//! encode as -1.
//!
//! ### Layout (v1)
//! - **slot 0**: active beluga cargo flag. -1 if no beluga;
//!   else `clamp(|incoming|, 0, 1)`.
//! - **slots 1..=3**: beluga trailers. 0.5 empty; for an empty jig while the
//!   active beluga has no cargo: 0.0 if its type is demanded in `outgoing`,
//!   0.25 otherwise; 1.0 in every other occupied case.
//! - **slots 4..=6**: factory trailers. 0.5 empty; loaded jig: 1.0 if it is
//!   some production line's head, 0.75 otherwise; empty jig: 0.0.
//! - **slots 7..=9**: hangars. 0.0 empty, 1.0 occupied.
//! - **slots 10..=39**: one `[demand_pos, line_pos, free_ratio]` triple per
//!   rack up to [`MAX_RACKS`]. With `n` jigs in the rack, `demand_pos` is
//!   `(n - k) / n` for the backmost position `k` holding an empty jig whose
//!   type is demanded by the active beluga (0 when none); `line_pos` is
//!   `(k + 1) / n` for the backmost position holding a line-head jig;
//!   `free_ratio` is free space over capacity (all three 0 for an empty
//!   rack).
//!
//! Total: F = 40.

/// Increment whenever the observation layout changes.
pub const OBSERVATION_SCHEMA_ID: u32 = 1;

/// Racks covered by the observation.
pub const MAX_RACKS: usize = 10;

/// Trailer slots per side covered by the observation.
pub const OBS_TRAILER_SLOTS: usize = 3;

/// Hangar slots covered by the observation.
pub const OBS_HANGAR_SLOTS: usize = 3;

/// Observation vector length for schema v1.
pub const F: usize = 10 + 3 * MAX_RACKS;

/// First rack-triple slot.
pub const RACK_BASE: usize = 10;
