//! Observation encoding for schema v1.

use bl_core::{JigId, JigTypeId, ProblemState};

use crate::schema::{F, MAX_RACKS, OBS_HANGAR_SLOTS, OBS_TRAILER_SLOTS, RACK_BASE};

/// Encode the snapshot into the fixed-length high-level view.
///
/// Deterministic: identical snapshots encode identically.
pub fn encode_high_level(s: &ProblemState) -> [f32; F] {
    let mut out = [0.0f32; F];

    // Heads of the production lines, by jig id.
    let line_heads: Vec<JigId> = s
        .production_lines
        .iter()
        .filter_map(|pl| pl.head())
        .collect();

    // Outgoing demand only counts while the active beluga has no cargo.
    let mut needed_outgoing: &[JigTypeId] = &[];
    match s.active_beluga() {
        Some(b) => {
            out[0] = (b.incoming.len() as f32).clamp(0.0, 1.0);
            if out[0] == 0.0 {
                needed_outgoing = &b.outgoing;
            }
        }
        None => out[0] = -1.0,
    }

    for i in 0..OBS_TRAILER_SLOTS {
        let slot = 1 + i;
        out[slot] = match s.trailers_beluga.get(i) {
            None => -1.0,
            Some(None) => 0.5,
            Some(&Some(jig_id)) => {
                let jig = &s.jigs[jig_id];
                if jig.empty && out[0] == 0.0 {
                    if needed_outgoing.contains(&jig.type_id) {
                        0.0
                    } else {
                        0.25
                    }
                } else {
                    1.0
                }
            }
        };
    }

    for i in 0..OBS_TRAILER_SLOTS {
        let slot = 4 + i;
        out[slot] = match s.trailers_factory.get(i) {
            None => -1.0,
            Some(None) => 0.5,
            Some(&Some(jig_id)) => {
                if !s.jigs[jig_id].empty {
                    if line_heads.contains(&jig_id) {
                        1.0
                    } else {
                        0.75
                    }
                } else {
                    0.0
                }
            }
        };
    }

    for i in 0..OBS_HANGAR_SLOTS {
        let slot = 7 + i;
        out[slot] = match s.hangars.get(i) {
            None => -1.0,
            Some(None) => 0.0,
            Some(Some(_)) => 1.0,
        };
    }

    for i in 0..MAX_RACKS {
        let base = RACK_BASE + i * 3;
        let Some(rack) = s.racks.get(i) else {
            out[base] = -1.0;
            out[base + 1] = -1.0;
            out[base + 2] = -1.0;
            continue;
        };
        let items = rack.jigs.len();
        if items == 0 {
            continue;
        }
        out[base + 2] = rack.free_space(&s.jigs) as f32 / rack.capacity as f32;
        for (k, &jig_id) in rack.jigs.iter().enumerate() {
            let jig = &s.jigs[jig_id];
            if jig.empty && needed_outgoing.contains(&jig.type_id) {
                out[base] = (items - k) as f32 / items as f32;
            }
        }
        for (k, &jig_id) in rack.jigs.iter().enumerate() {
            if line_heads.contains(&jig_id) {
                out[base + 1] = (k + 1) as f32 / items as f32;
            }
        }
    }

    out
}
