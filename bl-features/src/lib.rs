//! bl-features: observation schema + canonical encoding.

pub mod encode;
pub mod schema;

pub use encode::encode_high_level;
pub use schema::{F, MAX_RACKS, OBSERVATION_SCHEMA_ID};

/// Observation vector for schema v1.
pub type Observation = [f32; F];

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RACK_BASE;
    use bl_core::{Beluga, Jig, JigTypeId, ProblemState, ProductionLine, Rack};

    fn base_state() -> ProblemState {
        ProblemState::new(
            vec![
                Jig::new(JigTypeId::TypeA, true),
                Jig::new(JigTypeId::TypeB, false),
                Jig::new(JigTypeId::TypeC, true),
                Jig::new(JigTypeId::TypeA, true),
            ],
            vec![Beluga::new(vec![], vec![JigTypeId::TypeA])],
            vec![Some(0), None],
            vec![Some(1), None],
            vec![Rack::new(20, vec![2])],
            vec![ProductionLine::new(vec![1, 2])],
            vec![Some(3), None],
        )
    }

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn no_active_beluga_encodes_minus_one() {
        let mut s = base_state();
        s.belugas.clear();
        s.hangars = vec![None, None];
        let obs = encode_high_level(&s);
        assert_eq!(obs[0], -1.0);
    }

    #[test]
    fn cargo_flag_clamps_to_one() {
        let mut s = base_state();
        s.belugas[0].incoming = vec![1, 2];
        s.trailers_factory = vec![None, None];
        s.hangars = vec![None, None];
        s.racks[0].jigs.clear();
        let obs = encode_high_level(&s);
        assert_eq!(obs[0], 1.0);
        // With cargo aboard, an occupied beluga trailer is always 1.0.
        assert_eq!(obs[1], 1.0);
    }

    #[test]
    fn beluga_trailer_slots_follow_outgoing_demand() {
        let s = base_state();
        let obs = encode_high_level(&s);
        // No cargo aboard, jig 0 is an empty typeA and typeA is demanded.
        assert_eq!(obs[0], 0.0);
        assert_eq!(obs[1], 0.0);
        // Empty slot.
        assert_eq!(obs[2], 0.5);
        // Only two trailers exist; slot 3 is absent.
        assert_eq!(obs[3], -1.0);

        // An empty jig of an undemanded type scores 0.25.
        let mut s2 = s.clone();
        s2.jigs[0] = Jig::new(JigTypeId::TypeD, true);
        let obs2 = encode_high_level(&s2);
        assert_eq!(obs2[1], 0.25);
    }

    #[test]
    fn factory_trailer_slots_distinguish_line_heads() {
        let s = base_state();
        let obs = encode_high_level(&s);
        // Jig 1 is loaded and heads the production line.
        assert_eq!(obs[4], 1.0);
        assert_eq!(obs[5], 0.5);
        assert_eq!(obs[6], -1.0);

        // A loaded jig that no line wants next scores 0.75.
        let mut s2 = s.clone();
        s2.production_lines[0].schedule = vec![2, 1];
        let obs2 = encode_high_level(&s2);
        assert_eq!(obs2[4], 0.75);

        // An empty jig on the factory trailer scores 0.
        let mut s3 = s.clone();
        s3.jigs[1].empty = true;
        let obs3 = encode_high_level(&s3);
        assert_eq!(obs3[4], 0.0);
    }

    #[test]
    fn hangar_slots_are_binary_with_absent_minus_one() {
        let s = base_state();
        let obs = encode_high_level(&s);
        assert_eq!(obs[7], 1.0);
        assert_eq!(obs[8], 0.0);
        assert_eq!(obs[9], -1.0);
    }

    #[test]
    fn rack_triples_encode_demand_line_and_free_ratio() {
        let mut s = base_state();
        // Rack 0 holds [2]; make jig 2 an empty typeA so it matches the
        // demand, and schedule it at a line head.
        s.hangars = vec![None, None];
        s.jigs[2] = Jig::new(JigTypeId::TypeA, true);
        s.production_lines[0].schedule = vec![2];
        let obs = encode_high_level(&s);

        assert_eq!(obs[RACK_BASE], 1.0); // (1 - 0) / 1
        assert_eq!(obs[RACK_BASE + 1], 1.0); // (0 + 1) / 1
        assert_eq!(obs[RACK_BASE + 2], 16.0 / 20.0);

        // Absent racks are -1 triples.
        assert_eq!(obs[RACK_BASE + 3], -1.0);
        assert_eq!(obs[RACK_BASE + 4], -1.0);
        assert_eq!(obs[RACK_BASE + 5], -1.0);
    }

    #[test]
    fn empty_rack_is_a_zero_triple() {
        let mut s = base_state();
        s.racks[0].jigs.clear();
        s.hangars = vec![None, None];
        let obs = encode_high_level(&s);
        assert_eq!(obs[RACK_BASE], 0.0);
        assert_eq!(obs[RACK_BASE + 1], 0.0);
        assert_eq!(obs[RACK_BASE + 2], 0.0);
    }

    #[test]
    fn identical_snapshots_encode_identically() {
        let s = base_state();
        let copy = s.clone();
        assert_eq!(encode_high_level(&s), encode_high_level(&copy));
    }
}
