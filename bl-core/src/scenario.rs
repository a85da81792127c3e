//! Scenario JSON decoding into an initial snapshot.
//!
//! Jig identity comes from the `jigs` object's key iteration order: the jig
//! at position i gets id i. The `jig<N>` name pattern is decoded only where
//! jigs are referenced (`flights`, `production_lines`, `racks`), where it
//! resolves to id N - 1.
//!
//! The loader is strict: unknown jig names, unknown type names, and racks
//! whose initial contents exceed capacity are fatal. No partial snapshot is
//! ever returned.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::state::{Beluga, Jig, JigTypeId, ProblemState, ProductionLine, Rack};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown jig type {name:?} in {field}")]
    UnknownJigType { field: &'static str, name: String },
    #[error("bad jig name {name:?} in {field} (expected jig<N>)")]
    BadJigName { field: &'static str, name: String },
    #[error("jig name {name:?} in {field} is out of range for {total} jigs")]
    UnknownJig {
        field: &'static str,
        name: String,
        total: usize,
    },
    #[error("rack {rack} initial contents use {used} of capacity {capacity}")]
    RackOverCapacity { rack: usize, capacity: u32, used: u32 },
}

#[derive(Debug, Deserialize)]
struct JigEntry {
    #[serde(rename = "type")]
    type_name: String,
    empty: bool,
}

#[derive(Debug, Deserialize)]
struct FlightEntry {
    incoming: Vec<String>,
    outgoing: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LineEntry {
    schedule: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RackEntry {
    size: u32,
    jigs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScenarioDoc {
    /// Order-preserving: position in the document is the jig id.
    jigs: IndexMap<String, JigEntry>,
    flights: Vec<FlightEntry>,
    production_lines: Vec<LineEntry>,
    racks: Vec<RackEntry>,
    trailers_beluga: Vec<serde_json::Value>,
    trailers_factory: Vec<serde_json::Value>,
    hangars: Vec<serde_json::Value>,
}

/// Decode a `jig<N>` reference into the zero-based id `N - 1`.
fn parse_jig_id(field: &'static str, name: &str) -> Result<usize, ScenarioError> {
    let bad = || ScenarioError::BadJigName {
        field,
        name: name.to_string(),
    };
    let digits = name.strip_prefix("jig").ok_or_else(bad)?;
    let n: usize = digits.parse().map_err(|_| bad())?;
    if n == 0 {
        return Err(bad());
    }
    Ok(n - 1)
}

fn resolve_jig(field: &'static str, name: &str, total: usize) -> Result<usize, ScenarioError> {
    let id = parse_jig_id(field, name)?;
    if id >= total {
        return Err(ScenarioError::UnknownJig {
            field,
            name: name.to_string(),
            total,
        });
    }
    Ok(id)
}

fn parse_type(field: &'static str, name: &str) -> Result<JigTypeId, ScenarioError> {
    JigTypeId::parse(name).ok_or_else(|| ScenarioError::UnknownJigType {
        field,
        name: name.to_string(),
    })
}

/// Load a scenario file and build the initial snapshot.
pub fn load(path: impl AsRef<Path>) -> Result<ProblemState, ScenarioError> {
    let contents = std::fs::read_to_string(path)?;
    from_json(&contents)
}

/// Build the initial snapshot from a scenario JSON string.
pub fn from_json(json: &str) -> Result<ProblemState, ScenarioError> {
    let doc: ScenarioDoc = serde_json::from_str(json)?;

    // Jig identity follows the object's key iteration order; the key name
    // itself is not decoded here.
    let total = doc.jigs.len();
    let mut jigs: Vec<Jig> = Vec::with_capacity(total);
    for entry in doc.jigs.values() {
        let type_id = parse_type("jigs", &entry.type_name)?;
        jigs.push(Jig::new(type_id, entry.empty));
    }

    let mut belugas = Vec::with_capacity(doc.flights.len());
    for flight in &doc.flights {
        let incoming = flight
            .incoming
            .iter()
            .map(|n| resolve_jig("flights.incoming", n, total))
            .collect::<Result<Vec<_>, _>>()?;
        let outgoing = flight
            .outgoing
            .iter()
            .map(|n| parse_type("flights.outgoing", n))
            .collect::<Result<Vec<_>, _>>()?;
        belugas.push(Beluga::new(incoming, outgoing));
    }

    let mut production_lines = Vec::with_capacity(doc.production_lines.len());
    for line in &doc.production_lines {
        let schedule = line
            .schedule
            .iter()
            .map(|n| resolve_jig("production_lines.schedule", n, total))
            .collect::<Result<Vec<_>, _>>()?;
        production_lines.push(ProductionLine::new(schedule));
    }

    let mut racks = Vec::with_capacity(doc.racks.len());
    for (i, rack) in doc.racks.iter().enumerate() {
        let contents = rack
            .jigs
            .iter()
            .map(|n| resolve_jig("racks.jigs", n, total))
            .collect::<Result<Vec<_>, _>>()?;
        let r = Rack::new(rack.size, contents);
        let used = r.used_space(&jigs);
        if used > r.capacity {
            return Err(ScenarioError::RackOverCapacity {
                rack: i,
                capacity: r.capacity,
                used,
            });
        }
        racks.push(r);
    }

    // Trailer/hangar arrays contribute only their slot counts.
    Ok(ProblemState::new(
        jigs,
        belugas,
        vec![None; doc.trailers_beluga.len()],
        vec![None; doc.trailers_factory.len()],
        racks,
        production_lines,
        vec![None; doc.hangars.len()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "jigs": {
            "jig1": {"type": "typeA", "empty": false},
            "jig2": {"type": "typeB", "empty": true}
        },
        "flights": [
            {"incoming": ["jig1"], "outgoing": ["typeB"]}
        ],
        "production_lines": [
            {"schedule": ["jig1"]}
        ],
        "racks": [
            {"size": 20, "jigs": ["jig2"]}
        ],
        "trailers_beluga": [null, null],
        "trailers_factory": [null],
        "hangars": [null]
    }"#;

    #[test]
    fn minimal_scenario_loads() {
        let s = from_json(MINIMAL).unwrap();
        assert_eq!(s.jigs.len(), 2);
        assert_eq!(s.jigs[0].type_id, JigTypeId::TypeA);
        assert!(!s.jigs[0].empty);
        assert_eq!(s.belugas.len(), 1);
        assert_eq!(s.belugas[0].incoming, vec![0]);
        assert_eq!(s.belugas[0].outgoing, vec![JigTypeId::TypeB]);
        assert_eq!(s.production_lines[0].schedule, vec![0]);
        assert_eq!(s.racks[0].jigs, vec![1]);
        assert_eq!(s.trailers_beluga.len(), 2);
        assert_eq!(s.trailers_factory.len(), 1);
        assert_eq!(s.hangars.len(), 1);
        assert_eq!(s.total_belugas, 1);
        assert_eq!(s.total_lines, 1);
        assert!(!s.is_terminal());
    }

    #[test]
    fn unknown_type_is_fatal() {
        let bad = MINIMAL.replace("typeB", "typeX");
        let err = from_json(&bad).unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownJigType { .. }), "{err}");
    }

    #[test]
    fn bad_jig_name_is_fatal() {
        let bad = MINIMAL.replace("\"jig1\"]", "\"container1\"]");
        let err = from_json(&bad).unwrap_err();
        assert!(matches!(err, ScenarioError::BadJigName { .. }), "{err}");
    }

    #[test]
    fn dangling_jig_reference_is_fatal() {
        let bad = MINIMAL.replace("\"incoming\": [\"jig1\"]", "\"incoming\": [\"jig7\"]");
        let err = from_json(&bad).unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownJig { .. }), "{err}");
    }

    #[test]
    fn rack_over_capacity_is_fatal() {
        // typeB loaded is size 11; a capacity-5 rack cannot hold it.
        let json = r#"{
            "jigs": {"jig1": {"type": "typeB", "empty": false}},
            "flights": [],
            "production_lines": [],
            "racks": [{"size": 5, "jigs": ["jig1"]}],
            "trailers_beluga": [null],
            "trailers_factory": [null],
            "hangars": [null]
        }"#;
        let err = from_json(json).unwrap_err();
        match err {
            ScenarioError::RackOverCapacity {
                rack,
                capacity,
                used,
            } => {
                assert_eq!(rack, 0);
                assert_eq!(capacity, 5);
                assert_eq!(used, 11);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn jig_ids_follow_document_order() {
        // The key names are not decoded for identity: the jig listed first
        // gets id 0, whatever it is called.
        let json = r#"{
            "jigs": {
                "jig2": {"type": "typeB", "empty": true},
                "jig1": {"type": "typeC", "empty": true},
                "jig3": {"type": "typeA", "empty": true}
            },
            "flights": [],
            "production_lines": [],
            "racks": [],
            "trailers_beluga": [],
            "trailers_factory": [],
            "hangars": []
        }"#;
        let s = from_json(json).unwrap();
        assert_eq!(s.jigs[0].type_id, JigTypeId::TypeB);
        assert_eq!(s.jigs[1].type_id, JigTypeId::TypeC);
        assert_eq!(s.jigs[2].type_id, JigTypeId::TypeA);
    }

    #[test]
    fn references_resolve_by_decoded_name_not_key_position() {
        // `jig<N>` in a reference always means id N - 1, independent of
        // where a key of that name appears in the jigs object.
        let json = r#"{
            "jigs": {
                "jig2": {"type": "typeB", "empty": true},
                "jig1": {"type": "typeC", "empty": true}
            },
            "flights": [],
            "production_lines": [],
            "racks": [
                {"size": 20, "jigs": ["jig1"]}
            ],
            "trailers_beluga": [],
            "trailers_factory": [],
            "hangars": []
        }"#;
        let s = from_json(json).unwrap();
        // "jig1" decodes to id 0, which document order assigned to the
        // entry keyed "jig2" (a typeB).
        assert_eq!(s.racks[0].jigs, vec![0]);
        assert_eq!(s.jigs[0].type_id, JigTypeId::TypeB);
    }
}
