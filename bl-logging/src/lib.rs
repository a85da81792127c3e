//! bl-logging: append-only NDJSON events for run post-mortems.
//!
//! Scope is deliberately small: one JSON object per line, versioned event
//! schemas, and a lenient reader on the analysis side (not here).

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log schema versioning fields carried by every event.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfoV1 {
    pub protocol_version: u32,
    pub observation_schema_id: u32,
    pub action_set_id: &'static str,
}

/// Summary of one search invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SearchSummaryEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub scenario: String,
    pub step: u32,

    pub simulations: u32,
    pub depth: u32,
    pub threads: usize,

    pub chosen_action: Option<String>,
    pub chosen_params: Vec<usize>,
    pub root_visits: u32,
    pub best_mean_reward: f32,
    pub node_count: usize,
    pub tree_depth: u32,

    pub solved: bool,
    pub elapsed_ms: u64,
}

/// One executed step of the greedy solve loop.
#[derive(Debug, Clone, Serialize)]
pub struct StepEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub run_id: String,
    pub step: u32,
    pub action: String,
    pub params: Vec<usize>,

    pub score: f32,
    pub belugas_unloaded: u32,
    pub belugas_finished: u32,
    pub lines_finished: u32,
    pub solved: bool,
}

#[derive(Debug)]
pub enum NdjsonError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for NdjsonError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NdjsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::fmt::Display for NdjsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
        }
    }
}

impl std::error::Error for NdjsonError {}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
/// With a nonzero flush interval the buffer is flushed every N lines.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append, creating it if needed. No periodic flushing.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines == 0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use serde_json::Value;

    fn read_lines(path: &Path) -> Vec<Value> {
        let s = fs::read_to_string(path).expect("read");
        s.lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str::<Value>(l).ok())
            .collect()
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn writes_one_valid_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let mut w = NdjsonWriter::open_append(&path).unwrap();

        #[derive(Serialize)]
        struct E {
            event: &'static str,
            step: u32,
        }

        w.write_event(&E {
            event: "step",
            step: 1,
        })
        .unwrap();
        w.write_event(&E {
            event: "step",
            step: 2,
        })
        .unwrap();
        w.flush().unwrap();

        let vals = read_lines(&path);
        assert_eq!(vals.len(), 2);
        assert_eq!(vals[0]["step"], 1);
        assert_eq!(vals[1]["step"], 2);
    }

    #[test]
    fn periodic_flush_hits_disk_without_explicit_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let mut w = NdjsonWriter::open_append_with_flush(&path, 2).unwrap();

        #[derive(Serialize)]
        struct E {
            n: u32,
        }

        w.write_event(&E { n: 1 }).unwrap();
        w.write_event(&E { n: 2 }).unwrap();
        // Two lines written, interval reached: both must be visible.
        let vals = read_lines(&path);
        assert_eq!(vals.len(), 2);
    }

    #[test]
    fn search_summary_event_serializes_with_action() {
        let e = SearchSummaryEventV1 {
            event: "search_summary",
            ts_ms: 123,
            v: VersionInfoV1 {
                protocol_version: 1,
                observation_schema_id: 1,
                action_set_id: "beluga_v1",
            },
            run_id: "run-1".to_string(),
            scenario: "toy.json".to_string(),
            step: 0,
            simulations: 300,
            depth: 5,
            threads: 1,
            chosen_action: Some("unload_beluga".to_string()),
            chosen_params: vec![],
            root_visits: 300,
            best_mean_reward: 12.5,
            node_count: 200,
            tree_depth: 6,
            solved: false,
            elapsed_ms: 42,
        };
        let v: Value = serde_json::from_str(&serde_json::to_string(&e).unwrap()).unwrap();
        assert_eq!(v["event"], "search_summary");
        assert_eq!(v["chosen_action"], "unload_beluga");
        assert_eq!(v["v"]["action_set_id"], "beluga_v1");
    }
}
