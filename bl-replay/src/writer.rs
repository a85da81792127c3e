use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bytemuck::cast_slice;
use safetensors::tensor::{Dtype, TensorView};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bl_features::{Observation, F, OBSERVATION_SCHEMA_ID};

use crate::schema::{ACTION_SET_ID, PROTOCOL_VERSION, T_OBSERVATIONS, T_VALUES};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("safetensors: {0}")]
    Safetensors(#[from] safetensors::SafeTensorError),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// One `(observation, value)` training pair extracted from the tree.
#[derive(Clone, Debug)]
pub struct TrainingSample {
    pub observation: Observation,
    pub value: f32,
}

/// Sidecar metadata written next to every shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardMeta {
    pub protocol_version: u32,
    pub observation_schema_id: u32,
    pub observation_len: usize,
    pub action_set_id: String,
    pub num_samples: usize,
    pub scenario: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SampleWriterConfig {
    pub out_dir: PathBuf,
    pub max_samples_per_shard: usize,
    /// Scenario the samples came from, recorded in shard metadata.
    pub scenario: Option<String>,
}

/// Buffers samples and writes them out as numbered safetensors shards with
/// a JSON metadata sidecar. Writes are atomic (tmp file + rename) and the
/// shard index resumes past existing shards in the directory.
pub struct SampleWriter {
    cfg: SampleWriterConfig,
    shard_idx: u64,
    buf: Vec<TrainingSample>,
}

impl SampleWriter {
    pub fn new(cfg: SampleWriterConfig) -> Result<Self, ReplayError> {
        if cfg.max_samples_per_shard == 0 {
            return Err(ReplayError::InvalidConfig(
                "max_samples_per_shard must be > 0",
            ));
        }
        fs::create_dir_all(&cfg.out_dir)?;

        // Best-effort cleanup from any prior crash.
        let _ = remove_stale_tmp_files(&cfg.out_dir);

        let shard_idx = next_shard_idx(&cfg.out_dir)?;
        Ok(Self {
            cfg,
            shard_idx,
            buf: Vec::new(),
        })
    }

    pub fn push(&mut self, sample: TrainingSample) -> Result<(), ReplayError> {
        self.buf.push(sample);
        if self.buf.len() >= self.cfg.max_samples_per_shard {
            self.flush()?;
        }
        Ok(())
    }

    pub fn extend<I: IntoIterator<Item = TrainingSample>>(
        &mut self,
        samples: I,
    ) -> Result<(), ReplayError> {
        for s in samples {
            self.push(s)?;
        }
        Ok(())
    }

    /// Write the buffered samples as one shard. No-op when empty.
    pub fn flush(&mut self) -> Result<(), ReplayError> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let n = self.buf.len();

        let mut observations = Vec::<f32>::with_capacity(n * F);
        let mut values = Vec::<f32>::with_capacity(n);
        for s in &self.buf {
            observations.extend_from_slice(&s.observation);
            values.push(s.value);
        }

        let mut tensors: BTreeMap<String, TensorView<'_>> = BTreeMap::new();
        tensors.insert(
            T_OBSERVATIONS.to_string(),
            TensorView::new(Dtype::F32, vec![n, F], cast_slice(&observations))?,
        );
        tensors.insert(
            T_VALUES.to_string(),
            TensorView::new(Dtype::F32, vec![n], cast_slice(&values))?,
        );

        let final_st = self.shard_path(self.shard_idx);
        let tmp_st = final_st.with_extension("safetensors.tmp");
        let final_meta = self.meta_path(self.shard_idx);
        let tmp_meta = final_meta.with_extension("meta.json.tmp");

        let st_bytes = safetensors::serialize(&tensors, &None)?;
        fs::write(&tmp_st, st_bytes)?;
        fs::rename(&tmp_st, &final_st)?;

        let meta = ShardMeta {
            protocol_version: PROTOCOL_VERSION,
            observation_schema_id: OBSERVATION_SCHEMA_ID,
            observation_len: F,
            action_set_id: ACTION_SET_ID.to_string(),
            num_samples: n,
            scenario: self.cfg.scenario.clone(),
        };
        fs::write(&tmp_meta, serde_json::to_vec_pretty(&meta)?)?;
        fs::rename(&tmp_meta, &final_meta)?;

        self.shard_idx += 1;
        self.buf.clear();
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), ReplayError> {
        self.flush()
    }

    fn shard_path(&self, idx: u64) -> PathBuf {
        self.cfg.out_dir.join(format!("shard_{idx:06}.safetensors"))
    }

    fn meta_path(&self, idx: u64) -> PathBuf {
        self.cfg.out_dir.join(format!("shard_{idx:06}.meta.json"))
    }
}

fn parse_shard_idx(name: &str) -> Option<u64> {
    let rest = name.strip_prefix("shard_")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn next_shard_idx(dir: &Path) -> Result<u64, ReplayError> {
    if !dir.exists() {
        return Ok(0);
    }
    let mut max_idx: Option<u64> = None;
    for entry in fs::read_dir(dir)? {
        let p = entry?.path();
        let Some(name) = p.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !(name.ends_with(".safetensors") || name.ends_with(".meta.json")) {
            continue;
        }
        if let Some(idx) = parse_shard_idx(name) {
            max_idx = Some(max_idx.map_or(idx, |m| m.max(idx)));
        }
    }
    Ok(max_idx.map_or(0, |m| m.saturating_add(1)))
}

fn remove_stale_tmp_files(dir: &Path) -> Result<(), ReplayError> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let p = entry?.path();
        if p.extension().and_then(|e| e.to_str()) == Some("tmp") {
            let _ = fs::remove_file(&p);
        }
    }
    Ok(())
}
