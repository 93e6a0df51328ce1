//! Persistent log of routing outcomes, read back by the learning loop.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use switchyard_core::Result;

/// Once the log grows past this many records it is trimmed.
pub const MAX_OUTCOMES: usize = 1000;
/// Number of most recent records kept after a trim.
pub const RETAINED_OUTCOMES: usize = 500;
/// Characters of the task kept in a record.
pub const TASK_PREVIEW_CHARS: usize = 100;
/// Latency assumed for a model with no recorded latencies.
pub const DEFAULT_LATENCY_MS: u64 = 2000;
/// Schema version written to the outcome log.
const LOG_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Fail,
}

/// One routing outcome. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    #[serde(alias = "sig")]
    pub signature: String,
    #[serde(rename = "model")]
    pub model_id: String,
    pub outcome: Outcome,
    #[serde(rename = "task", default)]
    pub task_preview: String,
    /// Unix seconds.
    #[serde(alias = "ts", default)]
    pub timestamp: f64,
    #[serde(rename = "latency", default)]
    pub latency_ms: u64,
}

impl OutcomeRecord {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Aggregates for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub total: usize,
    pub success_rate: f64,
    pub avg_latency_ms: u64,
}

#[derive(Serialize, Deserialize)]
struct OutcomeLog {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    outcomes: Vec<OutcomeRecord>,
}

/// Bounded, append-only outcome log, optionally mirrored to a JSON file.
///
/// There is no file locking: concurrent writers from several processes may
/// lose records (last writer wins).
pub struct OutcomeStore {
    path: Option<PathBuf>,
    records: RwLock<Vec<OutcomeRecord>>,
}

impl OutcomeStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Open the log at `path`. A missing or unreadable file yields an empty log.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = load_records(&path);
        Self {
            path: Some(path),
            records: RwLock::new(records),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append a record, trim the log and persist it.
    ///
    /// Persistence failures are logged; the in-memory log keeps the record.
    pub fn append(&self, record: OutcomeRecord) {
        {
            let mut records = self.records.write();
            records.push(record);
            if records.len() > MAX_OUTCOMES {
                let excess = records.len() - RETAINED_OUTCOMES;
                records.drain(..excess);
            }
        }
        if let Err(e) = self.save() {
            warn!(path = ?self.path, error = %e, "failed to persist routing outcomes");
        }
    }

    /// Write the full log to disk. A no-op for in-memory stores.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let records = self.records.read();
        let log = OutcomeLog {
            version: LOG_VERSION,
            outcomes: records.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&log)?)?;
        debug!(count = records.len(), "saved routing outcomes");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Snapshot of the log, oldest first.
    pub fn records(&self) -> Vec<OutcomeRecord> {
        self.records.read().clone()
    }

    /// Fraction of successful outcomes for a model; 1.0 when it has no history.
    pub fn success_rate(&self, model_id: &str) -> f64 {
        let records = self.records.read();
        let (total, ok) = records
            .iter()
            .filter(|r| r.model_id == model_id)
            .fold((0usize, 0usize), |(total, ok), r| {
                (total + 1, ok + usize::from(r.is_success()))
            });
        if total == 0 {
            1.0
        } else {
            ok as f64 / total as f64
        }
    }

    /// Mean of the positive latencies recorded for a model, or [`DEFAULT_LATENCY_MS`].
    pub fn avg_latency(&self, model_id: &str) -> u64 {
        let records = self.records.read();
        let (count, sum) = records
            .iter()
            .filter(|r| r.model_id == model_id && r.latency_ms > 0)
            .fold((0u128, 0u128), |(count, sum), r| {
                (count + 1, sum + u128::from(r.latency_ms))
            });
        if count == 0 {
            DEFAULT_LATENCY_MS
        } else {
            mean_latency(sum, count)
        }
    }

    /// Per-model totals. Models without positive latencies report 0 ms.
    pub fn stats(&self) -> BTreeMap<String, ModelStats> {
        #[derive(Default)]
        struct Acc {
            total: usize,
            ok: usize,
            latency_sum: u128,
            latency_count: u128,
        }

        let mut acc: BTreeMap<String, Acc> = BTreeMap::new();
        for r in self.records.read().iter() {
            let a = acc.entry(r.model_id.clone()).or_default();
            a.total += 1;
            if r.is_success() {
                a.ok += 1;
            }
            if r.latency_ms > 0 {
                a.latency_sum += u128::from(r.latency_ms);
                a.latency_count += 1;
            }
        }

        acc.into_iter()
            .map(|(model, a)| {
                let stats = ModelStats {
                    total: a.total,
                    success_rate: a.ok as f64 / a.total.max(1) as f64,
                    avg_latency_ms: mean_latency(a.latency_sum, a.latency_count.max(1)),
                };
                (model, stats)
            })
            .collect()
    }
}

fn load_records(path: &Path) -> Vec<OutcomeRecord> {
    if !path.exists() {
        return Vec::new();
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(switchyard_core::SwitchyardError::from)
        .and_then(|raw| Ok(serde_json::from_str::<OutcomeLog>(&raw)?));
    match parsed {
        Ok(log) => {
            info!(?path, count = log.outcomes.len(), "loaded routing outcomes");
            log.outcomes
        }
        Err(e) => {
            warn!(?path, error = %e, "failed to load routing outcomes, starting empty");
            Vec::new()
        }
    }
}

/// Latencies are summed in `u128` so huge recorded values cannot overflow.
fn mean_latency(sum: u128, count: u128) -> u64 {
    u64::try_from(sum / count).unwrap_or(u64::MAX)
}
