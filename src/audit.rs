//! Leaderboard purge
//!
//! Completion times are compared against the theoretical minimum for their
//! level. Anything faster than the bound is physically impossible and gets
//! flagged; levels without a usable bound are reported but never flagged.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::SimConfig;
use crate::sim::par::{MinimumTime, minimum_time_ms};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid records: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single leaderboard completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Leaderboard entry id
    pub id: String,
    /// Level completed (1-based)
    pub level: u32,
    /// Reported completion time (ms)
    pub time_ms: u64,
}

/// Parse a JSON array of completion records
pub fn load_records(json: &str) -> Result<Vec<CompletionRecord>, AuditError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a records file
pub fn read_records(path: &Path) -> Result<Vec<CompletionRecord>, AuditError> {
    let json = std::fs::read_to_string(path).map_err(|source| AuditError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_records(&json)
}

/// Minimum times per level for one seed, computed on first use
#[derive(Debug, Clone)]
pub struct ParTable {
    seed: u32,
    config: SimConfig,
    levels: BTreeMap<u32, MinimumTime>,
}

impl ParTable {
    pub fn new(seed: u32, config: SimConfig) -> Self {
        Self {
            seed,
            config,
            levels: BTreeMap::new(),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Bound for a level (cached after the first call)
    pub fn get(&mut self, level: u32) -> MinimumTime {
        let (seed, config) = (self.seed, &self.config);
        *self.levels.entry(level).or_insert_with(|| {
            log::debug!("Computing minimum time for level {}", level);
            minimum_time_ms(level, seed, config)
        })
    }

    /// Number of levels computed so far
    pub fn cached_levels(&self) -> usize {
        self.levels.len()
    }
}

/// Classification of one completion time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Faster than physically possible
    Bogus { bound_ms: u64 },
    /// At or above the bound
    Plausible,
    /// The level has no finite bound
    Unverifiable,
}

pub fn classify(time_ms: u64, bound: &MinimumTime) -> Verdict {
    match bound {
        MinimumTime::Bound { ms } if time_ms < *ms => Verdict::Bogus { bound_ms: *ms },
        MinimumTime::Bound { .. } => Verdict::Plausible,
        MinimumTime::Unreachable(_) => Verdict::Unverifiable,
    }
}

/// A flagged record and the bound it beat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedRecord {
    #[serde(flatten)]
    pub record: CompletionRecord,
    pub bound_ms: u64,
}

/// Result of auditing a batch of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Records to purge
    pub flagged: Vec<FlaggedRecord>,
    /// Count of records that passed
    pub plausible: usize,
    /// Records whose level has no bound
    pub unverifiable: Vec<CompletionRecord>,
}

impl AuditReport {
    pub fn total(&self) -> usize {
        self.flagged.len() + self.plausible + self.unverifiable.len()
    }
}

/// Classify every record against the table, in input order
pub fn audit(records: &[CompletionRecord], table: &mut ParTable) -> AuditReport {
    let mut report = AuditReport::default();
    for record in records {
        match classify(record.time_ms, &table.get(record.level)) {
            Verdict::Bogus { bound_ms } => {
                log::info!(
                    "Flagging {} (level {}): {} ms < {} ms",
                    record.id,
                    record.level,
                    record.time_ms,
                    bound_ms
                );
                report.flagged.push(FlaggedRecord {
                    record: record.clone(),
                    bound_ms,
                });
            }
            Verdict::Plausible => report.plausible += 1,
            Verdict::Unverifiable => report.unverifiable.push(record.clone()),
        }
    }
    log::info!(
        "Audited {} records: {} flagged, {} unverifiable",
        report.total(),
        report.flagged.len(),
        report.unverifiable.len()
    );
    report
}
