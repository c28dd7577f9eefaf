//! Public and internal types for the termrank API and pipeline.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use crate::utils::config::{RankingDefaults, TokenizeDefaults};

/// Term marker for the synthetic bucket collecting every token outside the allow-list
/// (and tokens that normalize to nothing).
pub const UNGROUPED_TERM: &str = "";

/// Frequency of one term in one file, as emitted by a tokenize worker.
///
/// Identity is `(path, term)`: the aggregator keeps only the latest record per key.
#[derive(Clone, Debug, PartialEq)]
pub struct TermFrequency {
    pub path: PathBuf,
    pub term: String,
    /// `count(term) / total tokens` for the file, in `[0, 1]`.
    pub freq: f64,
    /// False only for the [`UNGROUPED_TERM`] bucket; such records count towards totals but never score.
    pub rankable: bool,
}

impl TermFrequency {
    pub fn new(path: PathBuf, term: String, freq: f64) -> Self {
        let rankable = term != UNGROUPED_TERM;
        Self {
            path,
            term,
            freq,
            rankable,
        }
    }
}

/// How inverse document frequency is computed.
///
/// Parses `normal`/`smooth` case-insensitively, from the CLI and from `.termrank.toml`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum IdfMode {
    /// `log10(N / df)`
    #[default]
    Normal,
    /// `log10(N / (df + 1)) + 1`
    Smooth,
}

impl fmt::Display for IdfMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdfMode::Normal => f.write_str("NORMAL"),
            IdfMode::Smooth => f.write_str("SMOOTH"),
        }
    }
}

impl FromStr for IdfMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(IdfMode::Normal),
            "smooth" => Ok(IdfMode::Smooth),
            other => Err(anyhow::anyhow!(
                "unknown idf mode '{other}' (expected normal or smooth)"
            )),
        }
    }
}

impl TryFrom<String> for IdfMode {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// How file content is split, normalized and bucketed into terms.
#[derive(Clone, Debug)]
pub struct TokenizeOpts {
    /// Terms to track individually. Empty means track every term.
    pub terms: IndexSet<String>,
    /// Regex used to split each line into raw tokens.
    pub split_pattern: String,
    /// Regex whose matches are stripped from each lowercased token.
    pub normalize_pattern: String,
    /// Encoding label (WHATWG names, e.g. `utf-8`, `windows-1252`).
    pub charset: String,
}

impl Default for TokenizeOpts {
    fn default() -> Self {
        Self {
            terms: IndexSet::new(),
            split_pattern: TokenizeDefaults::SPLIT_PATTERN.to_string(),
            normalize_pattern: TokenizeDefaults::NORMALIZE_PATTERN.to_string(),
            charset: TokenizeDefaults::CHARSET.to_string(),
        }
    }
}

/// Update policy and output shape of the ranking aggregator.
#[derive(Clone, Debug)]
pub struct RankingOpts {
    /// Max wait for the next record; also the max age of the published ranking.
    pub poll_timeout: Duration,
    /// Buffered records that force a recomputation.
    pub max_buffer_size: usize,
    /// Top N paths kept in the snapshot. `None` keeps every path.
    pub ranking_size: Option<usize>,
    pub idf_mode: IdfMode,
}

impl Default for RankingOpts {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(RankingDefaults::POLL_TIMEOUT_MS),
            max_buffer_size: RankingDefaults::MAX_BUFFER_SIZE,
            ranking_size: None,
            idf_mode: IdfMode::default(),
        }
    }
}

/// Immutable view of the ranking, replaced wholesale on every recomputation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RankingSnapshot {
    /// Distinct paths holding at least one record.
    pub analyzed_path_count: u64,
    /// `None` until the first recomputation.
    pub last_updated: Option<SystemTime>,
    pub idf_mode: IdfMode,
    /// Descending by score, ties by path ascending.
    pub ranking: Vec<(PathBuf, f64)>,
}

/// Lib-only options for [`watch_dir`](crate::watch_dir).
#[derive(Clone, Debug)]
pub struct WatchOpts {
    /// Emit files already present under the root before watching for new ones.
    pub include_existing: bool,
    /// Tokenize worker count. When None, uses [`default_worker_count`](crate::default_worker_count).
    pub num_workers: Option<usize>,
    pub tokenize: TokenizeOpts,
    pub ranking: RankingOpts,
}

impl Default for WatchOpts {
    fn default() -> Self {
        Self {
            include_existing: true,
            num_workers: None,
            tokenize: TokenizeOpts::default(),
            ranking: RankingOpts::default(),
        }
    }
}

/// Full options (CLI). Use [`WatchOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    pub watch: WatchOpts,
    /// Seconds between two reports.
    pub report_period_secs: u64,
    /// Print snapshots as JSON lines instead of the human-readable report.
    pub json: bool,
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            watch: WatchOpts::default(),
            report_period_secs: crate::utils::config::REPORT_PERIOD_SECS,
            json: false,
            verbose: false,
        }
    }
}
