//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Optional per-directory config file (e.g. `.termrank.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Worker threads ----

/// Tokenize worker limits.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Threads kept free for the discovery and aggregator stages.
    pub reserved: usize,
    /// Minimum worker count.
    pub floor: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            reserved: Self::RESERVED_THREADS,
            floor: Self::FLOOR_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const RESERVED_THREADS: usize = 1;
    pub const FLOOR_THREADS: usize = 1;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// `max(all_threads - reserved, floor)`
    pub fn workers(&self) -> usize {
        self.all_threads
            .saturating_sub(self.reserved)
            .max(self.floor)
    }
}

// ---- Tokenizing ----

pub struct TokenizeDefaults;

impl TokenizeDefaults {
    /// Whitespace, commas, hyphens and underscores.
    pub const SPLIT_PATTERN: &'static str = r"[\s,\-_]";
    /// ASCII punctuation plus the inverted question mark.
    pub const NORMALIZE_PATTERN: &'static str = r"[[:punct:]¿]";
    pub const CHARSET: &'static str = "utf-8";
}

// ---- Ranking ----

pub struct RankingDefaults;

impl RankingDefaults {
    pub const POLL_TIMEOUT_MS: u64 = 1000;
    pub const MAX_BUFFER_SIZE: usize = 1000;
}

// ---- Reporting ----

/// Seconds between two reports (CLI).
pub const REPORT_PERIOD_SECS: u64 = 5;

/// Ranking size used by the CLI when neither flag nor config file sets one.
pub const CLI_RANKING_SIZE: usize = 5;

/// Decimal places used when printing scores.
pub const SCORE_DECIMALS: usize = 3;
