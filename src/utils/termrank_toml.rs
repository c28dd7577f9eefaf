//! Load `.termrank.toml` from the watched directory (CLI only). Lib callers pass WatchOpts directly.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::Opts;
use crate::types::IdfMode;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TermrankToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    terms: Option<Vec<String>>,
    top_n: Option<usize>,
    report_period: Option<u64>,
    idf_mode: Option<IdfMode>,
    charset: Option<String>,
    split_pattern: Option<String>,
    normalize_pattern: Option<String>,
    poll_timeout_ms: Option<u64>,
    max_buffer: Option<usize>,
    workers: Option<usize>,
    skip_existing: Option<bool>,
    json: Option<bool>,
}

/// Load the config file from `dir` if present. Returns None if missing or unreadable. CLI only.
pub(crate) fn load_termrank_toml(dir: &Path) -> Option<TermrankToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_termrank_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_termrank_toml(s: &str) -> Result<TermrankToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $field:ident => $target:expr) => {
        if let Some(v) = $sec.$field.clone() {
            $target = v;
        }
    };
}

/// `0` means unbounded.
pub(crate) fn ranking_size_from(top_n: usize) -> Option<usize> {
    (top_n > 0).then_some(top_n)
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &TermrankToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref terms) = s.terms {
        opts.watch.tokenize.terms = terms.iter().cloned().collect();
    }
    if let Some(n) = s.top_n {
        opts.watch.ranking.ranking_size = ranking_size_from(n);
    }
    if let Some(ms) = s.poll_timeout_ms {
        opts.watch.ranking.poll_timeout = Duration::from_millis(ms);
    }
    if let Some(skip) = s.skip_existing {
        opts.watch.include_existing = !skip;
    }
    if let Some(n) = s.workers {
        opts.watch.num_workers = Some(n);
    }
    apply_file_opt!(s, report_period => opts.report_period_secs);
    apply_file_opt!(s, idf_mode => opts.watch.ranking.idf_mode);
    apply_file_opt!(s, charset => opts.watch.tokenize.charset);
    apply_file_opt!(s, split_pattern => opts.watch.tokenize.split_pattern);
    apply_file_opt!(s, normalize_pattern => opts.watch.tokenize.normalize_pattern);
    apply_file_opt!(s, max_buffer => opts.watch.ranking.max_buffer_size);
    apply_file_opt!(s, json => opts.json);
}
