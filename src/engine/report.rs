//! Snapshot formatting for the periodic report (text or JSON lines).

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::engine::tools::path_relative_to;
use crate::types::{IdfMode, RankingSnapshot};
use crate::utils::config::SCORE_DECIMALS;

fn display_path(path: &Path, root: &Path) -> String {
    path_relative_to(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

fn format_timestamp(snapshot: &RankingSnapshot) -> Option<String> {
    snapshot
        .last_updated
        .map(|t| DateTime::<Local>::from(t).to_rfc3339())
}

/// Header line plus one `path - score` line per ranked file. Paths are shown relative to `root`.
pub fn format_report(snapshot: &RankingSnapshot, root: &Path) -> String {
    let mut out = format!(
        "Analyzed files: {}, ranking updated at: {}, idf-mode: {}, ranking:",
        snapshot.analyzed_path_count,
        format_timestamp(snapshot).unwrap_or_else(|| "-".to_string()),
        snapshot.idf_mode,
    );
    for (path, score) in &snapshot.ranking {
        let _ = write!(
            out,
            "\n{} - {:.*}",
            display_path(path, root),
            SCORE_DECIMALS,
            score
        );
    }
    out
}

#[derive(Serialize)]
struct JsonReport {
    analyzed_path_count: u64,
    last_updated: Option<String>,
    idf_mode: IdfMode,
    ranking: Vec<JsonEntry>,
}

#[derive(Serialize)]
struct JsonEntry {
    path: String,
    score: f64,
}

/// One-line JSON rendering of the snapshot.
pub fn format_json(snapshot: &RankingSnapshot, root: &Path) -> Result<String> {
    let report = JsonReport {
        analyzed_path_count: snapshot.analyzed_path_count,
        last_updated: format_timestamp(snapshot),
        idf_mode: snapshot.idf_mode,
        ranking: snapshot
            .ranking
            .iter()
            .map(|(path, score)| JsonEntry {
                path: display_path(path, root),
                score: *score,
            })
            .collect(),
    };
    serde_json::to_string(&report).context("serialize ranking snapshot")
}
