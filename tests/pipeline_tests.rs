//! Threaded stage tests: tokenize workers over real channels, and the full pipeline on temp dirs.

use crossbeam_channel::{Receiver, unbounded};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use termrank::engine::Tokenizer;
use termrank::pipeline::{CancelToken, spawn_tokenize_workers};
use termrank::{
    IdfMode, PipelineHandles, RankingOpts, RankingSnapshot, TermFrequency, TokenizeOpts,
    UNGROUPED_TERM, WatchOpts, watch_dir,
};

const SEVEN_TOKENS: &str = "one two, three\none-two three three\n";

/// Run `workers` tokenize workers over `paths` (queued once each) and collect every record.
fn run_workers(opts: &TokenizeOpts, paths: &[PathBuf], workers: usize) -> Vec<TermFrequency> {
    let (path_tx, path_rx) = unbounded();
    let (tf_tx, tf_rx) = unbounded();
    for p in paths {
        path_tx.send(p.clone()).unwrap();
    }
    drop(path_tx);

    let tokenizer = Arc::new(Tokenizer::new(opts).unwrap());
    let cancel = CancelToken::new();
    let handles = spawn_tokenize_workers(path_rx, &tf_tx, tokenizer, &cancel, workers);
    drop(tf_tx);

    let records = drain(&tf_rx);
    for h in handles {
        assert!(h.join().unwrap().is_ok());
    }
    records
}

fn drain(rx: &Receiver<TermFrequency>) -> Vec<TermFrequency> {
    let mut out = Vec::new();
    while let Ok(tf) = rx.recv_timeout(Duration::from_secs(10)) {
        out.push(tf);
    }
    out
}

fn by_term(records: &[TermFrequency]) -> HashMap<String, &TermFrequency> {
    records.iter().map(|tf| (tf.term.clone(), tf)).collect()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Poll the snapshot until `pred` holds or `timeout` elapses.
fn wait_for<F>(handles: &PipelineHandles, timeout: Duration, pred: F) -> Arc<RankingSnapshot>
where
    F: Fn(&RankingSnapshot) -> bool,
{
    let start = Instant::now();
    loop {
        let snap = handles.snapshot();
        if pred(&snap) || start.elapsed() > timeout {
            return snap;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

fn fast_opts() -> WatchOpts {
    WatchOpts {
        num_workers: Some(2),
        ranking: RankingOpts {
            poll_timeout: Duration::from_millis(50),
            ..Default::default()
        },
        ..Default::default()
    }
}

// --- tokenize workers ---

#[test]
fn test_worker_emits_frequencies() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "seven.txt", SEVEN_TOKENS);

    let records = run_workers(&TokenizeOpts::default(), &[file.clone()], 1);
    assert_eq!(records.len(), 3);
    let terms = by_term(&records);
    assert!((terms["one"].freq - 2.0 / 7.0).abs() < 1e-12);
    assert!((terms["two"].freq - 2.0 / 7.0).abs() < 1e-12);
    assert!((terms["three"].freq - 3.0 / 7.0).abs() < 1e-12);
    assert!(records.iter().all(|tf| tf.rankable && tf.path == file));
}

#[test]
fn test_two_workers_single_path_processed_once() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "seven.txt", SEVEN_TOKENS);

    let records = run_workers(&TokenizeOpts::default(), &[file], 2);
    assert_eq!(records.len(), 3);
    let terms = by_term(&records);
    assert_eq!(terms.len(), 3);
}

#[test]
fn test_two_workers_two_paths_one_set_each() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.txt", SEVEN_TOKENS);
    let b = write(dir.path(), "b.txt", "three three two two one one three");

    let records = run_workers(&TokenizeOpts::default(), &[a.clone(), b.clone()], 2);
    let mut per_path: HashMap<PathBuf, usize> = HashMap::new();
    for tf in &records {
        *per_path.entry(tf.path.clone()).or_insert(0) += 1;
    }
    assert_eq!(per_path[&a], 3);
    assert_eq!(per_path[&b], 3);
    let one_total: f64 = records
        .iter()
        .filter(|tf| tf.term == "one")
        .map(|tf| tf.freq)
        .sum();
    assert!((one_total - 4.0 / 7.0).abs() < 1e-12);
}

#[test]
fn test_worker_allow_list() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "seven.txt", SEVEN_TOKENS);
    let opts = TokenizeOpts {
        terms: ["one", "two"].iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    };

    let records = run_workers(&opts, &[file], 1);
    assert_eq!(records.len(), 3);
    let terms = by_term(&records);
    assert!(!terms.contains_key("three"));
    let ungrouped = terms[UNGROUPED_TERM];
    assert!(!ungrouped.rankable);
    assert!((ungrouped.freq - 3.0 / 7.0).abs() < 1e-12);
    assert!(terms["one"].rankable && terms["two"].rankable);
}

#[test]
fn test_worker_discards_undecodable_file_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.bin");
    std::fs::write(&bad, [b'o', b'k', b' ', 0xff, 0xfe, b'\n']).unwrap();
    let good = write(dir.path(), "good.txt", "fine words");
    let missing = dir.path().join("missing.txt");

    let records = run_workers(&TokenizeOpts::default(), &[bad.clone(), missing, good.clone()], 1);
    assert!(records.iter().all(|tf| tf.path == good));
    assert_eq!(records.len(), 2);
}

#[test]
fn test_worker_non_utf8_charset() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("latin1.txt");
    // "café café thé" in windows-1252
    std::fs::write(&file, b"caf\xe9 caf\xe9 th\xe9").unwrap();
    let opts = TokenizeOpts {
        charset: "windows-1252".to_string(),
        ..Default::default()
    };

    let records = run_workers(&opts, &[file], 1);
    let terms = by_term(&records);
    assert!((terms["café"].freq - 2.0 / 3.0).abs() < 1e-12);
    assert!((terms["thé"].freq - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_cancelled_worker_exits_ok() {
    let (_path_tx, path_rx) = unbounded::<PathBuf>();
    let (tf_tx, _tf_rx) = unbounded();
    let tokenizer = Arc::new(Tokenizer::new(&TokenizeOpts::default()).unwrap());
    let cancel = CancelToken::new();
    let handles = spawn_tokenize_workers(path_rx, &tf_tx, tokenizer, &cancel, 3);
    cancel.cancel();
    for h in handles {
        assert!(h.join().unwrap().is_ok());
    }
}

#[test]
fn test_cancelled_worker_leaves_queued_paths_alone() {
    let dir = tempfile::tempdir().unwrap();
    let (path_tx, path_rx) = unbounded();
    for i in 0..200 {
        path_tx
            .send(write(dir.path(), &format!("f{i}.txt"), "some words"))
            .unwrap();
    }
    let (tf_tx, tf_rx) = unbounded();
    let tokenizer = Arc::new(Tokenizer::new(&TokenizeOpts::default()).unwrap());
    let cancel = CancelToken::new();
    cancel.cancel();

    let handles = spawn_tokenize_workers(path_rx, &tf_tx, tokenizer, &cancel, 2);
    drop(tf_tx);
    for h in handles {
        assert!(h.join().unwrap().is_ok());
    }
    assert!(tf_rx.try_recv().is_err());
    assert_eq!(path_tx.len(), 200);
}

// --- full pipeline ---

#[test]
fn test_missing_root_fails_before_start() {
    let res = watch_dir(Path::new("/no/such/termrank/dir"), &WatchOpts::default());
    assert!(res.is_err());
}

#[test]
fn test_invalid_pattern_fails_before_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = WatchOpts::default();
    opts.tokenize.split_pattern = "(".to_string();
    assert!(watch_dir(dir.path(), &opts).is_err());
}

#[test]
fn test_end_to_end_two_disjoint_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.txt", "apple banana");
    write(dir.path(), "b.txt", "cherry date\ncherry date");

    let expected = 2.0_f64.log10();
    let handles = watch_dir(dir.path(), &fast_opts()).unwrap();
    let root = handles.root().to_path_buf();
    let snap = wait_for(&handles, Duration::from_secs(10), |s| {
        s.analyzed_path_count == 2
            && s.ranking.len() == 2
            && s.ranking.iter().all(|(_, v)| (v - expected).abs() < 1e-9)
    });
    handles.shutdown().unwrap();

    assert_eq!(snap.analyzed_path_count, 2);
    assert_eq!(snap.idf_mode, IdfMode::Normal);
    assert!(snap.last_updated.is_some());
    // Every term is in one of two files: idf = log10(2); each file's freqs sum to 1.
    let paths: Vec<&PathBuf> = snap.ranking.iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec![&root.join("a.txt"), &root.join("b.txt")]);
    for (_, score) in &snap.ranking {
        assert!((score - expected).abs() < 1e-9);
    }
}

#[test]
fn test_end_to_end_shared_term_scores_zero() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.txt", "rust rust");
    write(dir.path(), "b.txt", "rust");

    let mut opts = fast_opts();
    opts.ranking.ranking_size = Some(1);
    let handles = watch_dir(dir.path(), &opts).unwrap();
    let snap = wait_for(&handles, Duration::from_secs(10), |s| s.analyzed_path_count == 2);
    handles.shutdown().unwrap();

    assert_eq!(snap.analyzed_path_count, 2);
    assert_eq!(snap.ranking.len(), 1);
    assert_eq!(snap.ranking[0].1, 0.0);
    assert!(snap.ranking[0].0.ends_with("a.txt"));
}

#[test]
fn test_end_to_end_ungrouped_only_file_counted_not_ranked() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "tracked.txt", "needle hay");
    write(dir.path(), "untracked.txt", "hay hay");

    let mut opts = fast_opts();
    opts.tokenize.terms = ["needle"].iter().map(|s| s.to_string()).collect();
    let handles = watch_dir(dir.path(), &opts).unwrap();
    let snap = wait_for(&handles, Duration::from_secs(10), |s| {
        s.analyzed_path_count == 2 && s.ranking.len() == 1
    });
    handles.shutdown().unwrap();

    assert_eq!(snap.analyzed_path_count, 2);
    assert_eq!(snap.ranking.len(), 1);
    assert!(snap.ranking[0].0.ends_with("tracked.txt"));
    assert!((snap.ranking[0].1 - 0.5 * 2.0_f64.log10()).abs() < 1e-9);
}

#[test]
fn test_new_directory_then_new_file_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = fast_opts();
    opts.include_existing = false;
    let handles = watch_dir(dir.path(), &opts).unwrap();
    // Let discovery register the root before creating entries.
    std::thread::sleep(Duration::from_millis(500));

    let sub = dir.path().join("fresh");
    std::fs::create_dir(&sub).unwrap();
    write(&sub, "note.txt", "hello world");

    let snap = wait_for(&handles, Duration::from_secs(10), |s| s.analyzed_path_count == 1);
    handles.shutdown().unwrap();

    assert_eq!(snap.analyzed_path_count, 1);
    assert!(snap.ranking[0].0.ends_with("fresh/note.txt"));
}

#[test]
fn test_shutdown_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let handles = watch_dir(dir.path(), &fast_opts()).unwrap();
    assert!(!handles.any_stage_finished());
    assert!(handles.shutdown().is_ok());
}
