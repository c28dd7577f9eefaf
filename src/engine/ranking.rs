//! TF-IDF scoring and top-N selection.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::path::PathBuf;

use crate::types::{IdfMode, TermFrequency};

/// Latest record per path, grouped by term.
pub type TermIndex = HashMap<String, HashMap<PathBuf, TermFrequency>>;

/// Inverse document frequency of a term present in `doc_freq` of `total_paths` documents.
pub fn idf(mode: IdfMode, doc_freq: usize, total_paths: usize) -> f64 {
    let n = total_paths as f64;
    let df = doc_freq as f64;
    match mode {
        IdfMode::Normal => (n / df).log10(),
        IdfMode::Smooth => (n / (df + 1.0)).log10() + 1.0,
    }
}

/// Number of distinct paths holding at least one record.
pub fn distinct_paths(index: &TermIndex) -> usize {
    let mut paths: Vec<&PathBuf> = index.values().flat_map(|by_path| by_path.keys()).collect();
    paths.par_sort_unstable();
    paths.dedup();
    paths.len()
}

/// Sum of `freq * idf(term)` over every rankable record, per path.
///
/// Paths whose records are all non-rankable do not appear in the result.
pub fn score_paths(index: &TermIndex, mode: IdfMode, total_paths: usize) -> HashMap<PathBuf, f64> {
    index
        .par_iter()
        .fold(HashMap::new, |mut acc: HashMap<PathBuf, f64>, (_, by_path)| {
            let term_idf = idf(mode, by_path.len(), total_paths);
            for tf in by_path.values().filter(|tf| tf.rankable) {
                *acc.entry(tf.path.clone()).or_insert(0.0) += tf.freq * term_idf;
            }
            acc
        })
        .reduce(HashMap::new, |a, b| {
            let (small, mut large) = if a.len() < b.len() { (a, b) } else { (b, a) };
            for (path, score) in small {
                *large.entry(path).or_insert(0.0) += score;
            }
            large
        })
}

/// Heap entry ordered so that the heap's max is the *worst* ranked entry:
/// lowest score, then greatest key.
struct Ranked<K> {
    key: K,
    value: f64,
}

impl<K: Ord> Ord for Ranked<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .value
            .total_cmp(&self.value)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl<K: Ord> PartialOrd for Ranked<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> PartialEq for Ranked<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for Ranked<K> {}

/// Top `limit` entries by value descending, ties broken by key ascending.
/// `None` keeps every entry.
pub fn top_n_by_value<K, I>(entries: I, limit: Option<usize>) -> Vec<(K, f64)>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let limit = limit.unwrap_or(usize::MAX);
    if limit == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<Ranked<K>> = BinaryHeap::new();
    for (key, value) in entries {
        heap.push(Ranked { key, value });
        if heap.len() > limit {
            heap.pop();
        }
    }
    // into_sorted_vec is ascending by Ord, i.e. best first.
    heap.into_sorted_vec()
        .into_iter()
        .map(|r| (r.key, r.value))
        .collect()
}
