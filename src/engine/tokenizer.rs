//! Term extraction: split lines into tokens, normalize, bucket against the allow-list and count.

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;

use crate::types::{TermFrequency, TokenizeOpts, UNGROUPED_TERM};

/// Compiled form of [`TokenizeOpts`]. Shared read-only by every tokenize worker.
#[derive(Debug)]
pub struct Tokenizer {
    split: Regex,
    normalize: Regex,
    /// Normalized allow-list. Empty means every term is tracked.
    tracked: HashSet<String>,
    encoding: &'static Encoding,
}

/// Occurrences per bucket for one file, plus the total over all buckets.
#[derive(Debug, Default)]
pub struct TermCounts {
    pub counts: HashMap<String, u64>,
    pub total: u64,
}

impl TermCounts {
    /// One record per bucket with `freq = count / total`.
    pub fn into_frequencies(self, path: &Path) -> Vec<TermFrequency> {
        if self.total == 0 {
            return Vec::new();
        }
        let total = self.total as f64;
        self.counts
            .into_iter()
            .map(|(term, count)| TermFrequency::new(path.to_path_buf(), term, count as f64 / total))
            .collect()
    }
}

impl Tokenizer {
    pub fn new(opts: &TokenizeOpts) -> Result<Self> {
        let split = Regex::new(&opts.split_pattern)
            .with_context(|| format!("invalid split pattern '{}'", opts.split_pattern))?;
        let normalize = Regex::new(&opts.normalize_pattern).with_context(|| {
            format!("invalid normalization pattern '{}'", opts.normalize_pattern)
        })?;
        let encoding = Encoding::for_label(opts.charset.trim().as_bytes())
            .with_context(|| format!("unknown charset '{}'", opts.charset))?;
        let mut tokenizer = Self {
            split,
            normalize,
            tracked: HashSet::new(),
            encoding,
        };
        let tracked: HashSet<String> = opts
            .terms
            .iter()
            .map(|t| tokenizer.normalize_token(t))
            .collect();
        tokenizer.tracked = tracked;
        Ok(tokenizer)
    }

    /// Lowercase, then strip everything matching the normalization pattern.
    /// An empty result is the ungrouped marker.
    pub fn normalize_token(&self, token: &str) -> String {
        let lower = token.to_lowercase();
        self.normalize.replace_all(&lower, "").into_owned()
    }

    /// Bucket for a raw token: itself (normalized) when tracked, otherwise [`UNGROUPED_TERM`].
    pub fn bucket(&self, token: &str) -> String {
        let normalized = self.normalize_token(token);
        if self.tracked.is_empty() || self.tracked.contains(&normalized) {
            normalized
        } else {
            UNGROUPED_TERM.to_string()
        }
    }

    /// Add every non-empty token of `line` to `counts`.
    pub fn count_line(&self, line: &str, counts: &mut TermCounts) {
        for token in self.split.split(line).filter(|t| !t.is_empty()) {
            *counts.counts.entry(self.bucket(token)).or_insert(0) += 1;
            counts.total += 1;
        }
    }

    /// Count every line yielded by `lines`. The first read error aborts the count.
    pub fn count_lines<I>(&self, lines: I) -> std::io::Result<TermCounts>
    where
        I: IntoIterator<Item = std::io::Result<String>>,
    {
        let mut counts = TermCounts::default();
        for line in lines {
            self.count_line(&line?, &mut counts);
        }
        Ok(counts)
    }

    /// Read `path` with the configured charset and count its terms.
    ///
    /// UTF-8 is streamed line by line; other charsets are decoded whole. Malformed input is
    /// reported as [`std::io::ErrorKind::InvalidData`].
    pub fn count_file(&self, path: &Path) -> std::io::Result<TermCounts> {
        if self.encoding == UTF_8 {
            let reader = std::io::BufReader::new(std::fs::File::open(path)?);
            return self.count_lines(reader.lines());
        }
        let bytes = std::fs::read(path)?;
        let text = self
            .encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("content is not valid {}", self.encoding.name()),
                )
            })?;
        self.count_lines(text.lines().map(|l| Ok(l.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tokenizer(terms: &[&str]) -> Tokenizer {
        let opts = TokenizeOpts {
            terms: terms.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        Tokenizer::new(&opts).unwrap()
    }

    fn freqs(counts: TermCounts) -> HashMap<String, f64> {
        counts
            .into_frequencies(&PathBuf::from("f"))
            .into_iter()
            .map(|tf| (tf.term, tf.freq))
            .collect()
    }

    #[test]
    fn test_normalize_strips_punctuation_and_lowercases() {
        let t = tokenizer(&[]);
        assert_eq!(t.normalize_token("One!"), "one");
        assert_eq!(t.normalize_token("¿Two?"), "two");
        assert_eq!(t.normalize_token("..."), UNGROUPED_TERM);
    }

    #[test]
    fn test_count_line_splits_on_default_pattern() {
        let t = tokenizer(&[]);
        let mut counts = TermCounts::default();
        t.count_line("one two,three-one_two  three three", &mut counts);
        assert_eq!(counts.total, 7);
        let f = freqs(counts);
        assert!((f["one"] - 2.0 / 7.0).abs() < 1e-12);
        assert!((f["two"] - 2.0 / 7.0).abs() < 1e-12);
        assert!((f["three"] - 3.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_allow_list_collapses_other_terms() {
        let t = tokenizer(&["One", "two"]);
        let mut counts = TermCounts::default();
        t.count_line("one two three one two three three", &mut counts);
        let f = freqs(counts);
        assert_eq!(f.len(), 3);
        assert!((f[UNGROUPED_TERM] - 3.0 / 7.0).abs() < 1e-12);
        assert!(!f.contains_key("three"));
    }

    #[test]
    fn test_custom_split_pattern() {
        let opts = TokenizeOpts {
            split_pattern: r"\|".to_string(),
            ..Default::default()
        };
        let t = Tokenizer::new(&opts).unwrap();
        let counts = t
            .count_lines(vec![Ok("one|two||three".to_string())])
            .unwrap();
        assert_eq!(counts.total, 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let bad_regex = TokenizeOpts {
            split_pattern: "[".to_string(),
            ..Default::default()
        };
        assert!(Tokenizer::new(&bad_regex).is_err());
        let bad_charset = TokenizeOpts {
            charset: "no-such-charset".to_string(),
            ..Default::default()
        };
        assert!(Tokenizer::new(&bad_charset).is_err());
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        let t = tokenizer(&[]);
        let counts = t.count_lines(Vec::new()).unwrap();
        assert!(counts.into_frequencies(&PathBuf::from("f")).is_empty());
    }
}
