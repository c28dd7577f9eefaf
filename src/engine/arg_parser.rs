use clap::Parser;
use std::path::PathBuf;

use crate::types::IdfMode;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Streaming TF-IDF ranker for a watched directory tree.
#[derive(Clone, Parser)]
#[command(name = "termrank")]
#[command(about = "Watch a directory and keep a live TF-IDF ranking of its files.")]
pub struct Cli {
    /// Directory to watch. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Terms to rank by, comma-separated or repeated: -t one,two -t three. Default: every term.
    #[arg(long, short = 't', value_delimiter = ',')]
    pub terms: Vec<String>,

    /// Number of top results to show. 0 shows every file. Default 5.
    #[arg(long = "top-n", short = 'n', value_parser = clap::value_parser!(usize))]
    pub top_n: Option<usize>,

    /// Report period in seconds. Default 5.
    #[arg(long, short = 'p', value_parser = clap::value_parser!(u64))]
    pub report_period: Option<u64>,

    /// IDF computation mode. Default normal.
    #[arg(long, short = 'm', value_enum, ignore_case = true)]
    pub idf_mode: Option<IdfMode>,

    /// Charset used to read files (e.g. utf-8, windows-1252). Default utf-8.
    #[arg(long, short = 'c')]
    pub charset: Option<String>,

    /// Regex splitting lines into tokens.
    #[arg(long)]
    pub split_pattern: Option<String>,

    /// Regex of characters stripped from each lowercased token.
    #[arg(long)]
    pub normalize_pattern: Option<String>,

    /// Max wait for new term frequencies, in milliseconds; also the max ranking age. Default 1000.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub poll_timeout_ms: Option<u64>,

    /// Buffered term frequencies that force a ranking update. Default 1000.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub max_buffer: Option<usize>,

    /// Tokenize worker threads. Default: available threads - 1.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Ignore files already present; only rank files created after start.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub skip_existing: Option<bool>,

    /// Print each report as a JSON line on stdout.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
