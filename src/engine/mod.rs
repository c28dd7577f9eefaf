//! Engine module: tokenizing and ranking algorithms, report formatting and CLI plumbing

pub mod arg_parser;
pub mod cli;
pub mod ranking;
pub mod report;
pub mod tokenizer;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use ranking::{TermIndex, distinct_paths, idf, score_paths, top_n_by_value};
pub use report::{format_json, format_report};
pub use tokenizer::{TermCounts, Tokenizer};
pub use tools::{is_eligible_file, is_hidden, path_relative_to};
