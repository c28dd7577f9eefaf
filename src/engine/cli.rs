//! CLI command handler: start the pipeline and report the ranking until Ctrl+C or a stage failure.

use anyhow::{Context, Result};
use crossbeam_channel::select;
use log::{debug, error, info};
use std::path::Path;
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::engine::report::{format_json, format_report};
use crate::pipeline::{CancelToken, PipelineHandles};
use crate::types::RankingSnapshot;
use crate::utils::config::CLI_RANKING_SIZE;
use crate::utils::termrank_toml::{apply_file_to_opts, load_termrank_toml, ranking_size_from};
use crate::utils::setup_logging;
use crate::{Opts, watch_dir_with_cancel};

/// Overwrite opts field from CLI when the flag was given.
macro_rules! apply_cli_opt {
    ($cli:expr, $field:ident => $target:expr) => {
        if let Some(v) = $cli.$field.clone() {
            $target = v;
        }
    };
}

/// Defaults, then `.termrank.toml` in the watched directory, then CLI flags.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    opts.watch.ranking.ranking_size = Some(CLI_RANKING_SIZE);
    if let Some(file) = load_termrank_toml(&cli.dir) {
        apply_file_to_opts(&file, &mut opts);
    }
    if !cli.terms.is_empty() {
        opts.watch.tokenize.terms = cli.terms.iter().cloned().collect();
    }
    if let Some(n) = cli.top_n {
        opts.watch.ranking.ranking_size = ranking_size_from(n);
    }
    if let Some(ms) = cli.poll_timeout_ms {
        opts.watch.ranking.poll_timeout = Duration::from_millis(ms);
    }
    if let Some(skip) = cli.skip_existing {
        opts.watch.include_existing = !skip;
    }
    if cli.workers.is_some() {
        opts.watch.num_workers = cli.workers;
    }
    apply_cli_opt!(cli, report_period => opts.report_period_secs);
    apply_cli_opt!(cli, idf_mode => opts.watch.ranking.idf_mode);
    apply_cli_opt!(cli, charset => opts.watch.tokenize.charset);
    apply_cli_opt!(cli, split_pattern => opts.watch.tokenize.split_pattern);
    apply_cli_opt!(cli, normalize_pattern => opts.watch.tokenize.normalize_pattern);
    apply_cli_opt!(cli, max_buffer => opts.watch.ranking.max_buffer_size);
    apply_cli_opt!(cli, json => opts.json);
    apply_cli_opt!(cli, verbose => opts.verbose);
    opts
}

fn report(snapshot: &RankingSnapshot, root: &Path, json: bool) {
    if json {
        match format_json(snapshot, root) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("{e:#}"),
        }
    } else {
        info!("{}", format_report(snapshot, root));
    }
}

/// Print the snapshot every `period` until `cancel` fires or a stage stops.
fn report_loop(handles: &PipelineHandles, cancel: &CancelToken, period: Duration, json: bool) {
    loop {
        report(&handles.snapshot(), handles.root(), json);
        select! {
            recv(cancel.receiver()) -> _ => {
                info!("Shutting down");
                return;
            }
            default(period) => {}
        }
        if handles.any_stage_finished() {
            error!("A pipeline stage stopped; shutting down");
            return;
        }
    }
}

/// Run the watcher until Ctrl+C. Returns the first stage failure, if any.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose.unwrap_or(false));
    let opts = setup_opts(cli);
    debug!("{:#?}", opts);

    let cancel = CancelToken::new();
    let handler_cancel = cancel.clone();
    ctrlc::set_handler(move || handler_cancel.cancel()).context("set Ctrl+C handler")?;

    let handles = watch_dir_with_cancel(&cli.dir, &opts.watch, cancel.clone())?;
    let period = Duration::from_secs(opts.report_period_secs.max(1));
    report_loop(&handles, &cancel, period, opts.json);
    handles.shutdown()
}
