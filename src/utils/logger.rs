use chrono::Local;
use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Install the global logger: dependencies at warn, this crate at info (debug when verbose).
/// Safe to call more than once; later calls are ignored.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let ts = Local::now().format("%H:%M:%S").to_string();
            let level_str = match record.level() {
                Level::Error => "ERROR".red(),
                Level::Warn => "WARN".yellow(),
                Level::Info => "INFO".green(),
                Level::Debug | Level::Trace => record.level().as_str().dimmed(),
            };
            let line = match record.level() {
                Level::Error | Level::Warn | Level::Debug | Level::Trace => format!(
                    "[{} {} {} {}] {}",
                    name.cyan(),
                    ts,
                    level_str,
                    record.target().white(),
                    record.args()
                ),
                Level::Info => format!("[{} {} {}] {}", name.cyan(), ts, level_str, record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
