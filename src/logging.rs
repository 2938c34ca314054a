//! Logging infrastructure for cinerank.
//!
//! Structured logging goes through the `log` facade with the `env_logger`
//! backend, always to stderr so stdout carries only results. The level is
//! chosen by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: warn
//!
//! Warn is the default rather than info because per-movie lookup failures are
//! logged at warn and are the only thing a normal run should mention.
//!
//! # Example
//!
//! ```rust,no_run
//! use cinerank::logging::init_logging;
//!
//! init_logging(1, false, false);
//! log::debug!("cache hits and misses are visible now");
//! ```

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem from CLI flags.
///
/// Call once, before anything logs. Later calls are ignored.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
/// * `no_color` - Disable colored level names
pub fn init_logging(verbose: u8, quiet: bool, no_color: bool) {
    let use_env = env::var("RUST_LOG").is_ok();
    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    if no_color {
        builder.write_style(WriteStyle::Never);
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }

    log::debug!(
        "Logging initialized at level {}",
        if use_env { "from RUST_LOG" } else { current_level_name() }
    );
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Debug builds and verbose runs get timestamps and module paths; everything
/// else gets a compact `LEVEL message` line.
fn configure_format(builder: &mut Builder, verbose: u8) {
    let detailed = cfg!(debug_assertions) || verbose >= 1;

    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);

        if detailed {
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                buf.timestamp_seconds(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        }
    });
}

/// Get the current log level as a string.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
