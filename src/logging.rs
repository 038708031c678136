//! Logging setup for the `dupescan` binary.
//!
//! Library code only talks to the `log` facade; this module wires up `env_logger`.
//! `RUST_LOG` takes precedence over the CLI verbosity flags when it is set.

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize logging to stderr. Calling it twice is harmless; the second call is ignored.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();
    if env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if verbose >= 2 {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_seconds(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });

    if builder.try_init().is_ok() {
        log::debug!("logging initialized at {:?}", log::max_level());
    }
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(determine_level(0, false), LevelFilter::Warn);
        assert_eq!(determine_level(1, false), LevelFilter::Info);
        assert_eq!(determine_level(2, false), LevelFilter::Debug);
        assert_eq!(determine_level(5, false), LevelFilter::Trace);
    }

    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(determine_level(3, true), LevelFilter::Error);
    }
}
