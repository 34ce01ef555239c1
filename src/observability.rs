//! Structured diagnostics for the codec's per-block decisions.
//!
//! `log_metric!` emits one key/value record through the `log` facade at trace
//! level. It is compiled out of release builds entirely, and in debug builds the
//! arguments are only formatted when a logger has trace output enabled, so the
//! encode and decode paths stay allocation-free.
//!
//! `enable_verbose_logging` installs an `env_logger` backend for hosts that do
//! not bring their own.

use log::LevelFilter;
use std::fs::OpenOptions;
use std::sync::Once;

/// Logs a structured key-value metric, only in debug builds.
///
/// # Example
/// ```
/// use pfor_codec::log_metric;
/// let bit_width = 7;
/// log_metric!("event" = "width_selected", "bit_width" = &bit_width);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            $crate::__log::trace!(
                concat!("PFOR_METRIC: {{", $(" \"", $key, "\": \"{}\","),+, " }}"),
                $($value),+
            );
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Routes the crate's log output to stderr, or appended to `log_file` if given.
///
/// Only the first call has any effect. If another logger is already installed
/// it is left in place.
pub fn enable_verbose_logging(log_file: Option<String>) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);
        builder.parse_env("PFOR_LOG");

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(filename) = log_file {
            match OpenOptions::new().append(true).create(true).open(&filename) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => eprintln!("pfor: could not open log file {}: {}", filename, e),
            }
        }

        let _ = builder.try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_verbose_logging_is_idempotent() {
        enable_verbose_logging(None);
        enable_verbose_logging(Some("/nonexistent/dir/pfor.log".to_string()));
        log::info!("logging initialised twice without panicking");
        log_metric!("event" = "test", "value" = &42);
    }
}
