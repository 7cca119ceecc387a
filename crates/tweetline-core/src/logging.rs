//! Logging setup with indicatif integration

use indicatif::MultiProgress;

/// Logger that prints through a MultiProgress so log lines and progress
/// bars don't interleave mid-row.
struct BarLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl log::Log for BarLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            let line = format!("[{:<5}] {}", record.level(), record.args());
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Initialize logging.
///
/// With a `MultiProgress` (TTY runs) records route through [`BarLogger`];
/// otherwise plain env_logger with millisecond timestamps for log
/// aggregation. `RUST_LOG` overrides the default level either way.
pub fn init_logging(debug: bool, multi: Option<&MultiProgress>) {
    let default_level = if debug { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_level);

    match multi {
        Some(multi) => {
            let inner = env_logger::Builder::from_env(env).build();
            let max_level = inner.filter();
            log::set_boxed_logger(Box::new(BarLogger {
                inner,
                multi: multi.clone(),
            }))
            .expect("failed to init logger");
            log::set_max_level(max_level);
        }
        None => {
            env_logger::Builder::from_env(env)
                .format_timestamp_millis()
                .init();
        }
    }
}
