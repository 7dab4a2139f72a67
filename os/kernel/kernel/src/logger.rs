use crate::report::Reporter;
use kernel_console::TextSink;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

/// Forwards `log` records to the console through the [`Reporter`].
pub struct ConsoleLogger<S: 'static> {
    console: &'static Mutex<S>,
    max_level: LevelFilter,
}

impl<S: TextSink + Send> ConsoleLogger<S> {
    #[must_use]
    pub const fn new(console: &'static Mutex<S>, max_level: LevelFilter) -> Self {
        Self { console, max_level }
    }

    /// Call this once, after the console exists.
    ///
    /// # Errors
    /// Fails if a logger was installed before.
    pub fn install(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }
}

impl<S: TextSink + Send> Log for ConsoleLogger<S> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // A busy console means we interrupted a report, e.g. by panicking in it.
        let Some(mut console) = self.console.try_lock() else {
            return;
        };

        let mut reporter = Reporter::new(&mut *console);
        match record.level() {
            Level::Debug | Level::Trace => reporter.report_fmt(
                record.level(),
                format_args!("{}: {}", record.target(), record.args()),
            ),
            level => reporter.report_fmt(level, *record.args()),
        }
    }

    fn flush(&self) {}
}
