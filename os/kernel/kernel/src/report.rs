//! # Diagnostic Reporter
//!
//! Leveled console messages. Every message starts with a colored level tag whose
//! style is reset right after the tag, followed by the formatted text:
//!
//! ```text
//! ESC[00m ESC[01m ESC[34m "[INFO] " ESC[00m  message...
//! └──────── tag style ──┘            └ reset
//! ```
//!
//! Templates carry their own line breaks, matching the `printf` conventions of
//! [`crate::printf`]; records from the `log` facade get one appended.

use crate::printf::{self, Arg};
use core::fmt;
use kernel_console::TextSink;
use log::Level;

/// Style selecting bold bright green, used for the success banner.
pub const SUCCESS_STYLE: &[u8] = b"\x1b[01m\x1b[32m";

const RESET: &[u8] = b"\x1b[00m";

const fn tag(level: Level) -> &'static [u8] {
    match level {
        Level::Error => b"\x1b[00m\x1b[01m\x1b[31m[ERROR] \x1b[00m",
        Level::Warn => b"\x1b[00m\x1b[01m\x1b[33m[WARN] \x1b[00m",
        Level::Info => b"\x1b[00m\x1b[01m\x1b[34m[INFO] \x1b[00m",
        Level::Debug => b"\x1b[00m\x1b[01m\x1b[36m[DEBUG] \x1b[00m",
        Level::Trace => b"\x1b[00m\x1b[01m\x1b[35m[TRACE] \x1b[00m",
    }
}

/// Writes leveled diagnostics to a text sink.
pub struct Reporter<S> {
    sink: S,
}

impl<S: TextSink> Reporter<S> {
    #[must_use]
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn info(&mut self, template: &str, args: &[Arg<'_>]) {
        self.report(Level::Info, template, args);
    }

    pub fn warn(&mut self, template: &str, args: &[Arg<'_>]) {
        self.report(Level::Warn, template, args);
    }

    pub fn error(&mut self, template: &str, args: &[Arg<'_>]) {
        self.report(Level::Error, template, args);
    }

    pub fn report(&mut self, level: Level, template: &str, args: &[Arg<'_>]) {
        self.sink.write_bytes(tag(level));
        printf::format(&mut self.sink, template.as_bytes(), args);
    }

    /// Reports preformatted arguments as one line.
    pub fn report_fmt(&mut self, level: Level, args: fmt::Arguments<'_>) {
        self.sink.write_bytes(tag(level));
        // SinkWriter never fails.
        let _ = fmt::write(&mut SinkWriter(&mut self.sink), args);
        self.sink.write_bytes(b"\n");
    }

    /// Writes untagged text in `style`, resetting the style afterwards.
    pub fn styled(&mut self, style: &[u8], template: &str, args: &[Arg<'_>]) {
        self.sink.write_bytes(style);
        printf::format(&mut self.sink, template.as_bytes(), args);
        self.sink.write_bytes(RESET);
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.sink
    }
}

struct SinkWriter<'a, S>(&'a mut S);

impl<S: TextSink> fmt::Write for SinkWriter<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_bytes(s.as_bytes());
        Ok(())
    }
}
