//! Host-side doubles shared by the unit and integration tests.

#![allow(dead_code)]

use kernel_console::TextSink;

/// Captures console output as bytes.
#[derive(Debug, Default)]
pub struct Transcript(pub Vec<u8>);

impl Transcript {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// The output with escape sequences removed.
    pub fn plain(&self) -> String {
        let mut out = String::new();
        let mut bytes = self.0.iter().copied();
        while let Some(b) = bytes.next() {
            if b == 0x1b {
                // Skip up to and including the final byte of the sequence.
                let _ = bytes.by_ref().find(u8::is_ascii_alphabetic);
            } else {
                out.push(char::from(b));
            }
        }
        out
    }

    /// Plain output split into lines, without empty trailing ones.
    pub fn lines(&self) -> Vec<String> {
        self.plain().lines().map(str::to_owned).collect()
    }

    /// Error-level lines only.
    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.starts_with("[ERROR]"))
            .collect()
    }
}

impl TextSink for Transcript {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }
}
