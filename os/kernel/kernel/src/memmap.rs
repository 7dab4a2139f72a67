//! # Memory Map Report
//!
//! Entries are reported exactly as the bootloader supplied them: no sorting,
//! merging or overlap checks. A memory manager will consume the same entries
//! later.

use crate::printf::Arg;
use crate::report::Reporter;
use kernel_console::TextSink;
use kernel_info::{MemoryMapEntry, MemoryMapResponse, MemoryRegionKind};

/// Totals over a memory map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryMapSummary {
    pub entries: usize,
    /// Bytes immediately available to the kernel.
    pub usable_bytes: u64,
    /// Bytes that become usable once the bootloader's structures are no longer needed.
    pub reclaimable_bytes: u64,
}

impl MemoryMapSummary {
    pub fn add(&mut self, entry: &MemoryMapEntry) {
        self.entries += 1;
        match entry.region_kind() {
            MemoryRegionKind::Usable => {
                self.usable_bytes = self.usable_bytes.saturating_add(entry.length);
            }
            MemoryRegionKind::BootloaderReclaimable => {
                self.reclaimable_bytes = self.reclaimable_bytes.saturating_add(entry.length);
            }
            _ => {}
        }
    }
}

impl<'a> FromIterator<&'a MemoryMapEntry> for MemoryMapSummary {
    fn from_iter<I: IntoIterator<Item = &'a MemoryMapEntry>>(iter: I) -> Self {
        let mut summary = Self::default();
        for entry in iter {
            summary.add(entry);
        }
        summary
    }
}

/// Reports every entry of the memory map record, followed by the totals.
pub fn report<S: TextSink>(reporter: &mut Reporter<S>, map: &MemoryMapResponse) -> MemoryMapSummary {
    reporter.info("memory map: %lu entries\n", &[Arg::U64(map.entry_count)]);
    let summary = report_entries(reporter, map.entries());
    reporter.info(
        "usable: %lu KiB, bootloader reclaimable: %lu KiB\n",
        &[
            Arg::U64(summary.usable_bytes / 1024),
            Arg::U64(summary.reclaimable_bytes / 1024),
        ],
    );
    summary
}

/// Emits one aligned line per entry, in order.
pub fn report_entries<'a, S: TextSink>(
    reporter: &mut Reporter<S>,
    entries: impl IntoIterator<Item = &'a MemoryMapEntry>,
) -> MemoryMapSummary {
    let mut summary = MemoryMapSummary::default();
    for (index, entry) in entries.into_iter().enumerate() {
        reporter.info(
            "[%3zu] base: 0x%-16lx length: 0x%-16lx type: %s\n",
            &[
                Arg::Usize(index),
                Arg::U64(entry.base),
                Arg::U64(entry.length),
                entry.region_kind().name().into(),
            ],
        );
        summary.add(entry);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Transcript;

    fn lines(entries: &[MemoryMapEntry]) -> Vec<String> {
        let mut reporter = Reporter::new(Transcript::default());
        report_entries(&mut reporter, entries);
        reporter.into_inner().lines()
    }

    #[test]
    fn one_line_per_entry_in_order() {
        let lines = lines(&[
            MemoryMapEntry::new(0x1000, 0x2000, MemoryRegionKind::Usable),
            MemoryMapEntry::new(0x3000, 0x1000, MemoryRegionKind::Reserved),
        ]);

        assert_eq!(
            lines,
            [
                "[INFO] [  0] base: 0x1000             length: 0x2000             type: Usable",
                "[INFO] [  1] base: 0x3000             length: 0x1000             type: Reserved",
            ]
        );
    }

    #[test]
    fn unknown_tags_are_reported_not_rejected() {
        let entry = MemoryMapEntry {
            base: 0,
            length: 0x1000,
            kind: 0x42,
        };
        let lines = lines(&[entry]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("type: Unknown"));
    }

    #[test]
    fn entries_are_not_canonicalized() {
        let overlapping = [
            MemoryMapEntry::new(0x5000, 0x1000, MemoryRegionKind::Usable),
            MemoryMapEntry::new(0x1000, 0x8000, MemoryRegionKind::Usable),
            MemoryMapEntry::new(0x1000, 0x8000, MemoryRegionKind::Usable),
        ];
        let lines = lines(&overlapping);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("base: 0x5000 "));
    }

    #[test]
    fn summary_counts_usable_and_reclaimable() {
        let summary: MemoryMapSummary = [
            MemoryMapEntry::new(0, 0x1000, MemoryRegionKind::Usable),
            MemoryMapEntry::new(0x1000, 0x3000, MemoryRegionKind::BootloaderReclaimable),
            MemoryMapEntry::new(0x4000, 0x1000, MemoryRegionKind::Reserved),
            MemoryMapEntry::new(0x5000, u64::MAX, MemoryRegionKind::Usable),
        ]
        .iter()
        .collect();

        assert_eq!(summary.entries, 4);
        assert_eq!(summary.usable_bytes, u64::MAX);
        assert_eq!(summary.reclaimable_bytes, 0x3000);
    }
}
