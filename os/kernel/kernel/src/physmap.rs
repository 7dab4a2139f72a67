//! # Direct Map
//!
//! The bootloader maps physical memory at a fixed offset in the higher half, but
//! only for some region kinds (see [`MemoryRegionKind::is_direct_mapped`]). A
//! physical address is readable if a mapped region of the memory map contains it.
//!
//! [`MemoryRegionKind::is_direct_mapped`]: kernel_info::MemoryRegionKind::is_direct_mapped

use kernel_efi::{PhysicalMemory, Window};
use kernel_info::MemoryMapResponse;

/// The higher-half direct map, bounded by the memory map.
#[derive(Clone, Copy)]
pub struct DirectMap<'a> {
    offset: u64,
    memory_map: &'a MemoryMapResponse,
}

impl<'a> DirectMap<'a> {
    #[must_use]
    pub const fn new(offset: u64, memory_map: &'a MemoryMapResponse) -> Self {
        Self { offset, memory_map }
    }

    /// Virtual address of physical address zero.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

impl PhysicalMemory for DirectMap<'_> {
    fn window(&self, physical: u64) -> Option<Window> {
        let length = self
            .memory_map
            .entries()
            .filter(|entry| entry.region_kind().is_direct_mapped())
            .map(|entry| entry.remaining_from(physical))
            .find(|&remaining| remaining > 0)?;

        Some(Window {
            virtual_address: physical.checked_add(self.offset)?,
            length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_info::{MemoryMapEntry, MemoryRegionKind};

    const OFFSET: u64 = 0xffff_8000_0000_0000;

    fn with_map<T>(entries: &[MemoryMapEntry], f: impl FnOnce(&DirectMap<'_>) -> T) -> T {
        let pointers: Vec<*const MemoryMapEntry> =
            entries.iter().map(core::ptr::from_ref).collect();
        let response = MemoryMapResponse {
            revision: 0,
            entry_count: u64::try_from(pointers.len()).unwrap(),
            entries: pointers.as_ptr(),
        };
        f(&DirectMap::new(OFFSET, &response))
    }

    #[test]
    fn mapped_regions_are_offset() {
        let entries = [
            MemoryMapEntry::new(0x1000, 0x2000, MemoryRegionKind::Usable),
            MemoryMapEntry::new(0x8000, 0x1000, MemoryRegionKind::BootloaderReclaimable),
        ];
        with_map(&entries, |map| {
            assert_eq!(
                map.window(0x1800),
                Some(Window {
                    virtual_address: OFFSET + 0x1800,
                    length: 0x1800,
                })
            );
            assert_eq!(map.window(0x8ff8).map(|w| w.length), Some(8));
        });
    }

    #[test]
    fn firmware_regions_are_not_reachable() {
        let entries = [
            MemoryMapEntry::new(0x1000, 0x2000, MemoryRegionKind::Usable),
            MemoryMapEntry::new(0x7f00_0000, 0x10_0000, MemoryRegionKind::Reserved),
            MemoryMapEntry::new(0x7f10_0000, 0x1000, MemoryRegionKind::AcpiNvs),
        ];
        with_map(&entries, |map| {
            assert_eq!(map.window(0x7f00_0018), None);
            assert_eq!(map.window(0x7f10_0000), None);
            assert_eq!(map.window(0x3000), None);
        });
    }

    #[test]
    fn empty_map_reaches_nothing() {
        with_map(&[], |map| assert_eq!(map.window(0x1000), None));
    }
}
