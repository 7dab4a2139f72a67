//! # Physical Memory Map

use core::fmt;

/// Virtual base address of the kernel image.
///
/// The bootloader maps the image at its link address in the top 2 GiB, so the
/// kernel can be built with the `kernel` code model.
pub const KERNEL_BASE: u64 = 0xffff_ffff_8000_0000;

/// One region of the physical memory map, as handed over by the bootloader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryMapEntry {
    /// Physical base address.
    pub base: u64,
    /// Length of the region in **bytes**.
    pub length: u64,
    /// Raw type tag; see [`MemoryRegionKind`].
    pub kind: u64,
}

impl MemoryMapEntry {
    #[must_use]
    pub const fn new(base: u64, length: u64, kind: MemoryRegionKind) -> Self {
        Self {
            base,
            length,
            kind: kind.tag(),
        }
    }

    /// Classifies the raw type tag. Never fails.
    #[must_use]
    pub const fn region_kind(&self) -> MemoryRegionKind {
        MemoryRegionKind::from_tag(self.kind)
    }

    /// Bytes of the region at and above `address`; zero if `address` is outside it.
    #[must_use]
    pub const fn remaining_from(&self, address: u64) -> u64 {
        if address < self.base {
            return 0;
        }
        self.length.saturating_sub(address - self.base)
    }
}

/// Classification of a physical memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegionKind {
    Usable,
    Reserved,
    AcpiReclaimable,
    AcpiNvs,
    BadMemory,
    BootloaderReclaimable,
    /// The kernel image and loaded modules.
    KernelAndModules,
    Framebuffer,
    /// A tag outside the protocol's enumeration.
    Unknown(u64),
}

impl MemoryRegionKind {
    #[must_use]
    pub const fn from_tag(tag: u64) -> Self {
        match tag {
            0 => Self::Usable,
            1 => Self::Reserved,
            2 => Self::AcpiReclaimable,
            3 => Self::AcpiNvs,
            4 => Self::BadMemory,
            5 => Self::BootloaderReclaimable,
            6 => Self::KernelAndModules,
            7 => Self::Framebuffer,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn tag(self) -> u64 {
        match self {
            Self::Usable => 0,
            Self::Reserved => 1,
            Self::AcpiReclaimable => 2,
            Self::AcpiNvs => 3,
            Self::BadMemory => 4,
            Self::BootloaderReclaimable => 5,
            Self::KernelAndModules => 6,
            Self::Framebuffer => 7,
            Self::Unknown(tag) => tag,
        }
    }

    /// Whether the bootloader maps regions of this kind into the higher-half direct map.
    ///
    /// From base revision 3 on, reserved, ACPI and bad memory are left out.
    #[must_use]
    pub const fn is_direct_mapped(self) -> bool {
        matches!(
            self,
            Self::Usable | Self::BootloaderReclaimable | Self::KernelAndModules | Self::Framebuffer
        )
    }

    /// Display name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Usable => "Usable",
            Self::Reserved => "Reserved",
            Self::AcpiReclaimable => "ACPI Reclaimable",
            Self::AcpiNvs => "ACPI NVS",
            Self::BadMemory => "Bad Memory",
            Self::BootloaderReclaimable => "Bootloader Reclaimable",
            Self::KernelAndModules => "Kernel and Modules",
            Self::Framebuffer => "Framebuffer",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl From<u64> for MemoryRegionKind {
    fn from(tag: u64) -> Self {
        Self::from_tag(tag)
    }
}

impl fmt::Display for MemoryRegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_round_trip() {
        for tag in 0..=7 {
            let kind = MemoryRegionKind::from_tag(tag);
            assert!(!matches!(kind, MemoryRegionKind::Unknown(_)));
            assert_eq!(kind.tag(), tag);
        }
    }

    #[test]
    fn out_of_range_tags_are_unknown() {
        for tag in [8, 42, 0x1000, u64::MAX] {
            let kind = MemoryRegionKind::from(tag);
            assert_eq!(kind, MemoryRegionKind::Unknown(tag));
            assert_eq!(kind.name(), "Unknown");
        }
    }

    #[test]
    fn entry_classifies_its_tag() {
        let entry = MemoryMapEntry::new(0x1000, 0x2000, MemoryRegionKind::AcpiNvs);
        assert_eq!(entry.kind, 3);
        assert_eq!(entry.region_kind().name(), "ACPI NVS");
    }

    #[test]
    fn remaining_bytes_are_bounded_by_the_region() {
        let entry = MemoryMapEntry::new(0x1000, 0x2000, MemoryRegionKind::Usable);
        assert_eq!(entry.remaining_from(0x1000), 0x2000);
        assert_eq!(entry.remaining_from(0x2800), 0x800);
        assert_eq!(entry.remaining_from(0x3000), 0);
        assert_eq!(entry.remaining_from(0xfff), 0);
    }

    #[test]
    fn firmware_regions_are_not_direct_mapped() {
        for kind in [
            MemoryRegionKind::Reserved,
            MemoryRegionKind::AcpiReclaimable,
            MemoryRegionKind::AcpiNvs,
            MemoryRegionKind::BadMemory,
            MemoryRegionKind::Unknown(42),
        ] {
            assert!(!kind.is_direct_mapped(), "{kind}");
        }
        assert!(MemoryRegionKind::BootloaderReclaimable.is_direct_mapped());
    }
}
