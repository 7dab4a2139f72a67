//! # EFI Firmware Table Access
//!
//! The bootloader hands over a pointer to the EFI system table. The kernel only
//! reads from it for display purposes: the firmware vendor, the firmware
//! revision, and the current wall-clock time through the runtime services.
//!
//! ## Overview
//!
//! ```text
//! EfiSystemTableResponse.address (physical)
//!     ↓  PhysicalMemory::window
//! SystemTable ── firmware_vendor ──▶ UCS-2 string
//!             ── firmware_revision
//!             ── runtime_services ──▶ GetTime()
//! ```
//!
//! The table layout itself comes from [`uefi_raw`]; this crate only adds a
//! narrow, read-only view on top of it and the [`Firmware`] trait the rest of
//! the kernel consumes, so diagnostics can be exercised without real firmware.
//!
//! ## Address Translation
//!
//! Pointers inside the table are physical. The caller describes where physical
//! memory is visible through [`PhysicalMemory`], usually the bootloader's
//! higher-half direct map, and nothing outside a reported window is read.
//!
//! Runtime service code only runs at the address the firmware linked it for,
//! and the bootloader does not identity map low memory. `GetTime` is therefore
//! only called when its code address maps to itself; otherwise the clock is
//! reported as unavailable.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod clock;
mod table;

pub use clock::{UNSPECIFIED_TIMEZONE, WallClock};
pub use table::{EfiSystemTable, MAX_VENDOR_LEN, wide_str};

/// A run of virtual addresses backing a physical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub virtual_address: u64,
    /// Bytes mapped contiguously from `virtual_address`.
    pub length: u64,
}

/// How the kernel reaches physical memory.
pub trait PhysicalMemory {
    /// Where `physical` is visible, or `None` if it is not mapped.
    fn window(&self, physical: u64) -> Option<Window>;
}

/// Read-only firmware information as consumed by boot diagnostics.
pub trait Firmware {
    /// Firmware vendor as UCS-2 code units, without the terminating NUL.
    fn vendor(&self) -> &[u16];

    /// Raw firmware revision; vendor-specific, conventionally `major << 16 | minor`.
    fn revision(&self) -> u32;

    /// Reads the current wall-clock time. `None` if the firmware reports an error.
    fn wall_clock(&self) -> Option<WallClock>;
}

impl<T: Firmware + ?Sized> Firmware for &T {
    fn vendor(&self) -> &[u16] {
        (**self).vendor()
    }

    fn revision(&self) -> u32 {
        (**self).revision()
    }

    fn wall_clock(&self) -> Option<WallClock> {
        (**self).wall_clock()
    }
}
