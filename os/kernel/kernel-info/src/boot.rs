//! # Boot Records

use crate::request::{BaseRevision, BootRequest};
use crate::response::{
    BootloaderInfoResponse, EfiSystemTableResponse, FramebufferResponse, HhdmResponse,
    MemoryMapResponse,
};
use core::fmt;

/// The kind of a boot record, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    BaseRevision,
    Framebuffer,
    BootloaderInfo,
    SystemTable,
    MemoryMap,
    Hhdm,
}

impl RecordKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BaseRevision => "base revision",
            Self::Framebuffer => "framebuffer",
            Self::BootloaderInfo => "bootloader info",
            Self::SystemTable => "EFI system table",
            Self::MemoryMap => "memory map",
            Self::Hhdm => "HHDM",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every record the kernel negotiates with the bootloader.
///
/// Built once at entry from the request statics and passed by reference from then on;
/// nothing downstream reads the statics directly.
#[derive(Clone, Copy)]
pub struct BootRecords<'a> {
    pub base_revision: &'a BaseRevision,
    pub framebuffer: &'a BootRequest<FramebufferResponse>,
    pub bootloader: &'a BootRequest<BootloaderInfoResponse>,
    pub system_table: &'a BootRequest<EfiSystemTableResponse>,
    pub memory_map: &'a BootRequest<MemoryMapResponse>,
    pub hhdm: &'a BootRequest<HhdmResponse>,
}
