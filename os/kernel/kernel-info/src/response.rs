//! # Boot Responses
//!
//! Responses are owned by the bootloader and stay mapped for the whole lifetime of the kernel.
//! All structures mirror the protocol ABI; pointers are kept raw and only dereferenced
//! through the accessor methods.

use crate::RecordKind;
use crate::memory::MemoryMapEntry;
use core::ffi::{CStr, c_char, c_void};

/// A response type together with the protocol identifier of the request resolving it.
pub trait BootResponse {
    /// The kind-specific half of the request identifier.
    const ID: [u64; 2];

    /// The record kind, used for diagnostics.
    const KIND: RecordKind;

    /// Revision of the response as written by the bootloader.
    fn revision(&self) -> u64;
}

/// Memory model tag of a linear RGB framebuffer.
pub const MEMORY_MODEL_RGB: u8 = 1;

#[repr(C)]
pub struct FramebufferResponse {
    pub revision: u64,
    pub framebuffer_count: u64,
    pub framebuffers: *const *const Framebuffer,
}

impl BootResponse for FramebufferResponse {
    const ID: [u64; 2] = [0x9d58_27dc_d881_dd75, 0xa314_8604_f6fa_b11b];
    const KIND: RecordKind = RecordKind::Framebuffer;

    fn revision(&self) -> u64 {
        self.revision
    }
}

impl FramebufferResponse {
    /// Iterates the framebuffers in bootloader order.
    pub fn framebuffers(&self) -> impl Iterator<Item = &Framebuffer> {
        pointer_list(self.framebuffers, self.framebuffer_count)
    }
}

/// A linear framebuffer.
#[repr(C)]
pub struct Framebuffer {
    /// Base address of the pixel memory, already mapped for the kernel.
    pub address: *mut u8,
    /// Visible width in **pixels**.
    pub width: u64,
    /// Visible height in **pixels**.
    pub height: u64,
    /// Bytes per scanline. May be larger than `width * bpp / 8` due to padding.
    pub pitch: u64,
    /// Bits per pixel.
    pub bpp: u16,
    /// Memory model tag, see [`MEMORY_MODEL_RGB`].
    pub memory_model: u8,
    pub red_mask_size: u8,
    pub red_mask_shift: u8,
    pub green_mask_size: u8,
    pub green_mask_shift: u8,
    pub blue_mask_size: u8,
    pub blue_mask_shift: u8,
    pub unused: [u8; 7],
    pub edid_size: u64,
    pub edid: *const u8,
}

impl Framebuffer {
    /// Whether the pixel layout is 32-bit packed RGB, the only layout the console draws.
    #[must_use]
    pub const fn is_rgb32(&self) -> bool {
        self.bpp == 32 && self.memory_model == MEMORY_MODEL_RGB
    }
}

#[repr(C)]
pub struct BootloaderInfoResponse {
    pub revision: u64,
    pub name: *const c_char,
    pub version: *const c_char,
}

impl BootResponse for BootloaderInfoResponse {
    const ID: [u64; 2] = [0xf550_38d8_e2a1_202f, 0x2794_26fc_f5f5_9740];
    const KIND: RecordKind = RecordKind::BootloaderInfo;

    fn revision(&self) -> u64 {
        self.revision
    }
}

impl BootloaderInfoResponse {
    /// The bootloader's name, as a NUL-terminated string.
    #[must_use]
    pub fn name(&self) -> Option<&CStr> {
        c_str(self.name)
    }

    /// The bootloader's version, as a NUL-terminated string.
    #[must_use]
    pub fn version(&self) -> Option<&CStr> {
        c_str(self.version)
    }
}

#[repr(C)]
pub struct EfiSystemTableResponse {
    pub revision: u64,
    /// Address of the EFI system table. Physical as of base revision 3.
    pub address: *const c_void,
}

impl BootResponse for EfiSystemTableResponse {
    const ID: [u64; 2] = [0x5ceb_a516_3eaa_f6d6, 0x0a69_8161_0cf6_5fcc];
    const KIND: RecordKind = RecordKind::SystemTable;

    fn revision(&self) -> u64 {
        self.revision
    }
}

#[repr(C)]
pub struct MemoryMapResponse {
    pub revision: u64,
    pub entry_count: u64,
    pub entries: *const *const MemoryMapEntry,
}

impl BootResponse for MemoryMapResponse {
    const ID: [u64; 2] = [0x67cf_3d9d_378a_806f, 0xe304_acdf_c50c_3c62];
    const KIND: RecordKind = RecordKind::MemoryMap;

    fn revision(&self) -> u64 {
        self.revision
    }
}

impl MemoryMapResponse {
    /// Iterates the entries exactly as supplied by the bootloader.
    pub fn entries(&self) -> impl Iterator<Item = &MemoryMapEntry> {
        pointer_list(self.entries, self.entry_count)
    }
}

/// Higher-half direct map.
#[repr(C)]
pub struct HhdmResponse {
    pub revision: u64,
    /// Virtual address at which physical address 0 is mapped.
    pub offset: u64,
}

impl BootResponse for HhdmResponse {
    const ID: [u64; 2] = [0x48dc_f1cb_8ad2_b852, 0x6398_4e95_9a98_244b];
    const KIND: RecordKind = RecordKind::Hhdm;

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// Views a bootloader-provided array of `count` element pointers. Null element pointers are skipped.
fn pointer_list<'a, T: 'a>(list: *const *const T, count: u64) -> impl Iterator<Item = &'a T> {
    let len = usize::try_from(count).unwrap_or_default();
    let pointers: &'a [*const T] = if list.is_null() || len == 0 {
        &[]
    } else {
        // SAFETY: The bootloader guarantees `count` valid element pointers behind `list`.
        unsafe { core::slice::from_raw_parts(list, len) }
    };

    // SAFETY: Non-null elements point into the handoff area.
    pointers.iter().filter_map(|&entry| unsafe { entry.as_ref() })
}

fn c_str<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        return None;
    }

    // SAFETY: Non-null strings in responses are NUL-terminated.
    Some(unsafe { CStr::from_ptr(ptr) })
}
