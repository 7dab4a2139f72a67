//! # Boot Requests
//!
//! Request descriptors live in the kernel image. The bootloader scans the
//! image for them before handing over control and writes a pointer to the
//! matching response into each descriptor it understands.

use crate::response::BootResponse;
use crate::RecordKind;
use core::cell::UnsafeCell;
use core::ptr;

/// Magic shared by the first half of every request identifier.
pub const COMMON_MAGIC: [u64; 2] = [0xc7b1_dd30_df4c_8b88, 0x0a82_e883_a194_f07b];

/// Magic identifying the base revision tag.
const BASE_REVISION_MAGIC: [u64; 2] = [0xf956_2b2d_5c95_a6c8, 0x6a7b_3849_4453_6bdc];

/// A typed request the bootloader resolves in place before control transfers to the kernel.
///
/// The descriptor is written exactly once (by the bootloader, during handoff) and is
/// read-only afterwards. Keep this `#[repr(C)]`; the layout is defined by the boot protocol.
#[repr(C)]
pub struct BootRequest<R: BootResponse> {
    id: [u64; 4],
    revision: u64,
    response: UnsafeCell<*const R>,
}

// SAFETY: The response slot is only written during handoff, before any kernel code runs.
unsafe impl<R: BootResponse> Sync for BootRequest<R> {}

impl<R: BootResponse> BootRequest<R> {
    /// Creates an unresolved request asking for revision 0 of the response.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_revision(0)
    }

    /// Creates an unresolved request asking for the given response revision.
    #[must_use]
    pub const fn with_revision(revision: u64) -> Self {
        Self {
            id: [COMMON_MAGIC[0], COMMON_MAGIC[1], R::ID[0], R::ID[1]],
            revision,
            response: UnsafeCell::new(ptr::null()),
        }
    }

    /// The protocol identifier of this request.
    #[must_use]
    pub const fn id(&self) -> [u64; 4] {
        self.id
    }

    /// The response revision the kernel asked for.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// The record kind this request negotiates.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        R::KIND
    }

    /// Returns the resolved response, or `None` if the bootloader left the request unresolved.
    #[must_use]
    pub fn response(&self) -> Option<&'static R> {
        // The bootloader wrote the slot behind the compiler's back.
        let response = unsafe { ptr::read_volatile(self.response.get()) };

        // SAFETY: A non-null slot points into the bootloader's handoff area, which is never reclaimed.
        unsafe { response.as_ref() }
    }

    /// Resolves the request the way the bootloader does during handoff.
    ///
    /// # Safety
    /// Must be called at most once, before the first call to [`response`](Self::response),
    /// and never concurrently with a read of this request.
    pub unsafe fn resolve(&self, response: &'static R) {
        unsafe { ptr::write_volatile(self.response.get(), ptr::from_ref(response)) };
    }
}

impl<R: BootResponse> Default for BootRequest<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// The base revision tag.
///
/// The kernel states the protocol base revision it was written against; a bootloader that
/// supports it acknowledges by zeroing the revision word.
#[repr(C)]
pub struct BaseRevision {
    magic: [u64; 2],
    revision: UnsafeCell<u64>,
}

// SAFETY: See `BootRequest`.
unsafe impl Sync for BaseRevision {}

impl BaseRevision {
    #[must_use]
    pub const fn new(revision: u64) -> Self {
        Self {
            magic: BASE_REVISION_MAGIC,
            revision: UnsafeCell::new(revision),
        }
    }

    /// Whether the bootloader acknowledged the requested base revision.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        unsafe { ptr::read_volatile(self.revision.get()) == 0 }
    }

    /// Acknowledges the revision the way a supporting bootloader does.
    ///
    /// # Safety
    /// Same contract as [`BootRequest::resolve`].
    pub unsafe fn acknowledge(&self) {
        unsafe { ptr::write_volatile(self.revision.get(), 0) };
    }

    #[must_use]
    pub const fn magic(&self) -> [u64; 2] {
        self.magic
    }
}

/// Marks the start of the request section.
#[repr(C)]
pub struct RequestsStartMarker([u64; 4]);

impl RequestsStartMarker {
    #[must_use]
    pub const fn new() -> Self {
        Self([
            0xf6b8_f4b3_9de7_d1ae,
            0xfab9_1a69_40fc_b9cf,
            0x785c_6ed0_15d3_e316,
            0x181e_920a_7852_b9d9,
        ])
    }
}

impl Default for RequestsStartMarker {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks the end of the request section.
#[repr(C)]
pub struct RequestsEndMarker([u64; 2]);

impl RequestsEndMarker {
    #[must_use]
    pub const fn new() -> Self {
        Self([0xadc0_e053_1bb1_0d03, 0x9572_709f_3176_4c62])
    }
}

impl Default for RequestsEndMarker {
    fn default() -> Self {
        Self::new()
    }
}
