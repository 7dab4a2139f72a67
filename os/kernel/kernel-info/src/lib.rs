//! # Kernel Boot Interface
//!
//! This crate defines the bootloader-to-kernel handoff: the request descriptors
//! the kernel embeds in its image, the responses the bootloader resolves them
//! to, and the memory map types derived from them.
//!
//! ## Protocol
//!
//! The kernel is loaded by a Limine-compatible bootloader. Instead of receiving
//! a single boot information pointer, the kernel places typed requests in a
//! dedicated section of its image. Before jumping to the entry point, the
//! bootloader scans that section and fills in every request it understands:
//!
//! ```text
//! Kernel image (.requests)                 Bootloader handoff area
//! ┌──────────────────────────┐
//! │ RequestsStartMarker      │
//! │ BaseRevision { rev: 3 }  │ ── ack ──▶  rev := 0
//! │ BootRequest<Framebuffer> │ ─────────▶  FramebufferResponse
//! │ BootRequest<MemoryMap>   │ ─────────▶  MemoryMapResponse ─▶ [entries]
//! │ BootRequest<...>         │ ─────────▶  (null: unresolved)
//! │ RequestsEndMarker        │
//! └──────────────────────────┘
//! ```
//!
//! * **Identifiers**: every request starts with [`COMMON_MAGIC`](request::COMMON_MAGIC)
//!   followed by a kind-specific pair, see [`BootResponse::ID`](response::BootResponse::ID).
//! * **Revisions**: each request states the response revision it understands; the
//!   bootloader may answer with a newer, layout-compatible revision.
//! * **Single write**: responses are written once during handoff and are read-only
//!   afterwards. Unresolved requests keep a null response pointer.
//!
//! ## Ownership
//!
//! Responses live in bootloader-owned memory that is never reclaimed while the
//! kernel runs this early stage. Accessors therefore hand out `'static`
//! references and plain iterators; nothing here owns or frees handoff memory.
//!
//! ## Records
//!
//! [`BootRecords`] bundles references to all requests into one value that is
//! constructed once at entry and passed down explicitly.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod boot;
pub mod memory;
pub mod request;
pub mod response;

pub use boot::{BootRecords, RecordKind};
pub use memory::{MemoryMapEntry, MemoryRegionKind};
pub use request::{BaseRevision, BootRequest, RequestsEndMarker, RequestsStartMarker};
pub use response::{
    BootResponse, BootloaderInfoResponse, EfiSystemTableResponse, Framebuffer,
    FramebufferResponse, HhdmResponse, MemoryMapResponse,
};
