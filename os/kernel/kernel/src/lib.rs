//! # Kernel Bring-up
//!
//! The earliest stage of the kernel: everything between the bootloader's jump
//! into the image and the final halt.
//!
//! ## Flow
//!
//! ```text
//!  Limine ── resolves requests ──▶ BootRecords
//!                                     │
//!                     base revision + framebuffer valid?
//!                        │ no                    │ yes
//!                        ▼                       ▼
//!                   halt (silent)        Console over framebuffer
//!                                                │
//!                            Diagnostics: banner, framebuffer, bootloader,
//!                            firmware + clock, memory map, countdown
//!                                                │
//!                                                ▼
//!                                              halt
//! ```
//!
//! ## Modules
//!
//! * [`validate`]: presence and shape checks per record, with their [`Severity`](validate::Severity).
//! * [`printf`]: the closed `printf`-style formatter diagnostics are written with.
//! * [`report`]: leveled, color-tagged console lines.
//! * [`logger`]: routes the `log` facade to the same console.
//! * [`memmap`]: per-entry memory map lines and totals.
//! * [`physmap`]: which physical memory the direct map reaches.
//! * [`boot`]: the sequence itself and its stages.
//! * [`halt()`]: the terminal state.
//!
//! Everything except the entry point in `main.rs` runs on the host as well, which is
//! how the crate is tested.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod boot;
pub mod config;
mod halt;
pub mod logger;
pub mod memmap;
pub mod physmap;
pub mod printf;
pub mod report;
pub mod validate;

#[cfg(test)]
mod testing;

pub use halt::halt;
