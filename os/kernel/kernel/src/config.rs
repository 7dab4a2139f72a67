//! # Compile-time Configuration
//!
//! Nothing is read at runtime; the kernel has no command line at this stage.

use log::LevelFilter;

/// Base protocol revision requested from the bootloader.
///
/// From revision 3 on, the EFI system table record carries a physical address,
/// which the kernel translates through the higher-half direct map.
pub const BASE_REVISION: u64 = 3;

/// Revision requested for every typed boot record.
pub const REQUEST_REVISION: u64 = 0;

/// Length of the halt countdown, in firmware clock seconds.
pub const HALT_COUNTDOWN_SECONDS: u8 = 5;

/// Maximum level forwarded from the `log` facade to the console.
pub const LOG_LEVEL: LevelFilter = if cfg!(feature = "verbose") {
    LevelFilter::Trace
} else {
    LevelFilter::Info
};
