//! # Boot Sequence
//!
//! ```text
//! Unstarted ─▶ RecordsResolved ─┬─▶ ConsoleReady ─▶ DiagnosticsEmitted ─▶ Halted
//!                               └─▶ HaltedFatal
//! ```
//!
//! Records are resolved by the bootloader before the kernel runs. The console
//! only depends on the base revision and the framebuffer record; if either is
//! unusable the kernel halts without output. Every other record only degrades
//! the diagnostics: its failure is reported as one error line and the steps
//! that need it are skipped.

use crate::config;
use crate::memmap;
use crate::physmap::DirectMap;
use crate::printf::Arg;
use crate::report::{Reporter, SUCCESS_STYLE};
use crate::validate::{self, RecordError, validate};
use core::hint::spin_loop;
use core::ptr::NonNull;
use kernel_console::{FramebufferSurface, PixelFormat, TextSink};
use kernel_efi::Firmware;
use kernel_info::BootRecords;
use log::Level;
use spin::Mutex;

/// Progress of the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStage {
    Unstarted,
    RecordsResolved,
    ConsoleReady,
    HaltedFatal,
    DiagnosticsEmitted,
    Halted,
}

impl BootStage {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::HaltedFatal | Self::Halted)
    }

    /// Whether `next` directly follows `self`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unstarted, Self::RecordsResolved)
                | (Self::RecordsResolved, Self::ConsoleReady | Self::HaltedFatal)
                | (Self::ConsoleReady, Self::DiagnosticsEmitted)
                | (Self::DiagnosticsEmitted, Self::Halted)
        )
    }

    /// The stage reached after trying to open the console.
    #[must_use]
    pub const fn after_console<T>(result: &Result<T, RecordError>) -> Self {
        match result {
            Ok(_) => Self::ConsoleReady,
            Err(_) => Self::HaltedFatal,
        }
    }
}

/// Validates what the console needs and builds a pixel surface over the first framebuffer.
///
/// # Errors
/// Every error is [`Severity::Fatal`](crate::validate::Severity::Fatal).
///
/// # Safety
/// The framebuffer record must describe mapped, writable memory that nothing else
/// accesses for the rest of execution.
pub unsafe fn open_console(
    records: &BootRecords<'_>,
) -> Result<FramebufferSurface<'static>, RecordError> {
    validate::base_revision(records.base_revision, config::BASE_REVISION)?;
    let framebuffer = validate::framebuffer(records)?;
    let base = NonNull::new(framebuffer.address).ok_or(RecordError::NoFramebuffer)?;

    let format = PixelFormat {
        red_shift: framebuffer.red_mask_shift,
        green_shift: framebuffer.green_mask_shift,
        blue_shift: framebuffer.blue_mask_shift,
    };

    Ok(unsafe {
        FramebufferSurface::from_raw_parts(
            base,
            usize::try_from(framebuffer.width).unwrap_or_default(),
            usize::try_from(framebuffer.height).unwrap_or_default(),
            usize::try_from(framebuffer.pitch).unwrap_or_default(),
            format,
        )
    })
}

/// The diagnostics emitted once the console is up.
pub struct Diagnostics<'a, S> {
    records: &'a BootRecords<'a>,
    console: &'a Mutex<S>,
    countdown_seconds: u8,
}

impl<'a, S: TextSink> Diagnostics<'a, S> {
    #[must_use]
    pub const fn new(records: &'a BootRecords<'a>, console: &'a Mutex<S>) -> Self {
        Self {
            records,
            console,
            countdown_seconds: config::HALT_COUNTDOWN_SECONDS,
        }
    }

    #[must_use]
    pub const fn with_countdown(mut self, seconds: u8) -> Self {
        self.countdown_seconds = seconds;
        self
    }

    /// Reports every record and counts down to the halt.
    ///
    /// `open_firmware` turns the physical system table address into a firmware view,
    /// reading only what the direct map reaches. It is only called for a valid table
    /// record, and returns `None` if the table is not mapped.
    pub fn run<F, O>(&self, open_firmware: O) -> BootStage
    where
        F: Firmware,
        O: FnOnce(u64, &DirectMap<'_>) -> Option<F>,
    {
        self.report(|r| r.styled(SUCCESS_STYLE, "Success! Welcome to the kernel...\n", &[]));
        self.framebuffers();
        self.bootloader();

        let firmware = self.firmware(open_firmware);
        self.memory_map();

        if let Some(firmware) = &firmware {
            self.countdown(firmware);
        }

        self.report(|r| r.warn("kernel implementation incomplete, halting\n", &[]));
        BootStage::DiagnosticsEmitted
    }

    fn report<T>(&self, f: impl FnOnce(&mut Reporter<&mut S>) -> T) -> T {
        let mut console = self.console.lock();
        f(&mut Reporter::new(&mut *console))
    }

    fn degraded(&self, error: RecordError) {
        self.report(|r| r.report_fmt(Level::Error, format_args!("{error}")));
    }

    fn framebuffers(&self) {
        // Validated before the console was opened.
        let Some(response) = self.records.framebuffer.response() else {
            return;
        };

        self.report(|r| {
            r.info(
                "framebuffer count: %lu\n",
                &[Arg::U64(response.framebuffer_count)],
            );
            for (index, fb) in response.framebuffers().enumerate() {
                r.info(
                    "framebuffer %zu: %lux%lu, pitch %lu, %hu bpp\n",
                    &[
                        Arg::Usize(index),
                        Arg::U64(fb.width),
                        Arg::U64(fb.height),
                        Arg::U64(fb.pitch),
                        Arg::U16(fb.bpp),
                    ],
                );
            }
        });
    }

    fn bootloader(&self) {
        match validate(self.records.bootloader) {
            Ok(info) => {
                let unknown = Arg::Str(b"(unknown)");
                let name = info.name().map_or(unknown, Arg::from);
                let version = info.version().map_or(unknown, Arg::from);
                self.report(|r| r.info("bootloader: %s %s\n", &[name, version]));
            }
            Err(error) => self.degraded(error),
        }
    }

    fn firmware<F, O>(&self, open_firmware: O) -> Option<F>
    where
        F: Firmware,
        O: FnOnce(u64, &DirectMap<'_>) -> Option<F>,
    {
        let address = validate::system_table(self.records)
            .inspect_err(|&error| self.degraded(error))
            .ok()?;

        // Without both there is no telling which physical memory is readable.
        let direct_map = validate(self.records.hhdm).and_then(|hhdm| {
            validate(self.records.memory_map).map(|map| DirectMap::new(hhdm.offset, map))
        });
        let direct_map = match direct_map {
            Ok(direct_map) => direct_map,
            Err(error) => {
                self.report(|r| {
                    r.report_fmt(Level::Warn, format_args!("{error}, firmware table skipped"));
                });
                return None;
            }
        };

        let Some(firmware) = open_firmware(address, &direct_map) else {
            self.degraded(RecordError::UnmappedSystemTable(address));
            return None;
        };

        self.firmware_details(&firmware);
        Some(firmware)
    }

    fn firmware_details(&self, firmware: &impl Firmware) {
        let revision = firmware.revision();
        self.report(|r| {
            r.info(
                "firmware: %ls, revision %u.%u\n",
                &[
                    Arg::WideStr(firmware.vendor()),
                    Arg::U32(revision >> 16),
                    Arg::U32(revision & 0xffff),
                ],
            );
        });

        let Some(now) = firmware.wall_clock() else {
            self.report(|r| r.warn("firmware clock unavailable\n", &[]));
            return;
        };

        let time = [Arg::U8(now.hour), Arg::U8(now.minute), Arg::U8(now.second)];
        match now.timezone {
            Some(offset) => {
                let sign = Arg::Char(if offset < 0 { b'-' } else { b'+' });
                let minutes = offset.unsigned_abs();
                self.report(|r| {
                    r.info(
                        "firmware time: %02hhu:%02hhu:%02hhu UTC%c%02hu:%02hu\n",
                        &[
                            time[0],
                            time[1],
                            time[2],
                            sign,
                            Arg::U16(minutes / 60),
                            Arg::U16(minutes % 60),
                        ],
                    );
                });
            }
            None => self.report(|r| {
                r.info(
                    "firmware time: %02hhu:%02hhu:%02hhu (timezone unspecified)\n",
                    &time,
                );
            }),
        }
    }

    fn memory_map(&self) {
        match validate(self.records.memory_map) {
            Ok(map) => {
                let summary = self.report(|r| memmap::report(r, map));
                log::debug!("memory map: {summary:?}");
            }
            Err(error) => self.degraded(error),
        }
    }

    /// Busy-polls the firmware clock, one line per elapsed second.
    fn countdown(&self, firmware: &impl Firmware) {
        if self.countdown_seconds == 0 {
            return;
        }

        let Some(mut last) = firmware.wall_clock() else {
            return;
        };

        for remaining in (1..=self.countdown_seconds).rev() {
            self.report(|r| r.info("halting in %hhu...\n", &[Arg::U8(remaining)]));

            loop {
                let Some(now) = firmware.wall_clock() else {
                    self.report(|r| r.warn("firmware clock failed, countdown aborted\n", &[]));
                    return;
                };
                if now.second != last.second {
                    last = now;
                    break;
                }
                spin_loop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_follow_the_boot_sequence() {
        let sequence = [
            BootStage::Unstarted,
            BootStage::RecordsResolved,
            BootStage::ConsoleReady,
            BootStage::DiagnosticsEmitted,
            BootStage::Halted,
        ];
        for pair in sequence.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{pair:?}");
        }
        assert!(BootStage::RecordsResolved.can_advance_to(BootStage::HaltedFatal));
    }

    #[test]
    fn only_fatal_halt_skips_the_console() {
        let all = [
            BootStage::Unstarted,
            BootStage::RecordsResolved,
            BootStage::ConsoleReady,
            BootStage::HaltedFatal,
            BootStage::DiagnosticsEmitted,
            BootStage::Halted,
        ];
        for from in all {
            if from.is_terminal() {
                assert!(all.iter().all(|&to| !from.can_advance_to(to)));
            }
        }
        assert!(!BootStage::RecordsResolved.can_advance_to(BootStage::DiagnosticsEmitted));
        assert!(!BootStage::ConsoleReady.can_advance_to(BootStage::HaltedFatal));
    }
}
