//! # Kernel Entry Point

#![cfg_attr(target_os = "none", no_std, no_main)]
#![allow(unsafe_code)]

#[cfg(target_os = "none")]
mod entry {
    use kernel::boot::{self, Diagnostics};
    use kernel::config::{self, REQUEST_REVISION};
    use kernel::logger::ConsoleLogger;
    use kernel::halt;
    use kernel_console::Console;
    use kernel_efi::EfiSystemTable;
    use kernel_info::{
        BaseRevision, BootRecords, BootRequest, RequestsEndMarker, RequestsStartMarker,
    };
    use spin::{Mutex, Once};

    #[used]
    #[unsafe(link_section = ".requests_start_marker")]
    static REQUESTS_START: RequestsStartMarker = RequestsStartMarker::new();

    #[used]
    #[unsafe(link_section = ".requests")]
    static BASE_REVISION: BaseRevision = BaseRevision::new(config::BASE_REVISION);

    #[used]
    #[unsafe(link_section = ".requests")]
    static FRAMEBUFFER: BootRequest<kernel_info::FramebufferResponse> =
        BootRequest::with_revision(REQUEST_REVISION);

    #[used]
    #[unsafe(link_section = ".requests")]
    static BOOTLOADER: BootRequest<kernel_info::BootloaderInfoResponse> =
        BootRequest::with_revision(REQUEST_REVISION);

    #[used]
    #[unsafe(link_section = ".requests")]
    static SYSTEM_TABLE: BootRequest<kernel_info::EfiSystemTableResponse> =
        BootRequest::with_revision(REQUEST_REVISION);

    #[used]
    #[unsafe(link_section = ".requests")]
    static MEMORY_MAP: BootRequest<kernel_info::MemoryMapResponse> =
        BootRequest::with_revision(REQUEST_REVISION);

    #[used]
    #[unsafe(link_section = ".requests")]
    static HHDM: BootRequest<kernel_info::HhdmResponse> =
        BootRequest::with_revision(REQUEST_REVISION);

    #[used]
    #[unsafe(link_section = ".requests_end_marker")]
    static REQUESTS_END: RequestsEndMarker = RequestsEndMarker::new();

    static CONSOLE: Once<Mutex<Console<'static>>> = Once::new();
    static LOGGER: Once<ConsoleLogger<Console<'static>>> = Once::new();

    /// The kernel entry point.
    ///
    /// Limine jumps here with the requests resolved, a valid stack and interrupts disabled.
    #[unsafe(no_mangle)]
    extern "C" fn kernel_main() -> ! {
        let records = BootRecords {
            base_revision: &BASE_REVISION,
            framebuffer: &FRAMEBUFFER,
            bootloader: &BOOTLOADER,
            system_table: &SYSTEM_TABLE,
            memory_map: &MEMORY_MAP,
            hhdm: &HHDM,
        };

        // SAFETY: The framebuffer is owned by the console from here on.
        let surface = match unsafe { boot::open_console(&records) } {
            Ok(surface) => surface,
            // No console, nothing to report to.
            Err(_) => halt(),
        };

        let console = CONSOLE.call_once(|| Mutex::new(Console::new(surface)));
        let logger = LOGGER.call_once(|| ConsoleLogger::new(console, config::LOG_LEVEL));
        if logger.install().is_err() {
            halt();
        }

        let stage = Diagnostics::new(&records, console).run(|address, direct_map| {
            // SAFETY: The address comes from a validated record; the direct map only
            // reports regions the bootloader keeps mapped.
            unsafe { EfiSystemTable::from_physical(address, direct_map) }
        });
        log::debug!("boot stage {stage:?}, halting");

        halt()
    }

    #[panic_handler]
    fn panic(info: &core::panic::PanicInfo) -> ! {
        log::error!("{info}");
        halt()
    }
}

/// Hosted builds have nothing to boot.
#[cfg(not(target_os = "none"))]
fn main() {}
