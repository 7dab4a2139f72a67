use crate::{Firmware, PhysicalMemory, WallClock};
use core::mem::{MaybeUninit, size_of};
use core::ptr;
use uefi_raw::Status;
use uefi_raw::table::runtime::{RuntimeServices, TimeCapabilities};
use uefi_raw::table::system::SystemTable;
use uefi_raw::time::Time;

/// Upper bound on the vendor string length, in code units.
pub const MAX_VENDOR_LEN: usize = 128;

type GetTime = unsafe extern "efiapi" fn(*mut Time, *mut TimeCapabilities) -> Status;

/// Read-only view of the EFI system table handed over by the bootloader.
///
/// Only what is reachable through the supplied [`PhysicalMemory`] is read. The
/// clock is only offered if `GetTime` can be called at its firmware address.
pub struct EfiSystemTable {
    revision: u32,
    vendor: &'static [u16],
    get_time: Option<GetTime>,
}

impl EfiSystemTable {
    /// Builds a view from the table's physical address.
    ///
    /// Returns `None` if the table is not mapped by `memory`.
    ///
    /// # Safety
    /// `address` must be the physical address of a valid EFI system table, and every
    /// window `memory` reports must stay mapped and readable for the rest of execution.
    #[must_use]
    pub unsafe fn from_physical(address: u64, memory: &impl PhysicalMemory) -> Option<Self> {
        let table = map::<SystemTable>(memory, address)?;
        // SAFETY: Mapped, aligned and large enough; the caller vouches for the contents.
        let table = unsafe { &*table };

        Some(Self {
            revision: table.firmware_revision,
            vendor: unsafe { vendor(memory, physical(table.firmware_vendor)) },
            get_time: unsafe { get_time(memory, physical(table.runtime_services.cast_const())) },
        })
    }
}

impl Firmware for EfiSystemTable {
    fn vendor(&self) -> &[u16] {
        self.vendor
    }

    fn revision(&self) -> u32 {
        self.revision
    }

    fn wall_clock(&self) -> Option<WallClock> {
        let get_time = self.get_time?;

        let mut time = MaybeUninit::<Time>::uninit();
        let status = unsafe { get_time(time.as_mut_ptr(), ptr::null_mut()) };
        if !status.is_success() {
            log::debug!("GetTime failed: {status:?}");
            return None;
        }

        // SAFETY: GetTime filled the structure on success.
        let time = unsafe { time.assume_init() };
        Some(WallClock::new(
            time.hour,
            time.minute,
            time.second,
            time.time_zone,
        ))
    }
}

fn physical<T>(ptr: *const T) -> u64 {
    u64::try_from(ptr.expose_provenance()).unwrap_or_default()
}

fn virtual_ptr<T>(address: u64) -> *const T {
    ptr::with_exposed_provenance(usize::try_from(address).unwrap_or_default())
}

/// Where a `T` at `physical` can be read, if all of it is mapped.
fn map<T>(memory: &impl PhysicalMemory, physical: u64) -> Option<*const T> {
    if physical == 0 {
        return None;
    }

    let window = memory.window(physical)?;
    let size = u64::try_from(size_of::<T>()).ok()?;
    let ptr = virtual_ptr::<T>(window.virtual_address);
    (window.length >= size && !ptr.is_null() && ptr.is_aligned()).then_some(ptr)
}

/// The vendor string, cut off where the mapping ends.
unsafe fn vendor(memory: &impl PhysicalMemory, physical: u64) -> &'static [u16] {
    let Some(window) = memory.window(physical).filter(|_| physical != 0) else {
        return &[];
    };

    let ptr = virtual_ptr::<u16>(window.virtual_address);
    if !ptr.is_aligned() {
        return &[];
    }

    let units = usize::try_from(window.length / 2)
        .map_or(MAX_VENDOR_LEN, |units| units.min(MAX_VENDOR_LEN));
    unsafe { wide_str(ptr, units) }
}

/// `GetTime`, if its code is mapped at the address the firmware linked it for.
unsafe fn get_time(memory: &impl PhysicalMemory, runtime: u64) -> Option<GetTime> {
    let runtime = map::<RuntimeServices>(memory, runtime)?;
    // Read as a plain pointer; the firmware may leave the slot null.
    let code = unsafe { (&raw const (*runtime).get_time).cast::<*const ()>().read() };
    if code.is_null() {
        return None;
    }

    let address = physical(code);
    match memory.window(address) {
        Some(window) if window.virtual_address == address => {
            // SAFETY: A non-null entry of the runtime services table, callable in place.
            Some(unsafe { core::mem::transmute::<*const (), GetTime>(code) })
        }
        _ => {
            log::debug!("GetTime at {address:#x} is not mapped at its firmware address");
            None
        }
    }
}

/// Views a NUL-terminated UCS-2 string of at most `max` code units, without the NUL.
///
/// # Safety
/// `ptr` must be null or readable up to its NUL terminator or `max` code units,
/// whichever comes first, for `'a`.
#[must_use]
pub unsafe fn wide_str<'a>(ptr: *const u16, max: usize) -> &'a [u16] {
    if ptr.is_null() {
        return &[];
    }

    let mut len = 0;
    while len < max && unsafe { ptr.add(len).read_unaligned() } != 0 {
        len += 1;
    }

    unsafe { core::slice::from_raw_parts(ptr, len) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Window;

    /// Host memory seen through a fixed offset; zero means identity mapped.
    struct Shifted(u64);

    impl PhysicalMemory for Shifted {
        fn window(&self, physical: u64) -> Option<Window> {
            Some(Window {
                virtual_address: physical.wrapping_add(self.0),
                length: 0x1_0000,
            })
        }
    }

    struct Unmapped;

    impl PhysicalMemory for Unmapped {
        fn window(&self, _: u64) -> Option<Window> {
            None
        }
    }

    unsafe extern "efiapi" fn fixed_time(time: *mut Time, _: *mut TimeCapabilities) -> Status {
        unsafe {
            time.write_bytes(0, 1);
            (*time).hour = 23;
            (*time).minute = 59;
            (*time).second = 58;
            (*time).time_zone = -300;
        }
        Status::SUCCESS
    }

    fn ucs2(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(core::iter::once(0)).collect()
    }

    /// A system table in host memory whose pointers are "physical" under `offset`.
    struct Fixture {
        table: Box<SystemTable>,
        _runtime: Box<MaybeUninit<RuntimeServices>>,
        _vendor: Vec<u16>,
        offset: u64,
    }

    impl Fixture {
        fn new(offset: u64) -> Self {
            let vendor = ucs2("EDK II");
            let mut runtime = Box::new(MaybeUninit::<RuntimeServices>::zeroed());
            unsafe {
                (&raw mut (*runtime.as_mut_ptr()).get_time).write(fixed_time);
            }

            // SAFETY: Every field of the system table is an integer or a raw pointer.
            let mut table: Box<SystemTable> = Box::new(unsafe { core::mem::zeroed() });
            table.firmware_revision = 0x0002_0046;
            table.firmware_vendor = virtual_ptr(physical(vendor.as_ptr()).wrapping_sub(offset));
            table.runtime_services =
                virtual_ptr::<RuntimeServices>(physical(runtime.as_ptr()).wrapping_sub(offset))
                    .cast_mut();

            Self {
                table,
                _runtime: runtime,
                _vendor: vendor,
                offset,
            }
        }

        fn address(&self) -> u64 {
            physical(ptr::from_ref(&*self.table)).wrapping_sub(self.offset)
        }

        fn open(&self) -> Option<EfiSystemTable> {
            unsafe { EfiSystemTable::from_physical(self.address(), &Shifted(self.offset)) }
        }
    }

    #[test]
    fn identity_mapped_table_offers_the_clock() {
        let fixture = Fixture::new(0);
        let firmware = fixture.open().unwrap();

        assert_eq!(String::from_utf16_lossy(firmware.vendor()), "EDK II");
        assert_eq!(firmware.revision(), 0x0002_0046);
        assert_eq!(
            firmware.wall_clock(),
            Some(WallClock {
                hour: 23,
                minute: 59,
                second: 58,
                timezone: Some(-300),
            })
        );
    }

    #[test]
    fn direct_mapped_table_is_read_without_calling_the_firmware() {
        let fixture = Fixture::new(0x1000);
        let firmware = fixture.open().unwrap();

        assert_eq!(String::from_utf16_lossy(firmware.vendor()), "EDK II");
        assert_eq!(firmware.revision(), 0x0002_0046);
        assert_eq!(firmware.wall_clock(), None);
    }

    #[test]
    fn unmapped_table_is_not_read() {
        let fixture = Fixture::new(0);
        assert!(unsafe { EfiSystemTable::from_physical(fixture.address(), &Unmapped) }.is_none());
    }

    #[test]
    fn missing_runtime_services_leave_the_clock_unavailable() {
        let mut fixture = Fixture::new(0);
        fixture.table.runtime_services = ptr::null_mut();
        let firmware = fixture.open().unwrap();

        assert_eq!(firmware.wall_clock(), None);
        assert_eq!(String::from_utf16_lossy(firmware.vendor()), "EDK II");
    }

    #[test]
    fn vendor_is_cut_at_the_end_of_the_mapping() {
        struct Short;

        impl PhysicalMemory for Short {
            fn window(&self, physical: u64) -> Option<Window> {
                Some(Window {
                    virtual_address: physical,
                    length: 4,
                })
            }
        }

        let vendor = ucs2("EDK II");
        let view = unsafe { super::vendor(&Short, physical(vendor.as_ptr())) };
        assert_eq!(String::from_utf16_lossy(view), "ED");
    }

    #[test]
    fn wide_str_stops_at_nul() {
        let vendor = ucs2("EDK II");
        let view = unsafe { wide_str(vendor.as_ptr(), MAX_VENDOR_LEN) };
        assert_eq!(String::from_utf16_lossy(view), "EDK II");
    }

    #[test]
    fn wide_str_is_bounded() {
        let unterminated = [u16::from(b'x'); 8];
        let view = unsafe { wide_str(unterminated.as_ptr(), 4) };
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn null_pointers_yield_nothing() {
        assert!(unsafe { wide_str(ptr::null(), MAX_VENDOR_LEN) }.is_empty());
        assert!(unsafe { EfiSystemTable::from_physical(0, &Shifted(0)) }.is_none());
        assert!(unsafe { vendor(&Shifted(0), 0) }.is_empty());
    }
}
