use kernel_info::request::COMMON_MAGIC;
use kernel_info::{
    BaseRevision, BootRequest, BootResponse, BootloaderInfoResponse, Framebuffer,
    FramebufferResponse, MemoryMapEntry, MemoryMapResponse, MemoryRegionKind, RecordKind,
};
use std::ffi::CStr;

fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

fn leak_pointers<T: 'static>(items: Vec<T>) -> *const *const T {
    let items: &'static [T] = Vec::leak(items);
    let pointers: Vec<*const T> = items.iter().map(std::ptr::from_ref).collect();
    Vec::leak(pointers).as_ptr()
}

fn framebuffer(width: u64, height: u64) -> Framebuffer {
    Framebuffer {
        address: std::ptr::null_mut(),
        width,
        height,
        pitch: width * 4,
        bpp: 32,
        memory_model: 1,
        red_mask_size: 8,
        red_mask_shift: 16,
        green_mask_size: 8,
        green_mask_shift: 8,
        blue_mask_size: 8,
        blue_mask_shift: 0,
        unused: [0; 7],
        edid_size: 0,
        edid: std::ptr::null(),
    }
}

#[test]
fn request_carries_protocol_identifier() {
    let request = BootRequest::<MemoryMapResponse>::new();
    let id = request.id();
    assert_eq!(id[..2], COMMON_MAGIC);
    assert_eq!(id[2..], MemoryMapResponse::ID);
    assert_eq!(request.revision(), 0);
    assert_eq!(request.kind(), RecordKind::MemoryMap);
}

#[test]
fn unresolved_request_has_no_response() {
    let request = BootRequest::<FramebufferResponse>::with_revision(1);
    assert!(request.response().is_none());
    assert_eq!(request.revision(), 1);
}

#[test]
fn resolved_request_returns_the_bootloader_record() {
    let response = leak(MemoryMapResponse {
        revision: 0,
        entry_count: 2,
        entries: leak_pointers(vec![
            MemoryMapEntry::new(0x1000, 0x2000, MemoryRegionKind::Usable),
            MemoryMapEntry::new(0x3000, 0x1000, MemoryRegionKind::Reserved),
        ]),
    });

    let request = BootRequest::<MemoryMapResponse>::new();
    unsafe { request.resolve(response) };

    let resolved = request.response().expect("resolved");
    assert!(std::ptr::eq(resolved, response));

    let entries: Vec<_> = resolved.entries().copied().collect();
    assert_eq!(
        entries,
        [
            MemoryMapEntry::new(0x1000, 0x2000, MemoryRegionKind::Usable),
            MemoryMapEntry::new(0x3000, 0x1000, MemoryRegionKind::Reserved),
        ]
    );
}

#[test]
fn empty_pointer_list_yields_nothing() {
    let response = MemoryMapResponse {
        revision: 0,
        entry_count: 3,
        entries: std::ptr::null(),
    };
    assert_eq!(response.entries().count(), 0);
}

#[test]
fn framebuffers_are_listed_in_order() {
    let response = FramebufferResponse {
        revision: 0,
        framebuffer_count: 2,
        framebuffers: leak_pointers(vec![framebuffer(800, 600), framebuffer(1024, 768)]),
    };

    let widths: Vec<_> = response.framebuffers().map(|fb| fb.width).collect();
    assert_eq!(widths, [800, 1024]);
    assert!(response.framebuffers().all(Framebuffer::is_rgb32));
}

#[test]
fn bootloader_strings_are_read_up_to_nul() {
    let name: &'static CStr = c"Limine";
    let response = BootloaderInfoResponse {
        revision: 0,
        name: name.as_ptr(),
        version: std::ptr::null(),
    };

    assert_eq!(response.name().map(CStr::to_bytes), Some(&b"Limine"[..]));
    assert!(response.version().is_none());
}

#[test]
fn base_revision_is_supported_once_acknowledged() {
    let revision = BaseRevision::new(3);
    assert_eq!(revision.magic(), [0xf956_2b2d_5c95_a6c8, 0x6a7b_3849_4453_6bdc]);
    assert!(!revision.is_supported());
    unsafe { revision.acknowledge() };
    assert!(revision.is_supported());
}
