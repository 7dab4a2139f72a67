/// Stops the CPU for good.
///
/// Loops on the architecture's wait-for-interrupt instruction; with interrupts
/// masked this parks the core at its lowest power state. No firmware reset is
/// attempted.
pub fn halt() -> ! {
    loop {
        wait_for_interrupt();
    }
}

#[cfg(all(target_os = "none", target_arch = "x86_64"))]
#[inline]
fn wait_for_interrupt() {
    unsafe { core::arch::asm!("hlt", options(nomem, nostack, preserves_flags)) };
}

#[cfg(all(
    target_os = "none",
    any(target_arch = "aarch64", target_arch = "riscv64")
))]
#[inline]
fn wait_for_interrupt() {
    unsafe { core::arch::asm!("wfi", options(nomem, nostack, preserves_flags)) };
}

// Hosted builds have no privileged wait instruction.
#[cfg(not(all(
    target_os = "none",
    any(
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "riscv64"
    )
)))]
#[inline]
fn wait_for_interrupt() {
    core::hint::spin_loop();
}
