//! # Record Validation
//!
//! Every boot record goes through [`validate`] before anything reads it. What a
//! failure means depends on the record; see [`RecordError::severity`].

use kernel_info::{BaseRevision, BootRecords, BootRequest, BootResponse, Framebuffer, RecordKind};

/// Largest channel shift that still fits an 8-bit channel into a 32-bit pixel.
const MAX_CHANNEL_SHIFT: u8 = 24;

/// How a failed record affects the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Halts before any further progress.
    Fatal,
    /// Reported once; the dependent steps are skipped.
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("{0} record missing")]
    Missing(RecordKind),
    #[error("framebuffer record lists no framebuffers")]
    NoFramebuffer,
    #[error("unsupported framebuffer format: {bpp} bpp, memory model {memory_model}")]
    UnsupportedPixelFormat { bpp: u16, memory_model: u8 },
    #[error("bootloader does not support base revision {0}")]
    UnsupportedRevision(u64),
    #[error("EFI system table record missing (null table address)")]
    NullSystemTable,
    #[error("EFI system table at {0:#x} is outside the direct map")]
    UnmappedSystemTable(u64),
}

impl RecordError {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Missing(RecordKind::Framebuffer | RecordKind::BaseRevision)
            | Self::NoFramebuffer
            | Self::UnsupportedPixelFormat { .. }
            | Self::UnsupportedRevision(_) => Severity::Fatal,
            Self::Missing(_) | Self::NullSystemTable | Self::UnmappedSystemTable(_) => {
                Severity::Degraded
            }
        }
    }

    /// The record the failure is about.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Missing(kind) => *kind,
            Self::NoFramebuffer | Self::UnsupportedPixelFormat { .. } => RecordKind::Framebuffer,
            Self::UnsupportedRevision(_) => RecordKind::BaseRevision,
            Self::NullSystemTable | Self::UnmappedSystemTable(_) => RecordKind::SystemTable,
        }
    }
}

/// Returns the resolved response of `request`, unchanged.
///
/// # Errors
/// [`RecordError::Missing`] if the bootloader left the request unresolved.
pub fn validate<R: BootResponse>(request: &BootRequest<R>) -> Result<&'static R, RecordError> {
    let response = request.response().ok_or(RecordError::Missing(R::KIND))?;
    log::trace!(
        "{} record: requested revision {}, response revision {}",
        R::KIND,
        request.revision(),
        response.revision()
    );
    Ok(response)
}

/// Checks that the bootloader acknowledged the base revision the kernel was built for.
///
/// # Errors
/// [`RecordError::UnsupportedRevision`] naming `requested` otherwise.
pub fn base_revision(tag: &BaseRevision, requested: u64) -> Result<(), RecordError> {
    if tag.is_supported() {
        Ok(())
    } else {
        Err(RecordError::UnsupportedRevision(requested))
    }
}

/// Returns the first framebuffer if the console can draw on it.
///
/// # Errors
/// Any failure here is [`Severity::Fatal`].
pub fn framebuffer(records: &BootRecords<'_>) -> Result<&'static Framebuffer, RecordError> {
    let response = validate(records.framebuffer)?;
    let framebuffer = response
        .framebuffers()
        .next()
        .ok_or(RecordError::NoFramebuffer)?;

    if framebuffer.address.is_null() {
        return Err(RecordError::NoFramebuffer);
    }

    let shifts = [
        framebuffer.red_mask_shift,
        framebuffer.green_mask_shift,
        framebuffer.blue_mask_shift,
    ];
    if !framebuffer.is_rgb32() || shifts.iter().any(|&shift| shift > MAX_CHANNEL_SHIFT) {
        return Err(RecordError::UnsupportedPixelFormat {
            bpp: framebuffer.bpp,
            memory_model: framebuffer.memory_model,
        });
    }

    Ok(framebuffer)
}

/// Returns the physical address of the EFI system table.
///
/// # Errors
/// [`RecordError::Missing`] or, for a resolved record without a table,
/// [`RecordError::NullSystemTable`]. Both are [`Severity::Degraded`].
pub fn system_table(records: &BootRecords<'_>) -> Result<u64, RecordError> {
    let response = validate(records.system_table)?;
    match u64::try_from(response.address.addr()) {
        Ok(0) | Err(_) => Err(RecordError::NullSystemTable),
        Ok(address) => Ok(address),
    }
}
