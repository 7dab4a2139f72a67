//! # Framebuffer pixel surface

use core::marker::PhantomData;
use core::ptr::NonNull;

/// Bytes per pixel. Only 32-bit packed pixels are drawn.
pub const BYTES_PER_PIXEL: usize = 4;

/// A color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Splits a `0x00RRGGBB` value into channels.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        let [_, r, g, b] = rgb.to_be_bytes();
        Self { r, g, b }
    }
}

/// Channel placement within a 32-bit pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub red_shift: u8,
    pub green_shift: u8,
    pub blue_shift: u8,
}

impl PixelFormat {
    /// `0x00RRGGBB`, the common layout of firmware framebuffers.
    pub const XRGB: Self = Self {
        red_shift: 16,
        green_shift: 8,
        blue_shift: 0,
    };

    /// Packs a color into a native pixel value.
    #[must_use]
    pub fn pack(self, color: Rgb) -> u32 {
        (u32::from(color.r) << self.red_shift)
            | (u32::from(color.g) << self.green_shift)
            | (u32::from(color.b) << self.blue_shift)
    }
}

/// Pixel memory of a linear framebuffer.
///
/// The surface does not own the memory; it borrows it for `'a`. All accesses are
/// volatile since the memory is scanned out by the display hardware.
pub struct FramebufferSurface<'a> {
    base: NonNull<u32>,
    width: usize,
    height: usize,
    /// Pixels per scanline.
    stride: usize,
    format: PixelFormat,
    _memory: PhantomData<&'a mut [u32]>,
}

// SAFETY: The surface has exclusive access to its pixel memory for `'a`.
unsafe impl Send for FramebufferSurface<'_> {}

impl<'a> FramebufferSurface<'a> {
    /// Builds a surface over raw framebuffer memory.
    ///
    /// `pitch` is in **bytes**. A width exceeding the scanline is clamped to it.
    ///
    /// # Safety
    /// `base` must be 4-byte aligned and point to at least `pitch * height` bytes of
    /// writable memory that nothing else accesses for `'a`.
    #[must_use]
    pub unsafe fn from_raw_parts(
        base: NonNull<u8>,
        width: usize,
        height: usize,
        pitch: usize,
        format: PixelFormat,
    ) -> Self {
        let stride = pitch / BYTES_PER_PIXEL;
        Self {
            base: base.cast(),
            width: width.min(stride),
            height,
            stride,
            format,
            _memory: PhantomData,
        }
    }

    /// Builds a surface over a pixel slice, e.g. a back buffer.
    ///
    /// Returns `None` if the slice is too small for `stride * height` pixels or if
    /// `width` exceeds `stride`.
    #[must_use]
    pub fn from_slice(
        pixels: &'a mut [u32],
        width: usize,
        height: usize,
        stride: usize,
        format: PixelFormat,
    ) -> Option<Self> {
        if width > stride || pixels.len() < stride.checked_mul(height)? {
            return None;
        }

        Some(Self {
            base: NonNull::from(pixels).cast(),
            width,
            height,
            stride,
            format,
            _memory: PhantomData,
        })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Packs a color for this surface.
    #[must_use]
    pub fn pack(&self, color: Rgb) -> u32 {
        self.format.pack(color)
    }

    /// Writes one packed pixel. Out-of-bounds coordinates are ignored.
    pub fn put_pixel(&mut self, x: usize, y: usize, pixel: u32) {
        if x >= self.width || y >= self.height {
            return;
        }

        // SAFETY: In bounds per the check above and the constructor contracts.
        unsafe { self.base.as_ptr().add(y * self.stride + x).write_volatile(pixel) };
    }

    /// Reads one packed pixel back.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }

        // SAFETY: See `put_pixel`.
        Some(unsafe { self.base.as_ptr().add(y * self.stride + x).read_volatile() })
    }

    /// Fills a rectangle, clipped to the visible area.
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, pixel: u32) {
        let end_x = x.saturating_add(width).min(self.width);
        let end_y = y.saturating_add(height).min(self.height);

        for row in y..end_y {
            for column in x..end_x {
                // SAFETY: Clipped to the visible area.
                unsafe {
                    self.base
                        .as_ptr()
                        .add(row * self.stride + column)
                        .write_volatile(pixel);
                }
            }
        }
    }

    pub fn clear(&mut self, pixel: u32) {
        self.fill_rect(0, 0, self.width, self.height, pixel);
    }

    /// Moves the content up by `lines` scanlines and fills the freed lines at the bottom.
    pub fn scroll_up(&mut self, lines: usize, fill: u32) {
        let lines = lines.min(self.height);
        let kept = self.height - lines;

        for row in 0..kept {
            for column in 0..self.width {
                // SAFETY: Both rows are within the visible area; rows are copied top-down
                // so the source row is never overwritten before it is read.
                unsafe {
                    let src = self.base.as_ptr().add((row + lines) * self.stride + column);
                    let dst = self.base.as_ptr().add(row * self.stride + column);
                    dst.write_volatile(src.read_volatile());
                }
            }
        }

        self.fill_rect(0, kept, self.width, lines, fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_honors_channel_shifts() {
        let color = Rgb::from_hex(0x0011_2233);
        assert_eq!(PixelFormat::XRGB.pack(color), 0x0011_2233);

        let bgr = PixelFormat {
            red_shift: 0,
            green_shift: 8,
            blue_shift: 16,
        };
        assert_eq!(bgr.pack(color), 0x0033_2211);
    }

    #[test]
    fn from_slice_rejects_short_buffers() {
        let mut pixels = vec![0u32; 15];
        assert!(FramebufferSurface::from_slice(&mut pixels, 4, 4, 4, PixelFormat::XRGB).is_none());
        assert!(FramebufferSurface::from_slice(&mut pixels, 5, 2, 4, PixelFormat::XRGB).is_none());
    }

    #[test]
    fn writes_outside_the_visible_area_are_ignored() {
        let mut pixels = vec![0u32; 4 * 2];
        let mut surface =
            FramebufferSurface::from_slice(&mut pixels, 3, 2, 4, PixelFormat::XRGB).unwrap();
        surface.put_pixel(3, 0, 0xff);
        surface.put_pixel(0, 2, 0xff);
        surface.put_pixel(2, 1, 0xaa);
        drop(surface);

        assert_eq!(pixels, [0, 0, 0, 0, 0, 0, 0xaa, 0]);
    }

    #[test]
    fn scroll_moves_rows_up_and_fills_the_bottom() {
        let mut pixels = vec![1, 1, 2, 2, 3, 3];
        let mut surface =
            FramebufferSurface::from_slice(&mut pixels, 2, 3, 2, PixelFormat::XRGB).unwrap();
        surface.scroll_up(1, 9);
        drop(surface);

        assert_eq!(pixels, [2, 2, 3, 3, 9, 9]);
    }

    #[test]
    fn raw_parts_clamp_width_to_pitch() {
        let mut pixels = vec![0u32; 8];
        let base = NonNull::new(pixels.as_mut_ptr().cast::<u8>()).unwrap();
        let surface =
            unsafe { FramebufferSurface::from_raw_parts(base, 100, 2, 16, PixelFormat::XRGB) };
        assert_eq!(surface.width(), 4);
        assert_eq!(surface.height(), 2);
    }
}
