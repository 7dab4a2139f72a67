//! # Framebuffer Text Console
//!
//! The console is the kernel's only output channel during early bring-up. It
//! renders text straight into the linear framebuffer handed over by the
//! bootloader; there is no back buffer and no flushing, so every write is
//! visible on screen immediately.
//!
//! ## Layers
//!
//! ```text
//! Console::write(bytes)
//!     ↓
//! ansi::Parser      : control bytes and CSI sequences
//!     ↓
//! ansi::Style       : palette colors, bold
//!     ↓
//! font::glyph       : 8x8 bitmaps for printable ASCII
//!     ↓
//! FramebufferSurface : volatile 32-bit pixel writes
//! ```
//!
//! ## Behavior
//!
//! * **Append-only**: text is drawn at the cursor; there is no random access and no
//!   erase beyond backspace moving the cursor left.
//! * **Wrapping and scrolling**: the cursor wraps at the right edge and the surface
//!   scrolls by one text row when a line feed hits the bottom.
//! * **Escape sequences**: `CSI ... m` selects colors and bold; other sequences are
//!   swallowed. Parser state is kept across writes.
//! * **Pixel format**: 32 bits per pixel with configurable channel shifts.
//!
//! ## Usage
//!
//! ```rust
//! use kernel_console::{Console, FramebufferSurface, PixelFormat};
//!
//! let mut pixels = vec![0u32; 640 * 480];
//! let surface = FramebufferSurface::from_slice(&mut pixels, 640, 480, 640, PixelFormat::XRGB)
//!     .expect("buffer large enough");
//! let mut console = Console::new(surface);
//! console.write(b"\x1b[01;32mhello\x1b[00m\n");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod ansi;
mod console;
pub mod font;
mod framebuffer;

pub use console::{CELL_HEIGHT, CELL_WIDTH, Console, TAB_WIDTH, TextSink};
pub use framebuffer::{BYTES_PER_PIXEL, FramebufferSurface, PixelFormat, Rgb};
