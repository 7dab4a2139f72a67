//! # Text console

use crate::ansi::{Action, Parser, Style};
use crate::font::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph};
use crate::framebuffer::FramebufferSurface;
use core::fmt;

/// Width of a character cell in pixels.
pub const CELL_WIDTH: usize = GLYPH_WIDTH;

/// Height of a character cell in pixels, including line spacing.
pub const CELL_HEIGHT: usize = GLYPH_HEIGHT + 2;

/// Tab stops every this many columns.
pub const TAB_WIDTH: usize = 8;

/// Anything that accepts console bytes, escape sequences included.
pub trait TextSink {
    fn write_bytes(&mut self, bytes: &[u8]);
}

impl<T: TextSink + ?Sized> TextSink for &mut T {
    fn write_bytes(&mut self, bytes: &[u8]) {
        (**self).write_bytes(bytes);
    }
}

/// An append-only text console drawn directly into a framebuffer.
pub struct Console<'a> {
    surface: FramebufferSurface<'a>,
    parser: Parser,
    style: Style,
    column: usize,
    row: usize,
    columns: usize,
    rows: usize,
}

impl<'a> Console<'a> {
    /// Takes over the surface and clears it to the default background.
    #[must_use]
    pub fn new(mut surface: FramebufferSurface<'a>) -> Self {
        let style = Style::new();
        surface.clear(surface.pack(style.background()));

        Self {
            columns: surface.width() / CELL_WIDTH,
            rows: surface.height() / CELL_HEIGHT,
            surface,
            parser: Parser::new(),
            style,
            column: 0,
            row: 0,
        }
    }

    /// Appends bytes at the cursor. NUL bytes are ignored.
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            match self.parser.advance(byte) {
                Action::None => {}
                Action::Print(byte) => self.print(byte),
                Action::LineFeed => self.line_feed(),
                Action::CarriageReturn => self.column = 0,
                Action::Tab => {
                    let next = (self.column / TAB_WIDTH + 1) * TAB_WIDTH;
                    self.column = next.min(self.columns.saturating_sub(1));
                }
                Action::Backspace => self.column = self.column.saturating_sub(1),
                Action::SelectGraphics(params) => self.style.apply(&params),
            }
        }
    }

    /// Writes a single character, NUL-terminated.
    pub fn put_char(&mut self, c: u8) {
        self.write(&[c, 0]);
    }

    /// Cursor position as `(column, row)`.
    #[must_use]
    pub const fn cursor(&self) -> (usize, usize) {
        (self.column, self.row)
    }

    /// Console size in cells as `(columns, rows)`.
    #[must_use]
    pub const fn size(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    #[must_use]
    pub const fn style(&self) -> Style {
        self.style
    }

    #[must_use]
    pub const fn surface(&self) -> &FramebufferSurface<'a> {
        &self.surface
    }

    fn print(&mut self, byte: u8) {
        if self.columns == 0 || self.rows == 0 {
            return;
        }

        // Wrap lazily so a line that exactly fills the row does not leave an empty one behind.
        if self.column >= self.columns {
            self.line_feed();
        }

        self.draw_cell(byte);
        self.column += 1;
    }

    fn line_feed(&mut self) {
        self.column = 0;
        if self.row + 1 < self.rows {
            self.row += 1;
        } else {
            let fill = self.surface.pack(self.style.background());
            self.surface.scroll_up(CELL_HEIGHT, fill);
        }
    }

    fn draw_cell(&mut self, byte: u8) {
        let foreground = self.surface.pack(self.style.foreground());
        let background = self.surface.pack(self.style.background());
        let bitmap = glyph(byte);

        let x0 = self.column * CELL_WIDTH;
        let y0 = self.row * CELL_HEIGHT;

        for y in 0..CELL_HEIGHT {
            let bits = bitmap.get(y).copied().unwrap_or_default();
            for x in 0..CELL_WIDTH {
                let set = bits & (0x80 >> x) != 0;
                let pixel = if set { foreground } else { background };
                self.surface.put_pixel(x0 + x, y0 + y, pixel);
            }
        }
    }
}

impl TextSink for Console<'_> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.write(bytes);
    }
}

impl fmt::Write for Console<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi::PALETTE;
    use crate::framebuffer::PixelFormat;

    fn with_console(columns: usize, rows: usize, f: impl FnOnce(&mut Console<'_>)) -> Vec<u32> {
        let width = columns * CELL_WIDTH;
        let height = rows * CELL_HEIGHT;
        let mut pixels = vec![0xDEAD_BEEF; width * height];
        {
            let surface =
                FramebufferSurface::from_slice(&mut pixels, width, height, width, PixelFormat::XRGB)
                    .unwrap();
            let mut console = Console::new(surface);
            f(&mut console);
        }
        pixels
    }

    #[test]
    fn init_clears_to_background() {
        let pixels = with_console(2, 2, |_| {});
        assert!(pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn text_advances_the_cursor_and_wraps() {
        with_console(4, 3, |console| {
            console.write(b"abc");
            assert_eq!(console.cursor(), (3, 0));
            console.write(b"de");
            assert_eq!(console.cursor(), (1, 1));
            console.write(b"\r\n");
            assert_eq!(console.cursor(), (0, 2));
        });
    }

    #[test]
    fn tab_and_backspace_move_the_cursor() {
        with_console(20, 1, |console| {
            console.write(b"a\t");
            assert_eq!(console.cursor(), (8, 0));
            console.write(b"\t\t");
            assert_eq!(console.cursor(), (19, 0));
            console.write(b"\x08\x08");
            assert_eq!(console.cursor(), (17, 0));
        });
    }

    #[test]
    fn nul_is_ignored() {
        with_console(4, 1, |console| {
            console.put_char(b'x');
            assert_eq!(console.cursor(), (1, 0));
        });
    }

    #[test]
    fn last_line_feed_scrolls() {
        with_console(4, 2, |console| {
            console.write(b"a\nb\nc");
            assert_eq!(console.cursor(), (1, 1));
        });
    }

    #[test]
    fn graphics_sequences_restyle_later_glyphs() {
        with_console(2, 1, |console| {
            console.write(b"\x1b[31m");
            assert_eq!(console.style().foreground(), PALETTE[1]);

            console.write(b"#");
            let red = console.surface().pack(PALETTE[1]);
            let cell: Vec<u32> = (0..CELL_HEIGHT)
                .flat_map(|y| (0..CELL_WIDTH).map(move |x| (x, y)))
                .filter_map(|(x, y)| console.surface().pixel(x, y))
                .collect();
            assert!(cell.contains(&red));

            console.write(b"\x1b[31\x1b[0m");
            assert_eq!(console.style(), Style::new());
            assert_eq!(console.cursor(), (1, 0));
        });
    }

    #[test]
    fn zero_sized_console_swallows_output() {
        let mut pixels = vec![0u32; 4];
        let surface =
            FramebufferSurface::from_slice(&mut pixels, 2, 2, 2, PixelFormat::XRGB).unwrap();
        let mut console = Console::new(surface);
        console.write(b"hello\n");
        assert_eq!(console.size(), (0, 0));
        assert_eq!(console.cursor(), (0, 0));
    }
}
