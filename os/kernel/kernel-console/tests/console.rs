use kernel_console::ansi::PALETTE;
use kernel_console::{CELL_HEIGHT, CELL_WIDTH, Console, FramebufferSurface, PixelFormat};

const COLUMNS: usize = 16;
const ROWS: usize = 4;
const WIDTH: usize = COLUMNS * CELL_WIDTH;
const HEIGHT: usize = ROWS * CELL_HEIGHT;

/// Renders a sequence of writes into a fresh framebuffer and returns its pixels.
fn render(writes: &[&[u8]]) -> Vec<u32> {
    let mut pixels = vec![0u32; WIDTH * HEIGHT];
    {
        let surface =
            FramebufferSurface::from_slice(&mut pixels, WIDTH, HEIGHT, WIDTH, PixelFormat::XRGB)
                .unwrap();
        let mut console = Console::new(surface);
        for bytes in writes {
            console.write(bytes);
        }
    }
    pixels
}

fn cell(pixels: &[u32], column: usize, row: usize) -> Vec<u32> {
    let mut out = Vec::new();
    for y in row * CELL_HEIGHT..(row + 1) * CELL_HEIGHT {
        let start = y * WIDTH + column * CELL_WIDTH;
        out.extend_from_slice(&pixels[start..start + CELL_WIDTH]);
    }
    out
}

#[test]
fn writes_are_append_only() {
    assert_eq!(render(&[b"A", b"B"]), render(&[b"AB"]));
}

#[test]
fn split_escape_sequences_render_like_whole_ones() {
    let whole = render(&[b"\x1b[01;31m[ERROR] \x1b[00mdisk"]);
    let split = render(&[b"\x1b[01", b";31m[ERR", b"OR] \x1b[", b"00mdisk"]);
    assert_eq!(whole, split);
}

#[test]
fn put_char_matches_write() {
    let mut pixels = vec![0u32; WIDTH * HEIGHT];
    {
        let surface =
            FramebufferSurface::from_slice(&mut pixels, WIDTH, HEIGHT, WIDTH, PixelFormat::XRGB)
                .unwrap();
        let mut console = Console::new(surface);
        for &c in b"hi!" {
            console.put_char(c);
        }
    }
    assert_eq!(pixels, render(&[b"hi!"]));
}

#[test]
fn glyphs_use_the_selected_colors() {
    let pixels = render(&[b"\x1b[01;34m#\x1b[00m#"]);
    let bright_blue = PixelFormat::XRGB.pack(PALETTE[12]);
    let gray = PixelFormat::XRGB.pack(PALETTE[7]);

    let styled = cell(&pixels, 0, 0);
    assert!(styled.contains(&bright_blue));
    assert!(!styled.contains(&gray));

    let plain = cell(&pixels, 1, 0);
    assert!(plain.contains(&gray));
    assert!(!plain.contains(&bright_blue));
}

#[test]
fn space_leaves_the_cell_blank() {
    let pixels = render(&[b" "]);
    assert!(cell(&pixels, 0, 0).iter().all(|&p| p == 0));
}

#[test]
fn scrolling_moves_text_up_one_row() {
    let before = render(&[b"x"]);

    // "x" lands on row 1; the last line feed scrolls it up to row 0.
    let line_feeds = [b'\n'; ROWS - 1];
    let writes: [&[u8]; 2] = [b"\nx", &line_feeds];
    let scrolled = render(&writes);

    assert_eq!(cell(&scrolled, 0, 0), cell(&before, 0, 0));
    assert!(cell(&scrolled, 0, 1).iter().all(|&p| p == 0));
}

#[test]
fn interrupted_sequence_leaves_no_text_behind() {
    assert_eq!(render(&[b"\x1b[31\x1b[0mX"]), render(&[b"X"]));
}
