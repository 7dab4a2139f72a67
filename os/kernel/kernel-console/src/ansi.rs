//! # ANSI escape handling
//!
//! A small byte-at-a-time parser for the subset of control sequences the console
//! honors: C0 controls and `CSI ... m` (select graphic rendition). Everything else
//! is consumed silently. Parser state survives across writes, so a sequence split
//! over two writes renders the same as one written at once.
//!
//! An ESC abandons any unfinished sequence. Parameters past the eighth are dropped.

use crate::framebuffer::Rgb;

const ESC: u8 = 0x1B;
const MAX_PARAMS: usize = 8;

/// VGA-like 16-color palette: eight normal colors followed by their bright variants.
pub const PALETTE: [Rgb; 16] = [
    Rgb::from_hex(0x0000_0000),
    Rgb::from_hex(0x00AA_0000),
    Rgb::from_hex(0x0000_AA00),
    Rgb::from_hex(0x00AA_5500),
    Rgb::from_hex(0x0000_00AA),
    Rgb::from_hex(0x00AA_00AA),
    Rgb::from_hex(0x0000_AAAA),
    Rgb::from_hex(0x00AA_AAAA),
    Rgb::from_hex(0x0055_5555),
    Rgb::from_hex(0x00FF_5555),
    Rgb::from_hex(0x0055_FF55),
    Rgb::from_hex(0x00FF_FF55),
    Rgb::from_hex(0x0055_55FF),
    Rgb::from_hex(0x00FF_55FF),
    Rgb::from_hex(0x0055_FFFF),
    Rgb::from_hex(0x00FF_FFFF),
];

const DEFAULT_FOREGROUND: u8 = 7;
const DEFAULT_BACKGROUND: u8 = 0;

/// What the console should do with the byte just fed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing visible; the byte was consumed.
    None,
    /// Draw the byte at the cursor.
    Print(u8),
    LineFeed,
    CarriageReturn,
    Tab,
    Backspace,
    /// A complete `CSI ... m` sequence.
    SelectGraphics(Params),
}

/// Numeric parameters of a control sequence. Missing parameters read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    values: [u16; MAX_PARAMS],
    len: usize,
}

impl Params {
    const fn empty() -> Self {
        Self {
            values: [0; MAX_PARAMS],
            len: 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.values[..self.len].iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    Csi,
}

#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    params: Params,
    /// Whether a digit or separator was seen for the current parameter.
    pending: bool,
    /// Set once a separator arrives with every parameter slot taken.
    overflow: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Ground,
            params: Params::empty(),
            pending: false,
            overflow: false,
        }
    }

    pub fn advance(&mut self, byte: u8) -> Action {
        match self.state {
            State::Ground => self.ground(byte),
            State::Escape => {
                self.state = match byte {
                    b'[' => {
                        self.params = Params::empty();
                        self.pending = false;
                        self.overflow = false;
                        State::Csi
                    }
                    ESC => State::Escape,
                    _ => State::Ground,
                };
                Action::None
            }
            State::Csi => self.csi(byte),
        }
    }

    fn ground(&mut self, byte: u8) -> Action {
        match byte {
            ESC => {
                self.state = State::Escape;
                Action::None
            }
            b'\n' => Action::LineFeed,
            b'\r' => Action::CarriageReturn,
            b'\t' => Action::Tab,
            0x08 => Action::Backspace,
            0x00..=0x1F | 0x7F => Action::None,
            _ => Action::Print(byte),
        }
    }

    fn csi(&mut self, byte: u8) -> Action {
        match byte {
            // Abandons the sequence and starts a new one.
            ESC => {
                self.state = State::Escape;
                Action::None
            }
            b'0'..=b'9' if self.overflow => Action::None,
            b'0'..=b'9' => {
                if self.params.len == 0 {
                    self.params.len = 1;
                }
                if let Some(value) = self.params.values.get_mut(self.params.len - 1) {
                    *value = value
                        .saturating_mul(10)
                        .saturating_add(u16::from(byte - b'0'));
                }
                self.pending = true;
                Action::None
            }
            b';' => {
                if self.params.len == 0 {
                    self.params.len = 1;
                }
                if self.params.len < MAX_PARAMS {
                    self.params.len += 1;
                } else {
                    self.overflow = true;
                }
                self.pending = true;
                Action::None
            }
            0x40..=0x7E => {
                self.state = State::Ground;
                if byte == b'm' {
                    let mut params = self.params;
                    if !self.pending {
                        // `ESC [ m` is a reset.
                        params.len = 1;
                    }
                    Action::SelectGraphics(params)
                } else {
                    Action::None
                }
            }
            // Intermediates and private markers are ignored.
            _ => Action::None,
        }
    }
}

/// Current character attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    foreground: u8,
    background: u8,
    bold: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

impl Style {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            foreground: DEFAULT_FOREGROUND,
            background: DEFAULT_BACKGROUND,
            bold: false,
        }
    }

    /// Applies the parameters of a `CSI ... m` sequence. Unsupported codes are ignored.
    pub fn apply(&mut self, params: &Params) {
        for code in params.iter() {
            match code {
                0 => *self = Self::new(),
                1 => self.bold = true,
                22 => self.bold = false,
                30..=37 => self.foreground = palette_index(code - 30),
                39 => self.foreground = DEFAULT_FOREGROUND,
                40..=47 => self.background = palette_index(code - 40),
                49 => self.background = DEFAULT_BACKGROUND,
                90..=97 => self.foreground = palette_index(code - 90) + 8,
                100..=107 => self.background = palette_index(code - 100) + 8,
                _ => {}
            }
        }
    }

    /// Foreground color; bold selects the bright variant of the normal colors.
    #[must_use]
    pub fn foreground(&self) -> Rgb {
        let index = if self.bold && self.foreground < 8 {
            self.foreground + 8
        } else {
            self.foreground
        };
        PALETTE[usize::from(index)]
    }

    #[must_use]
    pub fn background(&self) -> Rgb {
        PALETTE[usize::from(self.background)]
    }
}

fn palette_index(offset: u16) -> u8 {
    u8::try_from(offset).unwrap_or_default() & 0x07
}
