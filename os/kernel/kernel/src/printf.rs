//! # printf-style Formatting
//!
//! A closed formatter over a tagged argument list. Templates follow the C
//! conventions the boot diagnostics are written in:
//!
//! ```text
//! %[flags][width][length]conversion
//!
//! flags       '-' left-justify, '0' pad numbers with zeros
//! width       minimum field width in characters (capped at 64)
//! length      hh, h (wrap to 8/16 bits like C), l, ll, z, j, t (accepted, no effect)
//! conversion  d i        signed decimal
//!             u          unsigned decimal
//!             x X        hexadecimal, lower/upper case
//!             c          single byte
//!             s          NUL-terminated narrow or wide string
//!             %          literal percent sign
//! ```
//!
//! Formatting never fails. A directive without a matching argument, or with an
//! unknown conversion, is written out verbatim; an argument of the wrong kind
//! renders as `<?>`. Arguments left over at the end of the template are ignored.

use core::ffi::CStr;
use kernel_console::TextSink;

const MAX_WIDTH: usize = 64;
const MISMATCH: &[u8] = b"<?>";
const DIGITS_LOWER: &[u8; 16] = b"0123456789abcdef";
const DIGITS_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// One formatting argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg<'a> {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    I32(i32),
    I64(i64),
    Char(u8),
    /// Narrow string; rendering stops at the first NUL, if any.
    Str(&'a [u8]),
    /// UCS-2 string; rendering stops at the first NUL, non-ASCII units render as `?`.
    WideStr(&'a [u16]),
}

macro_rules! arg_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Arg<'_> {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

arg_from!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize, i32 => I32, i64 => I64);

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a CStr> for Arg<'a> {
    fn from(value: &'a CStr) -> Self {
        Self::Str(value.to_bytes())
    }
}

impl<'a> From<&'a [u16]> for Arg<'a> {
    fn from(value: &'a [u16]) -> Self {
        Self::WideStr(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Length {
    #[default]
    Native,
    Char,
    Short,
}

#[derive(Debug, Clone, Copy, Default)]
struct Field {
    left: bool,
    zero: bool,
    width: usize,
    length: Length,
    conversion: u8,
}

/// Formats `template` with `args` into `out`.
pub fn format<S: TextSink>(out: &mut S, template: &[u8], args: &[Arg<'_>]) {
    let mut args = args.iter().copied();
    let mut rest = template;

    while !rest.is_empty() {
        let literal = rest.iter().position(|&b| b == b'%').unwrap_or(rest.len());
        if literal > 0 {
            out.write_bytes(&rest[..literal]);
            rest = &rest[literal..];
            continue;
        }

        let Some((field, used)) = parse(&rest[1..]) else {
            // Template ends inside a directive.
            out.write_bytes(rest);
            return;
        };
        let directive = &rest[..=used];
        rest = &rest[used + 1..];

        match field.conversion {
            b'%' => out.write_bytes(b"%"),
            b'd' | b'i' | b'u' | b'x' | b'X' | b'c' | b's' => match args.next() {
                Some(arg) => render(out, &field, arg),
                None => out.write_bytes(directive),
            },
            _ => out.write_bytes(directive),
        }
    }
}

/// Parses the directive following a `%`, returning it and the bytes consumed.
fn parse(directive: &[u8]) -> Option<(Field, usize)> {
    let mut field = Field::default();
    let mut i = 0;

    while let Some(&flag) = directive.get(i) {
        match flag {
            b'-' => field.left = true,
            b'0' => field.zero = true,
            _ => break,
        }
        i += 1;
    }

    while let Some(&digit) = directive.get(i).filter(|b| b.is_ascii_digit()) {
        field.width = (field.width * 10 + usize::from(digit - b'0')).min(MAX_WIDTH);
        i += 1;
    }

    match directive.get(i..i + 2) {
        Some([b'h', b'h']) => {
            field.length = Length::Char;
            i += 2;
        }
        Some([b'l', b'l']) => i += 2,
        _ => match directive.get(i) {
            Some(b'h') => {
                field.length = Length::Short;
                i += 1;
            }
            Some(b'l' | b'z' | b'j' | b't') => i += 1,
            _ => {}
        },
    }

    field.conversion = *directive.get(i)?;
    Some((field, i + 1))
}

fn render<S: TextSink>(out: &mut S, field: &Field, arg: Arg<'_>) {
    match field.conversion {
        b's' => match arg {
            Arg::Str(s) => narrow(out, field, s),
            Arg::WideStr(s) => wide(out, field, s),
            _ => out.write_bytes(MISMATCH),
        },
        b'c' => match arg {
            Arg::Char(c) | Arg::U8(c) => justify(out, field, &[c]),
            _ => out.write_bytes(MISMATCH),
        },
        _ => match integer(arg) {
            Some((negative, magnitude)) => number(out, field, negative, magnitude),
            None => out.write_bytes(MISMATCH),
        },
    }
}

/// Keeps the low `bits` of the two's complement value, sign-extended if `signed`.
fn truncate(negative: bool, magnitude: u64, bits: u32, signed: bool) -> (bool, u64) {
    let raw = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    let modulus = 1u64 << bits;
    let value = raw & (modulus - 1);

    if signed && value & (modulus >> 1) != 0 {
        (true, modulus - value)
    } else {
        (false, value)
    }
}

/// Splits an integer argument into sign and magnitude.
fn integer(arg: Arg<'_>) -> Option<(bool, u64)> {
    Some(match arg {
        Arg::U8(v) | Arg::Char(v) => (false, u64::from(v)),
        Arg::U16(v) => (false, u64::from(v)),
        Arg::U32(v) => (false, u64::from(v)),
        Arg::U64(v) => (false, v),
        Arg::Usize(v) => (false, u64::try_from(v).unwrap_or(u64::MAX)),
        Arg::I32(v) => (v < 0, u64::from(v.unsigned_abs())),
        Arg::I64(v) => (v < 0, v.unsigned_abs()),
        Arg::Str(_) | Arg::WideStr(_) => return None,
    })
}

fn number<S: TextSink>(out: &mut S, field: &Field, negative: bool, magnitude: u64) {
    let signed = matches!(field.conversion, b'd' | b'i');
    let (negative, mut magnitude) = match field.length {
        Length::Native if signed || !negative => (negative, magnitude),
        // Two's complement, as C would reinterpret the bits.
        Length::Native => (false, magnitude.wrapping_neg()),
        Length::Char => truncate(negative, magnitude, 8, signed),
        Length::Short => truncate(negative, magnitude, 16, signed),
    };

    let (radix, table) = match field.conversion {
        b'x' => (16, DIGITS_LOWER),
        b'X' => (16, DIGITS_UPPER),
        _ => (10, DIGITS_LOWER),
    };

    let mut buf = [0u8; 20];
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = table[usize::try_from(magnitude % radix).unwrap_or_default()];
        magnitude /= radix;
        if magnitude == 0 {
            break;
        }
    }

    let digits = &buf[pos..];
    let sign: &[u8] = if negative && magnitude_is_nonzero(digits) {
        b"-"
    } else {
        b""
    };
    let fill = field.width.saturating_sub(sign.len() + digits.len());

    if field.left {
        out.write_bytes(sign);
        out.write_bytes(digits);
        pad(out, b' ', fill);
    } else if field.zero {
        out.write_bytes(sign);
        pad(out, b'0', fill);
        out.write_bytes(digits);
    } else {
        pad(out, b' ', fill);
        out.write_bytes(sign);
        out.write_bytes(digits);
    }
}

fn magnitude_is_nonzero(digits: &[u8]) -> bool {
    digits.iter().any(|&d| d != b'0')
}

fn narrow<S: TextSink>(out: &mut S, field: &Field, s: &[u8]) {
    let end = s.iter().position(|&b| b == 0).unwrap_or(s.len());
    justify(out, field, &s[..end]);
}

fn wide<S: TextSink>(out: &mut S, field: &Field, s: &[u16]) {
    let end = s.iter().position(|&unit| unit == 0).unwrap_or(s.len());
    let s = &s[..end];
    let fill = field.width.saturating_sub(s.len());

    if !field.left {
        pad(out, b' ', fill);
    }

    let mut buf = [0u8; 32];
    for chunk in s.chunks(buf.len()) {
        for (dst, &unit) in buf.iter_mut().zip(chunk) {
            *dst = u8::try_from(unit)
                .ok()
                .filter(u8::is_ascii)
                .unwrap_or(b'?');
        }
        out.write_bytes(&buf[..chunk.len()]);
    }

    if field.left {
        pad(out, b' ', fill);
    }
}

/// Writes `text` space-padded to the field width.
fn justify<S: TextSink>(out: &mut S, field: &Field, text: &[u8]) {
    let fill = field.width.saturating_sub(text.len());
    if field.left {
        out.write_bytes(text);
        pad(out, b' ', fill);
    } else {
        pad(out, b' ', fill);
        out.write_bytes(text);
    }
}

fn pad<S: TextSink>(out: &mut S, fill: u8, mut count: usize) {
    const SPACES: [u8; 16] = [b' '; 16];
    const ZEROS: [u8; 16] = [b'0'; 16];

    let chunk: &[u8] = if fill == b'0' { &ZEROS } else { &SPACES };
    while count > 0 {
        let n = count.min(chunk.len());
        out.write_bytes(&chunk[..n]);
        count -= n;
    }
}
