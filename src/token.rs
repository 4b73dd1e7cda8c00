//! Token kinds, token descriptors and the typed accessors available over a recognized token
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::coords::Coords;
use crate::errors::{Details, JsonResult};
use crate::extractor_error;

/// Enumeration of valid JSON tokens. Separators and whitespace are never reported as tokens in
/// their own right.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    /// A string appearing in the key position of an object member
    PropertyName,
    String,
    Number,
    True,
    False,
    Null,
    /// Sentinel returned once no further top-level tokens exist
    EndOfDocument,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The outcome of recognizing a token within a window: its kind, together with the offsets of
/// its first byte and one past its last byte. Both offsets are relative to the start of the window
/// the token was recognized in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// A borrowed view over the raw bytes of a recognized token
#[derive(Debug, Copy, Clone)]
pub struct Token<'a> {
    kind: TokenKind,
    raw: &'a [u8],
    coords: Coords,
}

/// Generates an infallible getter on top of a `try_` getter, mapping an unrepresentable value
/// into [Details::NumberOutOfRange]
macro_rules! checked_getter {
    ($name : ident, $try_name : ident, $t : ty) => {
        pub fn $name(&self) -> JsonResult<$t> {
            match self.$try_name()? {
                Some(value) => Ok(value),
                None => extractor_error!(
                    Details::NumberOutOfRange(String::from_utf8_lossy(self.raw).into_owned()),
                    self.coords
                ),
            }
        }
    };
}

/// Generates a `try_` getter for an integral type, parsed with lexical
macro_rules! integer_getter {
    ($try_name : ident, $t : ty) => {
        pub fn $try_name(&self) -> JsonResult<Option<$t>> {
            self.expect(TokenKind::Number)?;
            Ok(lexical::parse::<$t, _>(self.raw).ok())
        }
    };
}

/// Generates a `try_` getter for a floating point type, parsed with fast_float. Finite literals
/// that overflow to an infinity are treated as out of range.
macro_rules! float_getter {
    ($try_name : ident, $t : ty) => {
        pub fn $try_name(&self) -> JsonResult<Option<$t>> {
            self.expect(TokenKind::Number)?;
            Ok(fast_float::parse::<$t, _>(self.raw)
                .ok()
                .filter(|value| value.is_finite()))
        }
    };
}

impl<'a> Token<'a> {
    pub(crate) fn new(kind: TokenKind, raw: &'a [u8], coords: Coords) -> Self {
        Token { kind, raw, coords }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The raw bytes of the token, including the enclosing quotes of strings
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// The position of the first byte of the token within the stream
    pub fn coords(&self) -> Coords {
        self.coords
    }

    fn expect(&self, kind: TokenKind) -> JsonResult<()> {
        if self.kind == kind {
            Ok(())
        } else {
            extractor_error!(Details::UnexpectedToken(self.kind), self.coords)
        }
    }

    pub fn get_bool(&self) -> JsonResult<bool> {
        match self.kind {
            TokenKind::True => Ok(true),
            TokenKind::False => Ok(false),
            kind => extractor_error!(Details::UnexpectedToken(kind), self.coords),
        }
    }

    /// Decode the contents of a string or property name token, with all escape sequences
    /// translated. Borrows from the underlying window where no translation was required.
    pub fn get_str(&self) -> JsonResult<Cow<'a, str>> {
        match self.kind {
            TokenKind::String | TokenKind::PropertyName => {
                match unescape(&self.raw[1..self.raw.len() - 1]) {
                    Ok(text) => Ok(text),
                    Err(details) => extractor_error!(details, self.coords),
                }
            }
            kind => extractor_error!(Details::UnexpectedToken(kind), self.coords),
        }
    }

    integer_getter!(try_get_i32, i32);
    integer_getter!(try_get_i64, i64);
    integer_getter!(try_get_u32, u32);
    integer_getter!(try_get_u64, u64);
    float_getter!(try_get_f32, f32);
    float_getter!(try_get_f64, f64);

    pub fn try_get_decimal(&self) -> JsonResult<Option<Decimal>> {
        self.expect(TokenKind::Number)?;
        let text = match std::str::from_utf8(self.raw) {
            Ok(text) => text,
            Err(_) => return extractor_error!(Details::NonUtf8InputDetected, self.coords),
        };
        if text.contains(|c| c == 'e' || c == 'E') {
            Ok(Decimal::from_scientific(text).ok())
        } else {
            Ok(Decimal::from_str(text).ok())
        }
    }

    checked_getter!(get_i32, try_get_i32, i32);
    checked_getter!(get_i64, try_get_i64, i64);
    checked_getter!(get_u32, try_get_u32, u32);
    checked_getter!(get_u64, try_get_u64, u64);
    checked_getter!(get_f32, try_get_f32, f32);
    checked_getter!(get_f64, try_get_f64, f64);
    checked_getter!(get_decimal, try_get_decimal, Decimal);
}

/// Parse the four hex digits of a `\u` escape
fn parse_hex4(digits: &[u8]) -> Option<u16> {
    if digits.len() != 4 || !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| u16::from_str_radix(s, 16).ok())
}

/// Translate the escape sequences found within the (unquoted) contents of a string literal.
/// Surrogate pairs expressed as two consecutive `\u` escapes are combined; lone surrogates are
/// rejected.
pub(crate) fn unescape(content: &[u8]) -> Result<Cow<'_, str>, Details> {
    if memchr::memchr(b'\\', content).is_none() {
        return std::str::from_utf8(content)
            .map(Cow::Borrowed)
            .map_err(|_| Details::NonUtf8InputDetected);
    }

    let mut buffer = String::with_capacity(content.len());
    let mut index = 0;
    while index < content.len() {
        let run_end = memchr::memchr(b'\\', &content[index..])
            .map(|offset| index + offset)
            .unwrap_or(content.len());
        match std::str::from_utf8(&content[index..run_end]) {
            Ok(run) => buffer.push_str(run),
            Err(_) => return Err(Details::NonUtf8InputDetected),
        }
        index = run_end;
        if index == content.len() {
            break;
        }

        let escaped = content
            .get(index + 1)
            .copied()
            .ok_or_else(|| Details::InvalidEscapeSequence("\\".to_string()))?;
        index += 2;
        match escaped {
            b'"' => buffer.push('"'),
            b'\\' => buffer.push('\\'),
            b'/' => buffer.push('/'),
            b'b' => buffer.push('\u{8}'),
            b'f' => buffer.push('\u{c}'),
            b'n' => buffer.push('\n'),
            b'r' => buffer.push('\r'),
            b't' => buffer.push('\t'),
            b'u' => {
                let (c, used) = unescape_unicode(&content[index..])?;
                buffer.push(c);
                index += used;
            }
            other => {
                return Err(Details::InvalidEscapeSequence(format!(
                    "\\{}",
                    char::from(other)
                )))
            }
        }
    }
    Ok(Cow::Owned(buffer))
}

/// Decode the hex digits following a `\u`, together with a trailing low surrogate escape where
/// required. Returns the decoded char and the number of bytes used after the initial `\u`.
fn unescape_unicode(rest: &[u8]) -> Result<(char, usize), Details> {
    let invalid = |len: usize| {
        Details::InvalidUnicodeEscapeSequence(format!(
            "\\u{}",
            String::from_utf8_lossy(&rest[..len.min(rest.len())])
        ))
    };

    let high = rest.get(..4).and_then(parse_hex4).ok_or_else(|| invalid(4))?;
    match high {
        0xD800..=0xDBFF => {
            if rest.get(4..6) != Some(b"\\u".as_slice()) {
                return Err(invalid(4));
            }
            let low = rest.get(6..10).and_then(parse_hex4).ok_or_else(|| invalid(10))?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(invalid(10));
            }
            let code = 0x10000 + (((high as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
            char::from_u32(code)
                .map(|c| (c, 10))
                .ok_or_else(|| invalid(10))
        }
        0xDC00..=0xDFFF => Err(invalid(4)),
        code => char::from_u32(code as u32)
            .map(|c| (c, 4))
            .ok_or_else(|| invalid(4)),
    }
}
