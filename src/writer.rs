//! Encoding of scalar values into JSON text. Each function appends exactly one JSON value to the
//! supplied buffer.
use rust_decimal::Decimal;

use crate::errors::{Details, JsonResult};
use crate::options::WriterOptions;
use crate::writer_error;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

pub fn write_bool(buffer: &mut Vec<u8>, value: bool) {
    let literal: &[u8] = if value { b"true" } else { b"false" };
    buffer.extend_from_slice(literal);
}

/// Write any integral value lexical knows how to format
pub fn write_integer<N: lexical::ToLexical>(buffer: &mut Vec<u8>, value: N) {
    buffer.extend_from_slice(lexical::to_string(value).as_bytes());
}

/// Floats are written in their shortest round-trip representation. NaN and the infinities have no
/// JSON representation.
pub fn write_f64(buffer: &mut Vec<u8>, value: f64) -> JsonResult<()> {
    if !value.is_finite() {
        return writer_error!(Details::NonFiniteNumber);
    }
    buffer.extend_from_slice(lexical::to_string(value).as_bytes());
    Ok(())
}

pub fn write_f32(buffer: &mut Vec<u8>, value: f32) -> JsonResult<()> {
    if !value.is_finite() {
        return writer_error!(Details::NonFiniteNumber);
    }
    buffer.extend_from_slice(lexical::to_string(value).as_bytes());
    Ok(())
}

pub fn write_decimal(buffer: &mut Vec<u8>, value: &Decimal) {
    buffer.extend_from_slice(value.to_string().as_bytes());
}

/// Write a quoted string, escaping according to the supplied [WriterOptions]
pub fn write_string(buffer: &mut Vec<u8>, value: &str, options: &WriterOptions) {
    buffer.reserve(value.len() + 2);
    buffer.push(b'"');
    let mut run_start = 0;
    for (index, c) in value.char_indices() {
        if !needs_escape(c, options) {
            continue;
        }
        buffer.extend_from_slice(&value.as_bytes()[run_start..index]);
        run_start = index + c.len_utf8();
        match c {
            '"' => buffer.extend_from_slice(b"\\\""),
            '\\' => buffer.extend_from_slice(b"\\\\"),
            '\u{08}' => buffer.extend_from_slice(b"\\b"),
            '\u{0C}' => buffer.extend_from_slice(b"\\f"),
            '\n' => buffer.extend_from_slice(b"\\n"),
            '\r' => buffer.extend_from_slice(b"\\r"),
            '\t' => buffer.extend_from_slice(b"\\t"),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write_unicode_escape(buffer, *unit);
                }
            }
        }
    }
    buffer.extend_from_slice(&value.as_bytes()[run_start..]);
    buffer.push(b'"');
}

#[inline]
fn needs_escape(c: char, options: &WriterOptions) -> bool {
    match c {
        '"' | '\\' | '\u{00}'..='\u{1F}' => true,
        '<' | '>' | '&' | '\'' | '+' => options.escape_html,
        c if !c.is_ascii() => options.escape_non_ascii,
        _ => false,
    }
}

fn write_unicode_escape(buffer: &mut Vec<u8>, unit: u16) {
    buffer.extend_from_slice(&[
        b'\\',
        b'u',
        HEX_DIGITS[(unit >> 12) as usize & 0xF],
        HEX_DIGITS[(unit >> 8) as usize & 0xF],
        HEX_DIGITS[(unit >> 4) as usize & 0xF],
        HEX_DIGITS[unit as usize & 0xF],
    ]);
}

#[cfg(test)]
mod tests {
    use crate::errors::Details;
    use crate::options::WriterOptions;
    use crate::writer::*;

    fn escaped(value: &str, options: WriterOptions) -> String {
        let mut buffer = vec![];
        write_string(&mut buffer, value, &options);
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn should_escape_quotes_and_control_characters() {
        let options = WriterOptions::default();
        assert_eq!(escaped("plain", options), r#""plain""#);
        assert_eq!(escaped("a\"b\\c", options), r#""a\"b\\c""#);
        assert_eq!(escaped("\n\t\r\u{8}\u{c}", options), r#""\n\t\r\b\f""#);
        assert_eq!(escaped("\u{1}\u{1f}", options), r#""\u0001\u001F""#);
    }

    #[test]
    fn should_escape_non_ascii_when_configured() {
        let options = WriterOptions::default();
        assert_eq!(escaped("été", options), r#""\u00E9t\u00E9""#);
        assert_eq!(escaped("😀", options), r#""\uD83D\uDE00""#);
        let options = options.with_non_ascii_escaping(false);
        assert_eq!(escaped("été 😀", options), "\"été 😀\"");
    }

    #[test]
    fn should_escape_html_sensitive_characters_when_configured() {
        assert_eq!(escaped("<a&b>", WriterOptions::default()), r#""<a&b>""#);
        let options = WriterOptions::default().with_html_escaping(true);
        assert_eq!(
            escaped("<a'+'>", options),
            r#""\u003Ca\u0027\u002B\u0027\u003E""#
        );
    }

    #[test]
    fn should_write_numbers() {
        let mut buffer = vec![];
        write_integer(&mut buffer, -42i64);
        buffer.push(b' ');
        write_integer(&mut buffer, u64::MAX);
        buffer.push(b' ');
        write_f64(&mut buffer, 2.5).unwrap();
        assert_eq!(buffer, b"-42 18446744073709551615 2.5");
    }

    #[test]
    fn should_reject_non_finite_floats() {
        let mut buffer = vec![];
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = write_f64(&mut buffer, value).unwrap_err();
            assert!(matches!(err.details, Details::NonFiniteNumber));
        }
        assert!(write_f32(&mut buffer, f32::NAN).is_err());
        assert!(buffer.is_empty());
    }
}
