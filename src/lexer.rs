//! Token recognition over a window of bytes.
//!
//! [try_next_token] is a pure function of the window, whether the window is final and the current
//! [DecoderState]. It never consumes anything: it reports the kind and extent of the next token,
//! asks for more bytes, or rejects the input outright. Leading whitespace and separators (`,` and
//! `:`) are folded into the front of the token that follows them, so that retiring up to the end
//! of a token always leaves the window positioned directly after it.
use crate::coords::Coords;
use crate::decoders::DecoderSelector;
use crate::errors::{Details, Error, JsonResult};
use crate::lexer_error;
use crate::state::{Container, DecoderState, Expect};
use crate::token::{unescape, TokenDescriptor, TokenKind};

/// Sequence of literal characters forming a 'null' token
const NULL_SEQUENCE: &[u8] = b"null";
/// Sequence of literal characters forming a 'true' token
const TRUE_SEQUENCE: &[u8] = b"true";
/// Sequence of literal characters forming a 'false' token
const FALSE_SEQUENCE: &[u8] = b"false";

/// The three possible outcomes of a recognition attempt
#[derive(Debug, Clone)]
pub enum LexOutcome {
    /// A complete token was found within the window
    Recognized(TokenDescriptor),
    /// The window ends before the next token can be determined
    NeedMoreBytes,
    /// The window contains bytes that can't form valid JSON
    Malformed(Error),
}

/// Attempt to recognize the next token within `window`
pub fn try_next_token(window: &[u8], is_final: bool, state: &DecoderState) -> LexOutcome {
    let lexer = WindowLexer {
        window,
        is_final,
        state,
    };
    match lexer.recognize() {
        Ok(Some(descriptor)) => LexOutcome::Recognized(descriptor),
        Ok(None) => LexOutcome::NeedMoreBytes,
        Err(err) => LexOutcome::Malformed(err),
    }
}

/// Macro for packing up a recognized token
macro_rules! recognized {
    ($kind : expr, $start : expr, $end : expr) => {
        Ok(Some(TokenDescriptor {
            kind: $kind,
            start: $start,
            end: $end,
        }))
    };
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Single-shot lexer over one window
struct WindowLexer<'a> {
    window: &'a [u8],
    is_final: bool,
    state: &'a DecoderState,
}

impl<'a> WindowLexer<'a> {
    fn recognize(&self) -> JsonResult<Option<TokenDescriptor>> {
        let index = self.skip_whitespace(0);
        match self.state.expect {
            Expect::Value => match self.peek(index) {
                None => self.exhausted(index),
                Some(_) => self.match_value(index),
            },
            Expect::ValueOrEndArray => match self.peek(index) {
                Some(b']') => recognized!(TokenKind::EndArray, index, index + 1),
                _ => self.match_value(index),
            },
            Expect::NameOrEndObject => match self.peek(index) {
                Some(b'}') => recognized!(TokenKind::EndObject, index, index + 1),
                _ => self.match_name(index),
            },
            Expect::Name => self.match_name(index),
            Expect::Colon => match self.peek(index) {
                None => self.truncated(index, Details::UnexpectedEndOfInput),
                Some(b':') => self.match_value(self.skip_whitespace(index + 1)),
                Some(b) => lexer_error!(Details::InvalidCharacter(b), self.coords_at(index)),
            },
            Expect::CommaOrEnd => self.match_separator_or_end(index),
            Expect::Done => match self.peek(index) {
                None => self.exhausted(index),
                Some(_) if self.state.options.allow_multiple_values => self.match_value(index),
                Some(_) => lexer_error!(Details::TrailingData, self.coords_at(index)),
            },
        }
    }

    #[inline]
    fn peek(&self, index: usize) -> Option<u8> {
        self.window.get(index).copied()
    }

    fn skip_whitespace(&self, from: usize) -> usize {
        self.window[from.min(self.window.len())..]
            .iter()
            .position(|b| !is_whitespace(*b))
            .map(|offset| from + offset)
            .unwrap_or(self.window.len())
    }

    fn skip_digits(&self, from: usize) -> usize {
        self.window[from.min(self.window.len())..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map(|offset| from + offset)
            .unwrap_or(self.window.len())
    }

    /// Stream coordinates of a given window offset
    fn coords_at(&self, index: usize) -> Coords {
        self.state
            .coords
            .advance(&self.window[..index.min(self.window.len())])
    }

    /// The window holds only whitespace where a token could start. On a final window this is a
    /// clean end of document, unless the grammar is still waiting on something.
    fn exhausted(&self, index: usize) -> JsonResult<Option<TokenDescriptor>> {
        if !self.is_final || self.state.expect == Expect::Done || self.state.at_document_start() {
            Ok(None)
        } else {
            lexer_error!(Details::UnexpectedEndOfInput, self.coords_at(index))
        }
    }

    /// The window ends part way through a token (or before a required token)
    fn truncated(&self, index: usize, details: Details) -> JsonResult<Option<TokenDescriptor>> {
        if self.is_final {
            lexer_error!(details, self.coords_at(index))
        } else {
            Ok(None)
        }
    }

    fn match_separator_or_end(&self, index: usize) -> JsonResult<Option<TokenDescriptor>> {
        let container = self.state.stack.last().copied();
        match (self.peek(index), container) {
            (None, _) => self.truncated(index, Details::UnexpectedEndOfInput),
            (Some(b','), Some(Container::Object)) => {
                self.match_name(self.skip_whitespace(index + 1))
            }
            (Some(b','), _) => self.match_value(self.skip_whitespace(index + 1)),
            (Some(b'}'), Some(Container::Object)) => {
                recognized!(TokenKind::EndObject, index, index + 1)
            }
            (Some(b']'), Some(Container::Array)) => {
                recognized!(TokenKind::EndArray, index, index + 1)
            }
            (Some(b), _) => lexer_error!(Details::InvalidCharacter(b), self.coords_at(index)),
        }
    }

    fn match_name(&self, index: usize) -> JsonResult<Option<TokenDescriptor>> {
        match self.peek(index) {
            None => self.truncated(index, Details::UnexpectedEndOfInput),
            Some(b'"') => self.match_string(index, TokenKind::PropertyName),
            Some(b) => lexer_error!(Details::InvalidCharacter(b), self.coords_at(index)),
        }
    }

    fn match_value(&self, index: usize) -> JsonResult<Option<TokenDescriptor>> {
        match self.peek(index) {
            None => self.truncated(index, Details::UnexpectedEndOfInput),
            Some(b'{') => self.match_container_start(index, TokenKind::StartObject),
            Some(b'[') => self.match_container_start(index, TokenKind::StartArray),
            Some(b'"') => self.match_string(index, TokenKind::String),
            Some(b'-' | b'0'..=b'9') => self.match_number(index),
            Some(b't') => self.match_literal(index, TRUE_SEQUENCE, TokenKind::True),
            Some(b'f') => self.match_literal(index, FALSE_SEQUENCE, TokenKind::False),
            Some(b'n') => self.match_literal(index, NULL_SEQUENCE, TokenKind::Null),
            Some(b) => lexer_error!(Details::InvalidCharacter(b), self.coords_at(index)),
        }
    }

    fn match_container_start(
        &self,
        index: usize,
        kind: TokenKind,
    ) -> JsonResult<Option<TokenDescriptor>> {
        let max_depth = self.state.options.max_depth;
        if self.state.stack.len() >= max_depth {
            return lexer_error!(Details::MaxDepthExceeded(max_depth), self.coords_at(index));
        }
        recognized!(kind, index, index + 1)
    }

    /// Match exactly a sequence of literal bytes. A matching prefix cut short by the end of the
    /// window needs more input.
    fn match_literal(
        &self,
        index: usize,
        seq: &[u8],
        kind: TokenKind,
    ) -> JsonResult<Option<TokenDescriptor>> {
        let available = &self.window[index..];
        let n = available.len().min(seq.len());
        if let Some(mismatch) = (0..n).find(|i| available[*i] != seq[*i]) {
            return lexer_error!(
                Details::InvalidLiteral(
                    String::from_utf8_lossy(&available[..=mismatch]).into_owned()
                ),
                self.coords_at(index)
            );
        }
        if n < seq.len() {
            return self.truncated(
                index + n,
                Details::InvalidLiteral(String::from_utf8_lossy(available).into_owned()),
            );
        }
        recognized!(kind, index, index + seq.len())
    }

    /// Attempts to match a string token, including any escaped characters. Escape sequences are
    /// validated but not translated; translation is deferred until the value is extracted.
    fn match_string(&self, index: usize, kind: TokenKind) -> JsonResult<Option<TokenDescriptor>> {
        let mut cursor = index + 1;
        let mut unicode_escapes = false;
        while let Some(b) = self.peek(cursor) {
            match b {
                b'"' => {
                    self.validate_string_content(index, cursor, unicode_escapes)?;
                    return recognized!(kind, index, cursor + 1);
                }
                b'\\' => match self.peek(cursor + 1) {
                    None => break,
                    Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => cursor += 2,
                    Some(b'u') => {
                        let digits = &self.window[cursor + 2..(cursor + 6).min(self.window.len())];
                        if !digits.iter().all(u8::is_ascii_hexdigit) {
                            return lexer_error!(
                                Details::InvalidUnicodeEscapeSequence(format!(
                                    "\\u{}",
                                    String::from_utf8_lossy(digits)
                                )),
                                self.coords_at(cursor)
                            );
                        }
                        if digits.len() < 4 {
                            break;
                        }
                        unicode_escapes = true;
                        cursor += 6;
                    }
                    Some(other) => {
                        return lexer_error!(
                            Details::InvalidEscapeSequence(format!("\\{}", char::from(other))),
                            self.coords_at(cursor)
                        )
                    }
                },
                b if b < 0x20 => {
                    return lexer_error!(
                        Details::ControlCharacterInString(b),
                        self.coords_at(cursor)
                    )
                }
                _ => cursor += 1,
            }
        }
        self.truncated(index, Details::UnterminatedString)
    }

    /// Check the payload of a complete string literal: encoding, and pairing of any surrogates
    /// expressed through `\u` escapes
    fn validate_string_content(
        &self,
        open: usize,
        close: usize,
        unicode_escapes: bool,
    ) -> JsonResult<()> {
        let content = &self.window[open + 1..close];
        let selector = DecoderSelector::default();
        if let Err(details) = selector.validate(content, self.state.options.encoding) {
            return lexer_error!(details, self.coords_at(open));
        }
        if unicode_escapes {
            if let Err(details) = unescape(content) {
                return lexer_error!(details, self.coords_at(open));
            }
        }
        Ok(())
    }

    /// Match a number against the JSON numeric grammar. A number running up to the end of a
    /// non-final window may continue in the next chunk, so it is only reported once a delimiter
    /// (or the end of input) is seen.
    fn match_number(&self, index: usize) -> JsonResult<Option<TokenDescriptor>> {
        let invalid = |end: usize| {
            Details::InvalidNumericRepresentation(
                String::from_utf8_lossy(&self.window[index..end.min(self.window.len())])
                    .into_owned(),
            )
        };

        let mut cursor = index;
        if self.peek(cursor) == Some(b'-') {
            cursor += 1;
        }
        match self.peek(cursor) {
            None => return self.truncated(index, invalid(cursor)),
            Some(b'0') => cursor += 1,
            Some(b'1'..=b'9') => cursor = self.skip_digits(cursor + 1),
            Some(_) => return lexer_error!(invalid(cursor + 1), self.coords_at(index)),
        }

        if self.peek(cursor) == Some(b'.') {
            cursor += 1;
            match self.peek(cursor) {
                None => return self.truncated(index, invalid(cursor)),
                Some(b) if b.is_ascii_digit() => cursor = self.skip_digits(cursor),
                Some(_) => return lexer_error!(invalid(cursor + 1), self.coords_at(index)),
            }
        }

        if matches!(self.peek(cursor), Some(b'e' | b'E')) {
            cursor += 1;
            if matches!(self.peek(cursor), Some(b'+' | b'-')) {
                cursor += 1;
            }
            match self.peek(cursor) {
                None => return self.truncated(index, invalid(cursor)),
                Some(b) if b.is_ascii_digit() => cursor = self.skip_digits(cursor),
                Some(_) => return lexer_error!(invalid(cursor + 1), self.coords_at(index)),
            }
        }

        match self.peek(cursor) {
            None if self.is_final => recognized!(TokenKind::Number, index, cursor),
            None => Ok(None),
            Some(b) if is_whitespace(b) || matches!(b, b',' | b']' | b'}') => {
                recognized!(TokenKind::Number, index, cursor)
            }
            Some(_) => lexer_error!(invalid(cursor + 1), self.coords_at(index)),
        }
    }
}
