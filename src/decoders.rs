//! String payloads are validated against an [Encoding] before a string token is reported as
//! recognized, so that the extractor only ever sees well-formed text. Validation runs the payload
//! through one of the `chisel-decoders` `char` iterators and checks that every byte was accounted
//! for.
//!
//! The [DecoderSelector] implemented within this module is used to instantiate new `char`
//! iterators, based on different encodings. (Currently only ASCII and UTF-8 are supported).
use chisel_decoders::{ascii::AsciiDecoder, utf8::Utf8Decoder};
use std::io::BufRead;

use crate::errors::Details;

/// Enumeration of different supported encoding types
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Encoding {
    Utf8,
    Ascii,
}

impl Default for Encoding {
    fn default() -> Self {
        Self::Utf8
    }
}

/// A struct that is essentially a factory for creating new instances of [char] iterators,
/// based on a specified encoding type
#[derive(Default)]
pub(crate) struct DecoderSelector {}

impl DecoderSelector {
    /// Create and return an instance of a given byte decoder / char iterator based on a specific
    /// encoding
    pub fn new_decoder<'a, Buffer: BufRead>(
        &'a self,
        buffer: &'a mut Buffer,
        encoding: Encoding,
    ) -> Box<dyn Iterator<Item = char> + 'a> {
        match encoding {
            Encoding::Ascii => Box::new(AsciiDecoder::new(buffer)),
            Encoding::Utf8 => Box::new(Utf8Decoder::new(buffer)),
        }
    }

    /// Check that a run of bytes decodes cleanly under the given encoding
    pub fn validate(&self, bytes: &[u8], encoding: Encoding) -> Result<(), Details> {
        if bytes.is_ascii() {
            return Ok(());
        }
        let mut reader = bytes;
        let mut consumed = 0;
        for c in self.new_decoder(&mut reader, encoding) {
            if encoding == Encoding::Ascii && !c.is_ascii() {
                return Err(Details::NonAsciiInputDetected);
            }
            consumed += c.len_utf8();
        }
        match (consumed == bytes.len(), encoding) {
            (true, _) => Ok(()),
            (false, Encoding::Utf8) => Err(Details::NonUtf8InputDetected),
            (false, Encoding::Ascii) => Err(Details::NonAsciiInputDetected),
        }
    }
}
