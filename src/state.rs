//! Caller-held, resumable progress records for decoding and encoding. A state value is created at
//! the start of an operation against a single stream and threaded explicitly through every call
//! made against that stream, across any number of suspensions.
use crate::advancer::Phase;
use crate::coords::Coords;
use crate::options::{ReaderOptions, WriterOptions};
use crate::token::{TokenDescriptor, TokenKind};

/// The kind of an open container
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Container {
    Object,
    Array,
}

/// What the grammar allows next
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Expect {
    /// Any value (start of document, after a colon or after a comma within an array)
    Value,
    /// Any value, or the end of the array just opened
    ValueOrEndArray,
    /// A property name, or the end of the object just opened
    NameOrEndObject,
    /// A property name (after a comma within an object)
    Name,
    /// The colon following a property name, then a value
    Colon,
    /// A comma or the end of the enclosing container
    CommaOrEnd,
    /// A complete top-level value has been consumed
    Done,
}

/// Resumable decoder progress. Probing for a token never changes the grammar context held here;
/// only retiring a token does.
#[derive(Debug, Clone)]
pub struct DecoderState {
    pub(crate) options: ReaderOptions,
    pub(crate) stack: Vec<Container>,
    pub(crate) expect: Expect,
    /// Coordinates of the first unretired byte
    pub(crate) coords: Coords,
    pub(crate) phase: Phase,
}

impl Default for DecoderState {
    fn default() -> Self {
        DecoderState::new(ReaderOptions::default())
    }
}

impl DecoderState {
    pub fn new(options: ReaderOptions) -> Self {
        DecoderState {
            options,
            stack: vec![],
            expect: Expect::Value,
            coords: Coords::default(),
            phase: Phase::Scanning,
        }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Coordinates of the first byte not yet retired
    pub fn coords(&self) -> Coords {
        self.coords
    }

    /// Total number of bytes retired against this state
    pub fn bytes_consumed(&self) -> usize {
        self.coords.absolute
    }

    /// Current container nesting depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The current phase of the token state machine
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Whether nothing but whitespace has been retired so far
    pub(crate) fn at_document_start(&self) -> bool {
        self.expect == Expect::Value && self.stack.is_empty()
    }

    /// Commit a retired token: move the grammar forward and the cursor over the retired bytes
    pub(crate) fn commit(&mut self, descriptor: &TokenDescriptor, retired: &[u8]) {
        match descriptor.kind {
            TokenKind::StartObject => {
                self.stack.push(Container::Object);
                self.expect = Expect::NameOrEndObject;
            }
            TokenKind::StartArray => {
                self.stack.push(Container::Array);
                self.expect = Expect::ValueOrEndArray;
            }
            TokenKind::EndObject | TokenKind::EndArray => {
                self.stack.pop();
                self.after_value();
            }
            TokenKind::PropertyName => self.expect = Expect::Colon,
            TokenKind::EndOfDocument => (),
            _ => self.after_value(),
        }
        self.coords = self.coords.advance(retired);
        self.phase = Phase::Scanning;
    }

    fn after_value(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrEnd
        };
    }
}

/// Resumable encoder progress, scoped to a single output stream
#[derive(Debug, Clone, Default)]
pub struct WriterState {
    pub(crate) options: WriterOptions,
    values_written: usize,
}

impl WriterState {
    pub fn new(options: WriterOptions) -> Self {
        WriterState {
            options,
            values_written: 0,
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Number of complete top-level values written against this state
    pub fn values_written(&self) -> usize {
        self.values_written
    }

    /// The separator (if any) to emit ahead of the next top-level value
    pub(crate) fn separator(&self) -> Option<u8> {
        (self.values_written > 0).then_some(self.options.value_separator)
    }

    pub(crate) fn value_written(&mut self) {
        self.values_written += 1;
    }
}
