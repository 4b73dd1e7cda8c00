//! Configuration for the decoding, encoding and transport layers. Every options structure carries
//! sensible defaults and a set of `with_*` methods for overriding them.
use crate::decoders::Encoding;

/// Default maximum container nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default number of unretired bytes at which a [crate::transport::pipe::PipeWriter] is paused
pub const DEFAULT_PAUSE_WRITER_THRESHOLD: usize = 64 * 1024;

/// Default number of unretired bytes below which a paused writer resumes
pub const DEFAULT_RESUME_WRITER_THRESHOLD: usize = 32 * 1024;

/// Default minimum amount of buffer space requested on each read from an `AsyncRead`
pub const DEFAULT_MIN_READ_SIZE: usize = 4 * 1024;

/// Options controlling token recognition
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReaderOptions {
    /// The [Encoding] string payloads are validated against
    pub encoding: Encoding,
    /// Maximum depth of nested objects and arrays
    pub max_depth: usize,
    /// Whether whitespace separated top-level values may follow one another
    pub allow_multiple_values: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            encoding: Encoding::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            allow_multiple_values: false,
        }
    }
}

impl ReaderOptions {
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_multiple_values(mut self, allow: bool) -> Self {
        self.allow_multiple_values = allow;
        self
    }
}

/// Options controlling value encoding
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WriterOptions {
    /// Escape anything outside of the ASCII range as `\uXXXX`
    pub escape_non_ascii: bool,
    /// Escape `<`, `>`, `&`, `'` and `+` so that output may be embedded in HTML
    pub escape_html: bool,
    /// Byte written between consecutive top-level values sharing a single writer state
    pub value_separator: u8,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            escape_non_ascii: true,
            escape_html: false,
            value_separator: b'\n',
        }
    }
}

impl WriterOptions {
    pub fn with_non_ascii_escaping(mut self, escape: bool) -> Self {
        self.escape_non_ascii = escape;
        self
    }

    pub fn with_html_escaping(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    /// The separator must be JSON whitespace so that the output stays readable with
    /// [ReaderOptions::allow_multiple_values]
    pub fn with_value_separator(mut self, separator: u8) -> Self {
        debug_assert!(matches!(separator, b' ' | b'\t' | b'\n' | b'\r'));
        self.value_separator = separator;
        self
    }
}

/// Backpressure thresholds for the in-process pipe
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PipeOptions {
    pub pause_writer_threshold: usize,
    pub resume_writer_threshold: usize,
}

impl Default for PipeOptions {
    fn default() -> Self {
        PipeOptions {
            pause_writer_threshold: DEFAULT_PAUSE_WRITER_THRESHOLD,
            resume_writer_threshold: DEFAULT_RESUME_WRITER_THRESHOLD,
        }
    }
}

impl PipeOptions {
    /// Set both thresholds. The resume threshold is clamped so that it never exceeds the pause
    /// threshold.
    pub fn with_thresholds(mut self, pause: usize, resume: usize) -> Self {
        self.pause_writer_threshold = pause;
        self.resume_writer_threshold = resume.min(pause);
        self
    }
}

/// Options for sources wrapping an `AsyncRead`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SourceOptions {
    pub min_read_size: usize,
}

impl Default for SourceOptions {
    fn default() -> Self {
        SourceOptions {
            min_read_size: DEFAULT_MIN_READ_SIZE,
        }
    }
}

impl SourceOptions {
    pub fn with_min_read_size(mut self, size: usize) -> Self {
        self.min_read_size = size.max(1);
        self
    }
}
