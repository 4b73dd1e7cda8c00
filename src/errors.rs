//! General error types for the token pipeline

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::coords::Coords;
use crate::token::TokenKind;

/// Global result type used throughout the decoding and encoding stages
pub type JsonResult<T> = Result<T, Error>;

/// Enumeration of the various different stages that can produce an error
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Stage {
    /// Token recognition over a byte window
    Lexer,
    /// The token advancement loop
    Advancer,
    /// Typed value extraction
    Extractor,
    /// Value encoding
    Writer,
    /// The underlying byte transport
    Transport,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Lexer => write!(f, "lexer"),
            Stage::Advancer => write!(f, "advancer"),
            Stage::Extractor => write!(f, "extractor"),
            Stage::Writer => write!(f, "writer"),
            Stage::Transport => write!(f, "transport"),
        }
    }
}

/// A global enumeration of error codes
#[derive(Debug, Clone)]
pub enum Details {
    /// Input finished part way through a token or an open container
    UnexpectedEndOfInput,
    /// A string literal was never closed
    UnterminatedString,
    /// A byte which cannot start or continue a token at this point
    InvalidCharacter(u8),
    /// A raw control character inside a string literal
    ControlCharacterInString(u8),
    /// Literal token (true, false, null) that doesn't match
    InvalidLiteral(String),
    InvalidNumericRepresentation(String),
    InvalidEscapeSequence(String),
    InvalidUnicodeEscapeSequence(String),
    NonUtf8InputDetected,
    NonAsciiInputDetected,
    /// Non-whitespace found after a complete top-level value
    TrailingData,
    MaxDepthExceeded(usize),
    /// The extractor was invoked without an immediately preceding successful advance
    UsageOrdering,
    /// A typed read was attempted against a token of the wrong kind
    UnexpectedToken(TokenKind),
    /// A numeric token that cannot be represented by the requested type
    NumberOutOfRange(String),
    /// NaN and the infinities have no JSON representation
    NonFiniteNumber,
    /// The operation was aborted at a suspension point
    Cancelled,
    /// The transport has already been completed
    TransportCompleted,
    /// A fault supplied by the other side of a transport
    TransportFault(String),
    /// An I/O failure underneath a transport
    Io(Arc<std::io::Error>),
}

impl Display for Details {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Details::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            Details::UnterminatedString => write!(f, "unterminated string literal"),
            Details::InvalidCharacter(b) => write!(f, "invalid character found: 0x{:02x}", b),
            Details::ControlCharacterInString(b) => {
                write!(f, "control character 0x{:02x} found within string", b)
            }
            Details::InvalidLiteral(s) => write!(f, "invalid literal: '{}'", s),
            Details::InvalidNumericRepresentation(s) => {
                write!(f, "invalid numeric representation: '{}'", s)
            }
            Details::InvalidEscapeSequence(s) => write!(f, "invalid escape sequence: '{}'", s),
            Details::InvalidUnicodeEscapeSequence(s) => {
                write!(f, "invalid unicode escape sequence: '{}'", s)
            }
            Details::NonUtf8InputDetected => write!(f, "non utf-8 input detected"),
            Details::NonAsciiInputDetected => write!(f, "non ascii input detected"),
            Details::TrailingData => write!(f, "trailing data after top-level value"),
            Details::MaxDepthExceeded(d) => write!(f, "maximum nesting depth of {} exceeded", d),
            Details::UsageOrdering => write!(
                f,
                "a value read must immediately follow a successful token advance"
            ),
            Details::UnexpectedToken(kind) => write!(f, "unexpected token: {}", kind),
            Details::NumberOutOfRange(s) => {
                write!(f, "numeric value '{}' out of range for target type", s)
            }
            Details::NonFiniteNumber => write!(f, "non-finite numbers can't be encoded"),
            Details::Cancelled => write!(f, "operation cancelled"),
            Details::TransportCompleted => write!(f, "transport already completed"),
            Details::TransportFault(s) => write!(f, "transport fault: {}", s),
            Details::Io(err) => write!(f, "i/o failure: {}", err),
        }
    }
}

/// The general error structure
#[derive(Debug, Clone)]
pub struct Error {
    /// The originating stage for the error
    pub stage: Stage,
    /// The global error code for the error
    pub details: Details,
    /// Optional stream coordinates
    pub coords: Option<Coords>,
}

impl Error {
    /// True if the error is a decoding failure caused by the bytes themselves
    pub fn is_malformed(&self) -> bool {
        self.stage == Stage::Lexer
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.details, Details::Cancelled)
    }

    pub fn is_usage_error(&self) -> bool {
        matches!(self.details, Details::UsageOrdering)
    }

    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self.details,
            Details::TransportFault(_) | Details::Io(_) | Details::TransportCompleted
        )
    }

    /// Whether the error leaves the stream unusable. Stream-invalidating errors are always
    /// forwarded into the transport's completion so that every observer sees the same cause.
    pub fn invalidates_stream(&self) -> bool {
        self.is_malformed()
            || matches!(self.details, Details::TransportFault(_) | Details::Io(_))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.coords {
            Some(coords) => write!(f, "{} error at {}: {}", self.stage, coords, self.details),
            None => write!(f, "{} error: {}", self.stage, self.details),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.details {
            Details::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            stage: Stage::Transport,
            details: Details::Io(Arc::new(err)),
            coords: None,
        }
    }
}

#[macro_export]
macro_rules! lexer_error {
    ($details: expr, $coords : expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Lexer,
            details: $details,
            coords: Some($coords),
        })
    };
}

#[macro_export]
macro_rules! extractor_error {
    ($details: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Extractor,
            details: $details,
            coords: None,
        })
    };
    ($details: expr, $coords: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Extractor,
            details: $details,
            coords: Some($coords),
        })
    };
}

#[macro_export]
macro_rules! advancer_error {
    ($details: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Advancer,
            details: $details,
            coords: None,
        })
    };
    ($details: expr, $coords: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Advancer,
            details: $details,
            coords: Some($coords),
        })
    };
}

#[macro_export]
macro_rules! writer_error {
    ($details: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Writer,
            details: $details,
            coords: None,
        })
    };
}

#[macro_export]
macro_rules! transport_error {
    ($details: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Transport,
            details: $details,
            coords: None,
        })
    };
}
