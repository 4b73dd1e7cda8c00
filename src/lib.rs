//! Incremental decoding and encoding of JSON values over chunked, asynchronous byte transports.
//!
//! Decoding is split into two steps. [advancer::advance_to_next_token] waits only as long as is
//! needed for the next token to be recognized, without consuming anything. One of the typed reads
//! within [extractor] then decodes that token and retires exactly its bytes from the transport.
//! Decoding progress lives in a caller-held [state::DecoderState], so that an operation can be
//! suspended (or cancelled) at any chunk boundary and picked up again later.
//!
//! Encoding goes through the same [serializer::JsonSerializer] strategies, writing into any
//! [transport::ByteSink].
pub mod advancer;
pub mod coords;
pub mod decoders;
pub mod errors;
pub mod extractor;
pub mod lexer;
pub mod options;
pub mod serializer;
pub mod state;
pub mod token;
pub mod transport;
pub mod writer;
#[cfg(test)]
mod test_macros;

pub use advancer::advance_to_next_token;
pub use errors::{Error, JsonResult};
pub use serializer::{serializer_for, DefaultSerializer, JsonSerializer};
pub use state::{DecoderState, WriterState};
pub use token::TokenKind;
