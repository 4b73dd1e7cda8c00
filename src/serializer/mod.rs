//! Value serializers. A [JsonSerializer] is a strategy value which knows how to decode and encode
//! one type. Two families are currently implemented:
//! - [string::StringSerializer] for JSON string values
//! - the scalar leaves within [scalars], covering booleans, the integral types, floats and decimals
use tokio_util::sync::CancellationToken;

use crate::advancer::advance_to_next_token;
use crate::errors::{Details, JsonResult};
use crate::extractor_error;
use crate::options::WriterOptions;
use crate::state::{DecoderState, WriterState};
use crate::token::TokenKind;
use crate::transport::{ByteSink, ByteSource};

pub mod scalars;
pub mod string;

/// Decoding and encoding of a single value type over the byte transports
#[allow(async_fn_in_trait)]
pub trait JsonSerializer<V> {
    /// Decode the next value from `source`. `existing` allows a mutable composite target to be
    /// populated in place, and is ignored by scalar leaves.
    async fn deserialize<S: ByteSource>(
        &self,
        source: &mut S,
        existing: Option<V>,
        state: &mut DecoderState,
        cancel: &CancellationToken,
    ) -> JsonResult<V>;

    /// Encode exactly one value into `sink`, honouring the separator rules held by `state`
    async fn serialize<W: ByteSink>(
        &self,
        sink: &mut W,
        value: &V,
        state: &mut WriterState,
        cancel: &CancellationToken,
    ) -> JsonResult<()>;
}

/// Types with a default [JsonSerializer] strategy
pub trait DefaultSerializer: Sized {
    type Serializer: JsonSerializer<Self> + Default;
}

/// Create the default serializer for `T`
pub fn serializer_for<T: DefaultSerializer>() -> T::Serializer {
    T::Serializer::default()
}

/// Decode a scalar: one advance, followed by one read
pub async fn deserialize_scalar<S, V, F>(
    source: &mut S,
    state: &mut DecoderState,
    cancel: &CancellationToken,
    read: F,
) -> JsonResult<V>
where
    S: ByteSource,
    F: FnOnce(&mut S, &mut DecoderState) -> JsonResult<V>,
{
    match advance_to_next_token(source, state, cancel).await? {
        TokenKind::EndOfDocument => extractor_error!(
            Details::UnexpectedToken(TokenKind::EndOfDocument),
            state.coords()
        ),
        _ => read(source, state),
    }
}

/// Encode a scalar into a single push. Pushing is the only point at which encoding suspends. A
/// stream-invalidating failure completes the sink with the same fault.
pub async fn serialize_scalar<W, F>(
    sink: &mut W,
    state: &mut WriterState,
    cancel: &CancellationToken,
    encode: F,
) -> JsonResult<()>
where
    W: ByteSink,
    F: FnOnce(&mut Vec<u8>, &WriterOptions) -> JsonResult<()>,
{
    let mut buffer = vec![];
    if let Some(separator) = state.separator() {
        buffer.push(separator);
    }
    encode(&mut buffer, state.options())?;
    match sink.push(&buffer, cancel).await {
        Ok(()) => {
            state.value_written();
            tracing::trace!(bytes = buffer.len(), values = state.values_written(), "value written");
            Ok(())
        }
        Err(err) => {
            if err.invalidates_stream() {
                tracing::warn!(error = %err, "encoding faulted");
                sink.complete(Some(err.clone()));
            }
            Err(err)
        }
    }
}
