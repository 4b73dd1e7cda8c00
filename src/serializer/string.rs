use tokio_util::sync::CancellationToken;

use crate::errors::JsonResult;
use crate::extractor::read_string;
use crate::serializer::{deserialize_scalar, serialize_scalar, DefaultSerializer, JsonSerializer};
use crate::state::{DecoderState, WriterState};
use crate::transport::{ByteSink, ByteSource};
use crate::writer::write_string;

/// Serializer for JSON strings. Decoding yields the text with every escape sequence translated.
#[derive(Debug, Copy, Clone, Default)]
pub struct StringSerializer;

impl DefaultSerializer for String {
    type Serializer = StringSerializer;
}

impl JsonSerializer<String> for StringSerializer {
    async fn deserialize<S: ByteSource>(
        &self,
        source: &mut S,
        _existing: Option<String>,
        state: &mut DecoderState,
        cancel: &CancellationToken,
    ) -> JsonResult<String> {
        deserialize_scalar(source, state, cancel, read_string).await
    }

    async fn serialize<W: ByteSink>(
        &self,
        sink: &mut W,
        value: &String,
        state: &mut WriterState,
        cancel: &CancellationToken,
    ) -> JsonResult<()> {
        serialize_scalar(sink, state, cancel, |buffer, options| {
            write_string(buffer, value, options);
            Ok(())
        })
        .await
    }
}
