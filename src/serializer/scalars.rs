//! Scalar leaf serializers for the non-string primitives
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::errors::JsonResult;
use crate::extractor::{
    read_bool, read_decimal, read_f32, read_f64, read_i32, read_i64, read_u32, read_u64,
};
use crate::serializer::{deserialize_scalar, serialize_scalar, DefaultSerializer, JsonSerializer};
use crate::state::{DecoderState, WriterState};
use crate::transport::{ByteSink, ByteSource};
use crate::writer::{write_bool, write_decimal, write_f32, write_f64, write_integer};

/// Generates a unit serializer struct for a scalar type, given the extractor read used to decode
/// it and an expression encoding `$value` into `$buffer`
macro_rules! scalar_serializer {
    (
        $(#[$meta : meta])*
        $name : ident,
        $t : ty,
        $read : ident,
        |$buffer : ident, $value : ident| $encode : expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Default)]
        pub struct $name;

        impl DefaultSerializer for $t {
            type Serializer = $name;
        }

        impl JsonSerializer<$t> for $name {
            async fn deserialize<S: ByteSource>(
                &self,
                source: &mut S,
                _existing: Option<$t>,
                state: &mut DecoderState,
                cancel: &CancellationToken,
            ) -> JsonResult<$t> {
                deserialize_scalar(source, state, cancel, $read).await
            }

            async fn serialize<W: ByteSink>(
                &self,
                sink: &mut W,
                value: &$t,
                state: &mut WriterState,
                cancel: &CancellationToken,
            ) -> JsonResult<()> {
                serialize_scalar(sink, state, cancel, |$buffer, _| {
                    let $value = value;
                    $encode
                })
                .await
            }
        }
    };
}

scalar_serializer!(BoolSerializer, bool, read_bool, |buffer, value| {
    write_bool(buffer, *value);
    Ok(())
});
scalar_serializer!(I32Serializer, i32, read_i32, |buffer, value| {
    write_integer(buffer, *value);
    Ok(())
});
scalar_serializer!(I64Serializer, i64, read_i64, |buffer, value| {
    write_integer(buffer, *value);
    Ok(())
});
scalar_serializer!(U32Serializer, u32, read_u32, |buffer, value| {
    write_integer(buffer, *value);
    Ok(())
});
scalar_serializer!(U64Serializer, u64, read_u64, |buffer, value| {
    write_integer(buffer, *value);
    Ok(())
});
scalar_serializer!(
    /// Encoding fails for NaN and the infinities
    F32Serializer,
    f32,
    read_f32,
    |buffer, value| write_f32(buffer, *value)
);
scalar_serializer!(
    /// Encoding fails for NaN and the infinities
    F64Serializer,
    f64,
    read_f64,
    |buffer, value| write_f64(buffer, *value)
);
scalar_serializer!(
    /// Decimals are written in plain (non-scientific) notation, but may be read from either
    DecimalSerializer,
    Decimal,
    read_decimal,
    |buffer, value| {
        write_decimal(buffer, value);
        Ok(())
    }
);
