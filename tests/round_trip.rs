mod common;

use std::str::FromStr;

use chisel_json_pipes::options::{PipeOptions, ReaderOptions};
use chisel_json_pipes::serializer::scalars::*;
use chisel_json_pipes::serializer::string::StringSerializer;
use chisel_json_pipes::transport::pipe::pipe;
use chisel_json_pipes::transport::ByteSink;
use chisel_json_pipes::{
    serializer_for, DecoderState, DefaultSerializer, JsonSerializer, WriterState,
};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

/// Serialize a value into a byte vector, then decode it again from a slice
async fn round_trip<V, S: JsonSerializer<V>>(serializer: S, value: &V) -> V {
    let cancel = CancellationToken::new();
    let mut sink: Vec<u8> = vec![];
    serializer
        .serialize(&mut sink, value, &mut WriterState::default(), &cancel)
        .await
        .unwrap();
    let mut source = chisel_json_pipes::transport::slice::SliceSource::new(&sink);
    serializer
        .deserialize(&mut source, None, &mut DecoderState::default(), &cancel)
        .await
        .unwrap()
}

#[tokio::test]
async fn should_round_trip_every_scalar_kind() {
    for value in [true, false] {
        assert_eq!(round_trip(BoolSerializer, &value).await, value);
    }
    for value in [0, 1, -1, i32::MIN, i32::MAX] {
        assert_eq!(round_trip(I32Serializer, &value).await, value);
    }
    for value in [0, i64::MIN, i64::MAX] {
        assert_eq!(round_trip(I64Serializer, &value).await, value);
    }
    for value in [0, u32::MAX] {
        assert_eq!(round_trip(U32Serializer, &value).await, value);
    }
    for value in [0, u64::MAX] {
        assert_eq!(round_trip(U64Serializer, &value).await, value);
    }
    for value in [0.0, -0.5, 1.1, f32::MAX, f32::MIN_POSITIVE] {
        assert_eq!(round_trip(F32Serializer, &value).await, value);
    }
    for value in [0.0, 0.1, -2.5e-300, f64::MAX, f64::MIN_POSITIVE] {
        assert_eq!(round_trip(F64Serializer, &value).await, value);
    }
    for text in ["0", "-1.5", "79228162514264337593543950335", "0.0000000001"] {
        let value = Decimal::from_str(text).unwrap();
        assert_eq!(round_trip(DecimalSerializer, &value).await, value);
    }
    let texts = [
        "",
        "plain",
        "tab\tnew\nline",
        "quote \" slash \\",
        "\u{0}\u{1f}",
        "日本語 😀",
    ];
    for text in texts {
        let value = text.to_string();
        assert_eq!(round_trip(StringSerializer, &value).await, value);
    }
}

#[tokio::test]
async fn should_stream_values_between_tasks() {
    let values: Vec<String> = (0..500)
        .map(|i| format!("value {} → {}", i, "x".repeat(i % 37)))
        .collect();
    let (mut writer, mut reader) = pipe(PipeOptions::default().with_thresholds(256, 64));

    let expected = values.clone();
    let producer = tokio::spawn(async move {
        let cancel = CancellationToken::new();
        let mut state = WriterState::default();
        for value in &values {
            StringSerializer
                .serialize(&mut writer, value, &mut state, &cancel)
                .await
                .unwrap();
        }
        writer.complete(None);
        state.values_written()
    });

    let cancel = CancellationToken::new();
    let mut state = DecoderState::new(ReaderOptions::default().with_multiple_values(true));
    let mut decoded = vec![];
    for _ in 0..expected.len() {
        decoded.push(
            StringSerializer
                .deserialize(&mut reader, None, &mut state, &cancel)
                .await
                .unwrap(),
        );
    }
    assert_eq!(producer.await.unwrap(), expected.len());
    assert_eq!(decoded, expected);
}

/// Round trip through the default serializer for the value's type
async fn round_trip_default<V: DefaultSerializer>(value: &V) -> V {
    round_trip(serializer_for::<V>(), value).await
}

#[tokio::test]
async fn should_round_trip_through_default_serializers() {
    assert_eq!(round_trip_default(&String::from("défaut")).await, "défaut");
    assert_eq!(round_trip_default(&-12i64).await, -12);
    assert_eq!(round_trip_default(&7u32).await, 7);
    assert!(round_trip_default(&true).await);
    assert_eq!(round_trip_default(&0.75f64).await, 0.75);
    let value = Decimal::from_str("3.141").unwrap();
    assert_eq!(round_trip_default(&value).await, value);
}
