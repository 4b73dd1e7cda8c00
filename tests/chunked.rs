mod common;

use chisel_json_pipes::options::{ReaderOptions, WriterOptions};
use chisel_json_pipes::serializer::scalars::{F64Serializer, I64Serializer};
use chisel_json_pipes::serializer::string::StringSerializer;
use chisel_json_pipes::{DecoderState, JsonSerializer, TokenKind, WriterState};
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::common::{feed, runtime, split_at_offsets};

#[tokio::test]
async fn should_decode_a_string_delivered_in_two_chunks() {
    let cancel = CancellationToken::new();
    let mut reader = feed(
        vec![b"\"hel".to_vec(), b"lo\"".to_vec()],
        Default::default(),
    );
    let mut state = DecoderState::default();
    let value = StringSerializer
        .deserialize(&mut reader, None, &mut state, &cancel)
        .await
        .unwrap();
    assert_eq!(value, "hello");
    assert_eq!(
        chisel_json_pipes::advance_to_next_token(&mut reader, &mut state, &cancel)
            .await
            .unwrap(),
        TokenKind::EndOfDocument
    );
}

#[tokio::test]
async fn should_decode_a_string_delivered_byte_by_byte() {
    let cancel = CancellationToken::new();
    let json = r#"  "café 😀 \"quoted\" \\ end"  "#;
    let chunks = json.bytes().map(|b| vec![b]).collect();
    let mut reader = feed(chunks, Default::default());
    let mut state = DecoderState::default();
    let value = StringSerializer
        .deserialize(&mut reader, None, &mut state, &cancel)
        .await
        .unwrap();
    assert_eq!(value, "café 😀 \"quoted\" \\ end");
    assert_eq!(state.bytes_consumed(), json.trim_end().len());
}

async fn decode_string(chunks: Vec<Vec<u8>>) -> String {
    let cancel = CancellationToken::new();
    let mut reader = feed(chunks, Default::default());
    let mut state = DecoderState::default();
    StringSerializer
        .deserialize(&mut reader, None, &mut state, &cancel)
        .await
        .unwrap()
}

proptest! {
    #[test]
    fn should_decode_strings_identically_under_any_chunking(
        value in "\\PC{0,40}",
        escape_non_ascii in any::<bool>(),
        offsets in prop::collection::vec(any::<usize>(), 0..6),
    ) {
        let rt = runtime();
        let encoded = rt.block_on(async {
            let mut sink: Vec<u8> = vec![];
            let options = WriterOptions::default().with_non_ascii_escaping(escape_non_ascii);
            let mut state = WriterState::new(options);
            StringSerializer
                .serialize(&mut sink, &value, &mut state, &CancellationToken::new())
                .await
                .unwrap();
            sink
        });
        let whole = rt.block_on(decode_string(vec![encoded.clone()]));
        let chunked = rt.block_on(decode_string(split_at_offsets(&encoded, &offsets)));
        prop_assert_eq!(&whole, &value);
        prop_assert_eq!(&chunked, &value);
    }

    #[test]
    fn should_decode_number_sequences_under_any_chunking(
        values in prop::collection::vec(any::<i64>(), 1..8),
        offsets in prop::collection::vec(any::<usize>(), 0..10),
    ) {
        let rt = runtime();
        let text = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
        let decoded = rt.block_on(async {
            let cancel = CancellationToken::new();
            let mut reader = feed(split_at_offsets(text.as_bytes(), &offsets), Default::default());
            let mut state = DecoderState::new(ReaderOptions::default().with_multiple_values(true));
            let mut decoded = vec![];
            for _ in 0..values.len() {
                decoded.push(
                    I64Serializer
                        .deserialize(&mut reader, None, &mut state, &cancel)
                        .await
                        .unwrap(),
                );
            }
            decoded
        });
        prop_assert_eq!(decoded, values);
    }

    #[test]
    fn should_decode_floats_under_any_chunking(
        value in any::<f64>().prop_filter("finite", |v| v.is_finite()),
        offsets in prop::collection::vec(any::<usize>(), 0..4),
    ) {
        let rt = runtime();
        let decoded = rt.block_on(async {
            let cancel = CancellationToken::new();
            let mut sink: Vec<u8> = vec![];
            F64Serializer
                .serialize(&mut sink, &value, &mut WriterState::default(), &cancel)
                .await
                .unwrap();
            let mut reader = feed(split_at_offsets(&sink, &offsets), Default::default());
            F64Serializer
                .deserialize(&mut reader, None, &mut DecoderState::default(), &cancel)
                .await
                .unwrap()
        });
        prop_assert_eq!(decoded, value);
    }
}
