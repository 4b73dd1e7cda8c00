//! Typed value extraction.
//!
//! Every read must immediately follow a successful [crate::advancer::advance_to_next_token]. The
//! extractor re-requests the (unchanged) window, re-recognizes the token recorded by the advancer,
//! decodes it and then retires the source to exactly the end of that token.
//!
//! A decode failure (a token of the wrong kind, or a checked numeric read of an out of range value)
//! retires nothing, so the token may be read again as a different type. The `try_read_*` variants
//! report an unrepresentable value as `Ok(None)`, and do retire the token.
use std::borrow::Cow;

use rust_decimal::Decimal;

use crate::advancer::Phase;
use crate::errors::{Details, JsonResult};
use crate::extractor_error;
use crate::lexer::{try_next_token, LexOutcome};
use crate::state::DecoderState;
use crate::token::{Token, TokenKind};
use crate::transport::ByteSource;

/// Decode the token most recently recognized by the advancer using `decode`, then retire it
pub fn read_value<S, V, F>(source: &mut S, state: &mut DecoderState, decode: F) -> JsonResult<V>
where
    S: ByteSource,
    F: for<'t> FnOnce(&Token<'t>) -> JsonResult<V>,
{
    let descriptor = match state.phase {
        Phase::TokenReady(descriptor) => descriptor,
        _ => return extractor_error!(Details::UsageOrdering, state.coords),
    };
    let value = {
        let read = match source.try_pull() {
            Some(read) => read,
            None => return extractor_error!(Details::UsageOrdering, state.coords),
        };
        match try_next_token(read.window, read.is_final, state) {
            LexOutcome::Recognized(recognized) if recognized == descriptor => (),
            _ => return extractor_error!(Details::UsageOrdering, state.coords),
        }
        let token = Token::new(
            descriptor.kind,
            &read.window[descriptor.start..descriptor.end],
            state.coords.advance(&read.window[..descriptor.start]),
        );
        let value = decode(&token)?;
        state.commit(&descriptor, &read.window[..descriptor.end]);
        value
    };
    source.retire(descriptor.end);
    tracing::trace!(
        kind = %descriptor.kind,
        retired = descriptor.end,
        coords = %state.coords,
        "token retired"
    );
    Ok(value)
}

/// Retire the token most recently recognized by the advancer without decoding it, returning its
/// kind. This is the building block for stepping over structural tokens.
pub fn skip_token<S: ByteSource>(
    source: &mut S,
    state: &mut DecoderState,
) -> JsonResult<TokenKind> {
    read_value(source, state, |token| Ok(token.kind()))
}

/// Decode a string (or property name) token into owned text
pub fn read_string<S: ByteSource>(source: &mut S, state: &mut DecoderState) -> JsonResult<String> {
    read_value(source, state, |token| token.get_str().map(Cow::into_owned))
}

pub fn read_bool<S: ByteSource>(source: &mut S, state: &mut DecoderState) -> JsonResult<bool> {
    read_value(source, state, |token| token.get_bool())
}

/// Generates a checked read together with its `try_` counterpart
macro_rules! numeric_reads {
    ($name : ident, $try_name : ident, $getter : ident, $try_getter : ident, $t : ty) => {
        /// Fails with [Details::NumberOutOfRange] (without retiring the token) if the literal
        /// can't be represented
        pub fn $name<S: ByteSource>(source: &mut S, state: &mut DecoderState) -> JsonResult<$t> {
            read_value(source, state, |token| token.$getter())
        }

        /// Returns `Ok(None)` if the literal can't be represented
        pub fn $try_name<S: ByteSource>(
            source: &mut S,
            state: &mut DecoderState,
        ) -> JsonResult<Option<$t>> {
            read_value(source, state, |token| token.$try_getter())
        }
    };
}

numeric_reads!(read_i32, try_read_i32, get_i32, try_get_i32, i32);
numeric_reads!(read_i64, try_read_i64, get_i64, try_get_i64, i64);
numeric_reads!(read_u32, try_read_u32, get_u32, try_get_u32, u32);
numeric_reads!(read_u64, try_read_u64, get_u64, try_get_u64, u64);
numeric_reads!(read_f32, try_read_f32, get_f32, try_get_f32, f32);
numeric_reads!(read_f64, try_read_f64, get_f64, try_get_f64, f64);
numeric_reads!(
    read_decimal,
    try_read_decimal,
    get_decimal,
    try_get_decimal,
    Decimal
);

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use tokio_util::sync::CancellationToken;

    use crate::advancer::advance_to_next_token;
    use crate::errors::Details;
    use crate::extractor::*;
    use crate::source_from_str;
    use crate::state::DecoderState;
    use crate::token::TokenKind;

    #[tokio::test]
    async fn should_retire_exactly_one_token() {
        let cancel = CancellationToken::new();
        let mut source = source_from_str!(" [ 1 , \"two\" ] ");
        let mut state = DecoderState::default();

        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert_eq!(skip_token(&mut source, &mut state).unwrap(), TokenKind::StartArray);
        assert_eq!(source.remaining(), b" 1 , \"two\" ] ");

        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert_eq!(read_i32(&mut source, &mut state).unwrap(), 1);
        assert_eq!(source.remaining(), b" , \"two\" ] ");

        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert_eq!(read_string(&mut source, &mut state).unwrap(), "two");
        assert_eq!(source.remaining(), b" ] ");
        assert_eq!(state.bytes_consumed(), 12);
    }

    #[tokio::test]
    async fn should_reject_reads_without_a_preceding_advance() {
        let cancel = CancellationToken::new();
        let mut source = source_from_str!("true false");
        let mut state = DecoderState::default();

        let err = read_bool(&mut source, &mut state).unwrap_err();
        assert!(err.is_usage_error());
        assert_eq!(source.remaining(), b"true false");
        assert_eq!(state.bytes_consumed(), 0);

        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert!(read_bool(&mut source, &mut state).unwrap());
        let err = read_bool(&mut source, &mut state).unwrap_err();
        assert!(matches!(err.details, Details::UsageOrdering));
        assert_eq!(state.bytes_consumed(), 4);
    }

    #[tokio::test]
    async fn should_keep_the_token_when_decoding_fails() {
        let cancel = CancellationToken::new();
        let mut source = source_from_str!("4294967296");
        let mut state = DecoderState::default();

        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        let err = read_u32(&mut source, &mut state).unwrap_err();
        assert!(matches!(err.details, Details::NumberOutOfRange(_)));
        let err = read_string(&mut source, &mut state).unwrap_err();
        assert!(matches!(err.details, Details::UnexpectedToken(TokenKind::Number)));
        assert_eq!(read_u64(&mut source, &mut state).unwrap(), 4294967296);
        assert!(source.remaining().is_empty());
    }

    #[tokio::test]
    async fn should_report_out_of_range_values_through_try_reads() {
        let cancel = CancellationToken::new();
        let mut source = source_from_str!("[-1, 1e400, 3000000000, 1.25e2]");
        let mut state = DecoderState::default();
        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        skip_token(&mut source, &mut state).unwrap();

        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert_eq!(try_read_u64(&mut source, &mut state).unwrap(), None);
        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert_eq!(try_read_f64(&mut source, &mut state).unwrap(), None);
        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert_eq!(try_read_i32(&mut source, &mut state).unwrap(), None);
        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert_eq!(
            try_read_decimal(&mut source, &mut state).unwrap(),
            Some(Decimal::from_str("125").unwrap())
        );
        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert_eq!(skip_token(&mut source, &mut state).unwrap(), TokenKind::EndArray);
        assert_eq!(
            advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap(),
            TokenKind::EndOfDocument
        );
    }

    #[tokio::test]
    async fn should_decode_escaped_property_names() {
        let cancel = CancellationToken::new();
        let mut source = source_from_str!(r#"{"café": 2.5}"#);
        let mut state = DecoderState::default();
        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        skip_token(&mut source, &mut state).unwrap();
        assert_eq!(
            advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap(),
            TokenKind::PropertyName
        );
        assert_eq!(read_string(&mut source, &mut state).unwrap(), "café");
        advance_to_next_token(&mut source, &mut state, &cancel).await.unwrap();
        assert_eq!(read_f32(&mut source, &mut state).unwrap(), 2.5);
    }
}
