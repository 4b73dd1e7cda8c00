//! The token advancement loop.
//!
//! Advancing is a probe: it pulls from a [ByteSource] until the lexer can determine the next
//! token, and records that token's descriptor within the [DecoderState]. No bytes belonging to the
//! token are ever retired here. That is left to the extractor, which must be invoked next.
//!
//! The phase transitions are kept apart from any I/O in [next_phase], so that they can be reasoned
//! about (and tested) over plain byte windows.
use tokio_util::sync::CancellationToken;

use crate::advancer_error;
use crate::errors::{Details, Error, JsonResult};
use crate::lexer::{try_next_token, LexOutcome};
use crate::state::DecoderState;
use crate::token::{TokenDescriptor, TokenKind};
use crate::transport::ByteSource;

/// The phase of the token state machine held within a [DecoderState]
#[derive(Debug, Clone)]
pub enum Phase {
    /// Searching for the next token
    Scanning,
    /// A token has been recognized and awaits extraction
    TokenReady(TokenDescriptor),
    /// The input is exhausted. Terminal.
    EndOfDocument,
    /// The stream was abandoned. Terminal.
    Faulted(Error),
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::EndOfDocument | Phase::Faulted(_))
    }
}

/// Compute the phase reached by examining a window. [Phase::Scanning] means the window doesn't yet
/// hold enough bytes to decide.
pub fn next_phase(window: &[u8], is_final: bool, state: &DecoderState) -> Phase {
    match try_next_token(window, is_final, state) {
        LexOutcome::Recognized(descriptor) => Phase::TokenReady(descriptor),
        LexOutcome::NeedMoreBytes if is_final => Phase::EndOfDocument,
        LexOutcome::NeedMoreBytes => Phase::Scanning,
        LexOutcome::Malformed(err) => Phase::Faulted(err),
    }
}

/// Suspend until the next token is available, returning its kind. Returns
/// [TokenKind::EndOfDocument] (repeatedly, and without touching the source) once the input has been
/// exhausted.
///
/// Malformed input and transport faults are terminal: the source is completed with the fault, and
/// every subsequent call reports the same error. Cancellation is not terminal, and leaves both the
/// source and the state as they were before the call.
pub async fn advance_to_next_token<S: ByteSource>(
    source: &mut S,
    state: &mut DecoderState,
    cancel: &CancellationToken,
) -> JsonResult<TokenKind> {
    match &state.phase {
        Phase::EndOfDocument => return Ok(TokenKind::EndOfDocument),
        Phase::Faulted(err) => return Err(err.clone()),
        Phase::TokenReady(descriptor) => return Ok(descriptor.kind),
        Phase::Scanning => (),
    }
    loop {
        let pulled = source
            .pull(cancel)
            .await
            .map(|read| (read.window.len(), next_phase(read.window, read.is_final, state)));
        let (examined, phase) = match pulled {
            Ok(pulled) => pulled,
            Err(err) if err.invalidates_stream() => {
                return Err(fault(source, state, err));
            }
            Err(err) if err.is_cancelled() => {
                tracing::debug!(coords = %state.coords, "advance cancelled");
                return advancer_error!(Details::Cancelled, state.coords);
            }
            Err(err) => return Err(err),
        };
        match phase {
            Phase::TokenReady(descriptor) => {
                tracing::trace!(
                    kind = %descriptor.kind,
                    start = descriptor.start,
                    end = descriptor.end,
                    depth = state.depth(),
                    "token ready"
                );
                state.phase = Phase::TokenReady(descriptor);
                return Ok(descriptor.kind);
            }
            Phase::Scanning => {
                tracing::debug!(buffered = examined, "suspending for more input");
                source.retire_examined(0, examined);
            }
            Phase::EndOfDocument => {
                tracing::debug!(coords = %state.coords, "end of document");
                source.retire_examined(0, examined);
                source.complete(None);
                state.phase = Phase::EndOfDocument;
                return Ok(TokenKind::EndOfDocument);
            }
            Phase::Faulted(err) => return Err(fault(source, state, err)),
        }
    }
}

/// Record a stream-invalidating error: the source is completed with it so that the other side of
/// the transport observes the same cause
fn fault<S: ByteSource>(source: &mut S, state: &mut DecoderState, err: Error) -> Error {
    tracing::warn!(error = %err, "decoding faulted");
    source.complete(Some(err.clone()));
    state.phase = Phase::Faulted(err.clone());
    err
}
