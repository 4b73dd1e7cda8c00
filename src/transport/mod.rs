//! Byte transports. A [ByteSource] delivers input in arbitrarily sized chunks as it arrives, and
//! keeps every byte that hasn't been explicitly retired. A [ByteSink] accepts encoded output,
//! suspending when the consumer on the other side applies backpressure.
//!
//! Three families of transport are provided:
//! - [pipe]: an in-process pipe, the writing half of which may be driven from another task
//! - [io]: adapters over tokio's `AsyncRead` and `AsyncWrite`, for sockets and files
//! - [slice]: a fully buffered source over a byte slice, plus `Vec<u8>` as a sink
use tokio_util::sync::CancellationToken;

use crate::errors::{Error, JsonResult};

pub mod io;
pub mod pipe;
pub mod slice;

/// A view over the unretired bytes currently held by a [ByteSource]
#[derive(Debug, Copy, Clone)]
pub struct ReadResult<'a> {
    /// Every byte delivered but not yet retired, in order
    pub window: &'a [u8],
    /// True once no further bytes will ever be appended to the window
    pub is_final: bool,
}

/// The read capability of a transport.
///
/// Offsets passed to the `retire` methods are relative to the start of the window most recently
/// returned by [ByteSource::pull] or [ByteSource::try_pull].
#[allow(async_fn_in_trait)]
pub trait ByteSource {
    /// Return the current window. Suspends only while every buffered byte has already been
    /// examined and the input isn't yet finished. Cancellation is observed only whilst suspended,
    /// and leaves the buffered bytes untouched.
    async fn pull(&mut self, cancel: &CancellationToken) -> JsonResult<ReadResult<'_>>;

    /// Re-request the current window without suspending. Returns `None` once the source has been
    /// completed.
    fn try_pull(&mut self) -> Option<ReadResult<'_>>;

    /// Discard the first `consumed` bytes of the window, and mark everything up to `examined` as
    /// seen so that the next [ByteSource::pull] waits for fresh input
    fn retire_examined(&mut self, consumed: usize, examined: usize);

    /// Discard the first `consumed` bytes of the window. Retiring zero bytes is a no-op.
    fn retire(&mut self, consumed: usize) {
        self.retire_examined(consumed, consumed)
    }

    /// Close the source, optionally recording the fault that ended the stream
    fn complete(&mut self, fault: Option<Error>);

    fn is_completed(&self) -> bool;

    /// The fault the source was completed with, if any
    fn fault(&self) -> Option<&Error>;
}

/// The write capability of a transport
#[allow(async_fn_in_trait)]
pub trait ByteSink {
    /// Hand over a run of encoded bytes, suspending until the sink is able to accept them
    async fn push(&mut self, bytes: &[u8], cancel: &CancellationToken) -> JsonResult<()>;

    /// Signal that no more output will follow, optionally propagating a fault
    fn complete(&mut self, fault: Option<Error>);
}
