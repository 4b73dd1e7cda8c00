//! An in-process, chunked byte pipe.
//!
//! The writing half pushes chunks which the reading half accumulates into a contiguous window.
//! Bytes stay in the window until the reader retires them. Once the number of unretired bytes
//! reaches the pause threshold, the writer is suspended until the reader has retired enough to
//! fall back to the resume threshold. Completing either half (with or without a fault) is visible
//! to the other half.
use std::collections::VecDeque;
use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::errors::{Details, Error, JsonResult};
use crate::options::PipeOptions;
use crate::transport::{ByteSink, ByteSource, ReadResult};
use crate::transport_error;

/// How one half of the pipe was completed. `Some(fault)` for a faulted completion.
type Completion = Option<Error>;

#[derive(Default)]
struct Shared {
    /// Chunks pushed by the writer, not yet moved into the reader's window
    chunks: VecDeque<Bytes>,
    /// Bytes pushed and not yet retired by the reader
    unretired: usize,
    /// The reader has examined everything it holds and is waiting on more. A paused writer is
    /// let through so that a token larger than the thresholds can still be completed.
    starved: bool,
    writer: Option<Completion>,
    reader: Option<Completion>,
}

struct Pipe {
    shared: Mutex<Shared>,
    /// Signalled when a chunk is pushed or the writer completes
    readable: Notify,
    /// Signalled when bytes are retired or the reader completes
    writable: Notify,
    options: PipeOptions,
}

/// Create a new pipe, returning its writing and reading halves
pub fn pipe(options: PipeOptions) -> (PipeWriter, PipeReader) {
    let pipe = Arc::new(Pipe {
        shared: Mutex::new(Shared::default()),
        readable: Notify::new(),
        writable: Notify::new(),
        options,
    });
    (
        PipeWriter {
            pipe: pipe.clone(),
            completed: false,
        },
        PipeReader {
            pipe,
            buffer: BytesMut::new(),
            examined: 0,
            completed: false,
            fault: None,
        },
    )
}

/// The reading half of a [pipe]. Dropping the reader completes it.
pub struct PipeReader {
    pipe: Arc<Pipe>,
    /// The window: all bytes delivered and not yet retired
    buffer: BytesMut,
    /// Leading bytes of the window already seen by the caller
    examined: usize,
    completed: bool,
    fault: Option<Error>,
}

impl PipeReader {
    /// Move any pushed chunks into the window, returning the writer's completion status
    fn drain(&mut self) -> Option<Completion> {
        let mut shared = self.pipe.shared.lock();
        while let Some(chunk) = shared.chunks.pop_front() {
            self.buffer.extend_from_slice(&chunk);
            shared.starved = false;
        }
        shared.writer.clone()
    }
}

impl ByteSource for PipeReader {
    async fn pull(&mut self, cancel: &CancellationToken) -> JsonResult<ReadResult<'_>> {
        if self.completed {
            return transport_error!(Details::TransportCompleted);
        }
        let is_final = loop {
            match self.drain() {
                Some(Some(fault)) => return Err(fault),
                Some(None) => break true,
                None if self.buffer.len() > self.examined => break false,
                None => {
                    tracing::debug!(buffered = self.buffer.len(), "pipe reader waiting for input");
                    self.pipe.shared.lock().starved = true;
                    self.pipe.writable.notify_one();
                    tokio::select! {
                        _ = cancel.cancelled() => return transport_error!(Details::Cancelled),
                        _ = self.pipe.readable.notified() => (),
                    }
                }
            }
        };
        Ok(ReadResult {
            window: &self.buffer,
            is_final,
        })
    }

    fn try_pull(&mut self) -> Option<ReadResult<'_>> {
        if self.completed {
            return None;
        }
        let is_final = matches!(self.drain(), Some(None));
        Some(ReadResult {
            window: &self.buffer,
            is_final,
        })
    }

    fn retire_examined(&mut self, consumed: usize, examined: usize) {
        let consumed = consumed.min(self.buffer.len());
        self.buffer.advance(consumed);
        self.examined = examined.saturating_sub(consumed).min(self.buffer.len());
        if consumed == 0 {
            return;
        }
        let resume = {
            let mut shared = self.pipe.shared.lock();
            shared.unretired = shared.unretired.saturating_sub(consumed);
            shared.unretired <= self.pipe.options.resume_writer_threshold
        };
        if resume {
            self.pipe.writable.notify_one();
        }
    }

    fn complete(&mut self, fault: Option<Error>) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.buffer.clear();
        self.examined = 0;
        self.fault = fault.clone();
        self.pipe.shared.lock().reader = Some(fault);
        self.pipe.writable.notify_one();
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn fault(&self) -> Option<&Error> {
        self.fault.as_ref()
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        self.complete(None);
    }
}

/// The writing half of a [pipe]. Dropping the writer completes it normally.
pub struct PipeWriter {
    pipe: Arc<Pipe>,
    completed: bool,
}

impl ByteSink for PipeWriter {
    async fn push(&mut self, bytes: &[u8], cancel: &CancellationToken) -> JsonResult<()> {
        if self.completed {
            return transport_error!(Details::TransportCompleted);
        }
        let mut paused = false;
        loop {
            {
                let mut shared = self.pipe.shared.lock();
                match &shared.reader {
                    Some(Some(fault)) => return Err(fault.clone()),
                    Some(None) => return transport_error!(Details::TransportCompleted),
                    None => (),
                }
                let threshold = if paused {
                    self.pipe.options.resume_writer_threshold
                } else {
                    self.pipe.options.pause_writer_threshold.saturating_sub(1)
                };
                if shared.unretired <= threshold || shared.starved {
                    shared.chunks.push_back(Bytes::copy_from_slice(bytes));
                    shared.unretired += bytes.len();
                    shared.starved = false;
                    break;
                }
                if !paused {
                    tracing::debug!(unretired = shared.unretired, "pipe writer paused");
                }
            }
            paused = true;
            tokio::select! {
                _ = cancel.cancelled() => return transport_error!(Details::Cancelled),
                _ = self.pipe.writable.notified() => (),
            }
        }
        self.pipe.readable.notify_one();
        Ok(())
    }

    fn complete(&mut self, fault: Option<Error>) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.pipe.shared.lock().writer = Some(fault);
        self.pipe.readable.notify_one();
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        self.complete(None);
    }
}
