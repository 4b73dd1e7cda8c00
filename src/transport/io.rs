//! Adapters between the transport traits and tokio's `AsyncRead`/`AsyncWrite`
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::errors::{Details, Error, JsonResult};
use crate::options::SourceOptions;
use crate::transport::{ByteSink, ByteSource, ReadResult};
use crate::transport_error;

/// A [ByteSource] which reads from an underlying `AsyncRead`, growing its window with each read
pub struct ReaderSource<R> {
    reader: R,
    buffer: BytesMut,
    examined: usize,
    eof: bool,
    completed: bool,
    fault: Option<Error>,
    options: SourceOptions,
}

impl<R: AsyncRead + Unpin> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, SourceOptions::default())
    }

    pub fn with_options(reader: R, options: SourceOptions) -> Self {
        ReaderSource {
            reader,
            buffer: BytesMut::with_capacity(options.min_read_size),
            examined: 0,
            eof: false,
            completed: false,
            fault: None,
            options,
        }
    }

    /// Release the underlying reader. Any unretired bytes are discarded.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: AsyncRead + Unpin> ByteSource for ReaderSource<R> {
    async fn pull(&mut self, cancel: &CancellationToken) -> JsonResult<ReadResult<'_>> {
        if self.completed {
            return transport_error!(Details::TransportCompleted);
        }
        while !self.eof && self.buffer.len() <= self.examined {
            self.buffer.reserve(self.options.min_read_size);
            let read = tokio::select! {
                _ = cancel.cancelled() => return transport_error!(Details::Cancelled),
                read = self.reader.read_buf(&mut self.buffer) => read?,
            };
            if read == 0 {
                tracing::debug!(buffered = self.buffer.len(), "end of underlying reader");
                self.eof = true;
            }
        }
        Ok(ReadResult {
            window: &self.buffer,
            is_final: self.eof,
        })
    }

    fn try_pull(&mut self) -> Option<ReadResult<'_>> {
        if self.completed {
            return None;
        }
        Some(ReadResult {
            window: &self.buffer,
            is_final: self.eof,
        })
    }

    fn retire_examined(&mut self, consumed: usize, examined: usize) {
        let consumed = consumed.min(self.buffer.len());
        self.buffer.advance(consumed);
        self.examined = examined.saturating_sub(consumed).min(self.buffer.len());
    }

    fn complete(&mut self, fault: Option<Error>) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.buffer.clear();
        self.examined = 0;
        self.fault = fault;
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn fault(&self) -> Option<&Error> {
        self.fault.as_ref()
    }
}

/// A [ByteSink] which writes (and flushes) each pushed run of bytes to an underlying `AsyncWrite`
pub struct WriterSink<W> {
    writer: W,
    completed: bool,
    fault: Option<Error>,
}

impl<W: AsyncWrite + Unpin> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer,
            completed: false,
            fault: None,
        }
    }

    /// The fault the sink was completed with, if any
    pub fn fault(&self) -> Option<&Error> {
        self.fault.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: AsyncWrite + Unpin> ByteSink for WriterSink<W> {
    async fn push(&mut self, bytes: &[u8], cancel: &CancellationToken) -> JsonResult<()> {
        if self.completed {
            return transport_error!(Details::TransportCompleted);
        }
        tokio::select! {
            _ = cancel.cancelled() => transport_error!(Details::Cancelled),
            written = write_through(&mut self.writer, bytes) => Ok(written?),
        }
    }

    fn complete(&mut self, fault: Option<Error>) {
        if !self.completed {
            self.completed = true;
            self.fault = fault;
        }
    }
}

async fn write_through<W: AsyncWrite + Unpin>(
    writer: &mut W,
    bytes: &[u8],
) -> std::io::Result<()> {
    writer.write_all(bytes).await?;
    writer.flush().await
}
