//! Fully buffered transports
use tokio_util::sync::CancellationToken;

use crate::errors::{Details, Error, JsonResult};
use crate::transport::{ByteSink, ByteSource, ReadResult};
use crate::transport_error;

/// A [ByteSource] over a complete, in-memory byte slice. The window is always final.
#[derive(Debug)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    completed: bool,
    fault: Option<Error>,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        SliceSource {
            bytes,
            completed: false,
            fault: None,
        }
    }

    /// The bytes not yet retired
    pub fn remaining(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> From<&'a str> for SliceSource<'a> {
    fn from(value: &'a str) -> Self {
        SliceSource::new(value.as_bytes())
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    async fn pull(&mut self, _cancel: &CancellationToken) -> JsonResult<ReadResult<'_>> {
        match self.try_pull() {
            Some(read) => Ok(read),
            None => transport_error!(Details::TransportCompleted),
        }
    }

    fn try_pull(&mut self) -> Option<ReadResult<'_>> {
        (!self.completed).then_some(ReadResult {
            window: self.bytes,
            is_final: true,
        })
    }

    fn retire_examined(&mut self, consumed: usize, _examined: usize) {
        self.bytes = &self.bytes[consumed.min(self.bytes.len())..];
    }

    fn complete(&mut self, fault: Option<Error>) {
        if !self.completed {
            self.completed = true;
            self.bytes = &[];
            self.fault = fault;
        }
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn fault(&self) -> Option<&Error> {
        self.fault.as_ref()
    }
}

/// Encoded output accumulates in the vector. Completion is a no-op.
impl ByteSink for Vec<u8> {
    async fn push(&mut self, bytes: &[u8], _cancel: &CancellationToken) -> JsonResult<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn complete(&mut self, _fault: Option<Error>) {}
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use crate::transport::slice::SliceSource;
    use crate::transport::ByteSource;

    #[tokio::test]
    async fn should_present_the_whole_slice_as_final() {
        let cancel = CancellationToken::new();
        let mut source = SliceSource::from("[true]");
        let read = source.pull(&cancel).await.unwrap();
        assert!(read.is_final);
        assert_eq!(read.window, b"[true]");
        source.retire(1);
        assert_eq!(source.remaining(), b"true]");
        source.retire(100);
        assert!(source.remaining().is_empty());
    }

    #[tokio::test]
    async fn should_reject_pulls_once_completed() {
        let cancel = CancellationToken::new();
        let mut source = SliceSource::from("1");
        source.complete(None);
        assert!(source.try_pull().is_none());
        assert!(source.pull(&cancel).await.is_err());
    }
}
