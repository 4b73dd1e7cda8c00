#![allow(dead_code)]

use chisel_json_pipes::options::PipeOptions;
use chisel_json_pipes::transport::pipe::{pipe, PipeReader};
use chisel_json_pipes::transport::ByteSink;
use tokio_util::sync::CancellationToken;

/// Split `bytes` at each of the supplied offsets (unordered, possibly repeated)
pub fn split_at_offsets(bytes: &[u8], offsets: &[usize]) -> Vec<Vec<u8>> {
    let mut offsets: Vec<usize> = offsets.iter().map(|o| o % (bytes.len() + 1)).collect();
    offsets.sort_unstable();
    offsets.dedup();
    let mut chunks = vec![];
    let mut start = 0;
    for offset in offsets {
        chunks.push(bytes[start..offset].to_vec());
        start = offset;
    }
    chunks.push(bytes[start..].to_vec());
    chunks
}

/// Spawn a task which feeds each chunk into a fresh pipe, yielding in between, and return the
/// reading end
pub fn feed(chunks: Vec<Vec<u8>>, options: PipeOptions) -> PipeReader {
    let (mut writer, reader) = pipe(options);
    tokio::spawn(async move {
        let cancel = CancellationToken::new();
        for chunk in chunks {
            if writer.push(&chunk, &cancel).await.is_err() {
                return;
            }
            tokio::task::yield_now().await;
        }
        writer.complete(None);
    });
    reader
}

pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}
