//! Helpers shared by the unit tests

/// Absolute path of a file relative to the crate root
#[macro_export]
macro_rules! relative_file {
    ($f : expr) => {{
        let base = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        base.join($f)
    }};
}

/// Iterate over the lines of a fixture file relative to the crate root
#[macro_export]
macro_rules! lines_from_relative_file {
    ($f : expr) => {{
        use std::io::BufRead;
        let f = std::fs::File::open($crate::relative_file!($f)).unwrap();
        std::io::BufReader::new(f).lines()
    }};
}

/// Build a [crate::transport::slice::SliceSource] over a string
#[macro_export]
macro_rules! source_from_str {
    ($s : expr) => {{
        $crate::transport::slice::SliceSource::new($s.as_bytes())
    }};
}

/// Spawn a task feeding a sequence of chunks into a fresh pipe, yielding between each chunk, and
/// return the reading end. The writer is completed once every chunk has been pushed.
#[macro_export]
macro_rules! reader_from_chunks {
    ($chunks : expr) => {{
        let (mut writer, reader) = $crate::transport::pipe::pipe(Default::default());
        let chunks: Vec<Vec<u8>> = $chunks.into_iter().map(|c| c.as_bytes().to_vec()).collect();
        tokio::spawn(async move {
            let cancel = tokio_util::sync::CancellationToken::new();
            for chunk in chunks {
                $crate::transport::ByteSink::push(&mut writer, &chunk, &cancel)
                    .await
                    .unwrap();
                tokio::task::yield_now().await;
            }
            $crate::transport::ByteSink::complete(&mut writer, None);
        });
        reader
    }};
}
