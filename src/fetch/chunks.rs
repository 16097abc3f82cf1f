//! Fixed-size chunked streaming from a reader into a file.

use std::fs::File;
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::debug;

/// Size of each chunk pulled from a response body.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Iterator over `size`-byte chunks of a reader.
///
/// Every chunk is full except possibly the last one. Short reads from the
/// underlying reader are coalesced.
pub struct Chunks<R> {
    reader: R,
    size: usize,
    done: bool,
}

impl<R: Read> Chunks<R> {
    pub fn new(reader: R, size: usize) -> Self {
        Self {
            reader,
            size: size.max(1),
            done: false,
        }
    }
}

impl<R: Read> Iterator for Chunks<R> {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = vec![0u8; self.size];
        let mut filled = 0;

        while filled < self.size {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        if filled == 0 {
            return None;
        }

        buf.truncate(filled);
        Some(Ok(Bytes::from(buf)))
    }
}

/// Writes every non-empty chunk to `destination`, creating or truncating it.
///
/// Returns the number of bytes written.
pub fn save_chunks<I>(chunks: I, destination: &Path) -> Result<u64>
where
    I: IntoIterator<Item = io::Result<Bytes>>,
{
    let file = File::create(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;
    let mut writer = BufWriter::new(file);

    let mut written = 0u64;
    let mut skipped = 0usize;

    for chunk in chunks {
        let chunk = chunk.context("failed to read response body")?;
        if chunk.is_empty() {
            skipped += 1;
            continue;
        }
        writer.write_all(&chunk)?;
        written += chunk.len() as u64;
    }

    writer.flush()?;
    debug!(
        path = %destination.display(),
        bytes = written,
        empty_chunks = skipped,
        "Body saved"
    );

    Ok(written)
}
