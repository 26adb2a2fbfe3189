//! Chunked reading of a served variant
//!
//! [`Chunks`] owns its reader. The reader is dropped as soon as the stream hits
//! end of file or a read error, and otherwise when the iterator itself is
//! dropped, so an abandoned download never leaks a file handle.

use hyper::body::Bytes;
use std::io::{self, Read};

/// Default chunk size for response bodies
pub const CHUNK_SIZE: usize = 4096;

/// Iterator of fixed-size chunks read from `R`
#[derive(Debug)]
pub struct Chunks<R> {
    reader: Option<R>,
    chunk_size: usize,
}

impl<R: Read> Chunks<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader: Some(reader),
            chunk_size,
        }
    }

    /// Whether the underlying reader is still held
    pub const fn is_open(&self) -> bool {
        self.reader.is_some()
    }
}

impl<R: Read> Iterator for Chunks<R> {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut buf = vec![0; self.chunk_size.max(1)];

        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Some(Ok(Bytes::from(buf)));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.reader = None;
                    return Some(Err(e));
                }
            }
        }
    }
}
