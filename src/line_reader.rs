use std::io;

use bytes::{Bytes, BytesMut};
use itertools::Itertools;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Most spare capacity `read_exact_bytes` asks for ahead of a single read.
const MAX_RESERVE_CHUNK: usize = 64 * 1024;

/// Provides a facility to read CRLF-terminated lines, and length-delimited
/// data blocks, from a stream.
pub struct LineReader<T: AsyncRead + Unpin> {
    /// Stores data that's been read in but lacks a CRLF.
    buf: BytesMut,
    /// Index in buf from which a valid CRLF pair may appear (and before which
    /// a CRLF sequence hasn't been seen).
    maybe_crlf_from: usize,
    /// Data source
    reader: T,
    /// On a reading error, this field is set and its value returned once the
    /// buffer is drained of pending lines.
    pending_error: Option<io::Error>,
}

impl<T: AsyncRead + Unpin> LineReader<T> {
    /// Reads a line, without its CRLF, from the internal buffer and/or reader.
    /// On an end-of-stream condition, returns a None result, discarding any
    /// partly-read line in the internal buffer.
    ///
    /// This function is cancel-safe: its only async operation is a `read_buf`
    /// against the internal `reader`.
    ///
    /// On a read error, the error value is returned once every complete line
    /// already buffered has been handed out.
    pub async fn read_line(&mut self) -> io::Result<Option<Bytes>> {
        loop {
            // Only the bytes from maybe_crlf_from onwards can hold the first
            // CRLF, which keeps scanning O(bytes_read) across partial reads.
            let crlf_at = self
                .buf
                .iter()
                .skip(self.maybe_crlf_from)
                .tuple_windows::<(_, _)>()
                .position(|x| x == (&b'\r', &b'\n'));

            if let Some(idx) = crlf_at {
                let line =
                    self.buf.split_to(self.maybe_crlf_from + idx + 2).freeze();

                // Whatever follows may be further pipelined lines; rescan it
                // from the start.
                self.maybe_crlf_from = 0;

                return Ok(Some(line.slice(..line.len() - 2)));
            }

            let n_bytes_read = match self.reader.read_buf(&mut self.buf).await {
                Ok(n) => n,
                Err(e) => {
                    self.pending_error = Some(e);
                    0
                },
            };

            // Step back one byte in case a \r arrived last time and its \n
            // only now.
            self.maybe_crlf_from =
                self.buf.len().saturating_sub(n_bytes_read + 1);

            // Nothing read means the stream is finished (or broken), so no
            // further line can be completed.
            if n_bytes_read == 0 {
                return match self.pending_error.take() {
                    Some(e) => Err(e),
                    None => Ok(None),
                };
            }
        }
    }

    /// Reads exactly `n` bytes, taking any already-buffered data first. Unlike
    /// `read_line`, CRLF sequences inside the data are not treated specially.
    ///
    /// An end-of-stream before `n` bytes arrive is an `UnexpectedEof` error.
    pub async fn read_exact_bytes(&mut self, n: usize) -> io::Result<Bytes> {
        while self.buf.len() < n {
            if let Some(e) = self.pending_error.take() {
                return Err(e);
            }

            // The length comes from the peer; grow as data arrives rather
            // than allocating it all up front.
            self.buf.reserve((n - self.buf.len()).min(MAX_RESERVE_CHUNK));

            if self.reader.read_buf(&mut self.buf).await? == 0 {
                return Err(io::ErrorKind::UnexpectedEof.into());
            }
        }

        // Whatever remains in buf is unscanned for CRLFs.
        self.maybe_crlf_from = 0;

        Ok(self.buf.split_to(n).freeze())
    }

    /// Gives mutable access to the underlying stream, e.g. to write requests
    /// to it. Reading from it directly bypasses the internal buffer.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.reader
    }
}

impl<T: AsyncRead + Unpin> From<T> for LineReader<T> {
    fn from(value: T) -> Self {
        Self {
            buf: BytesMut::new(),
            maybe_crlf_from: 0,
            reader: value,
            pending_error: None,
        }
    }
}
